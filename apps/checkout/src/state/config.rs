//! # Checkout Configuration
//!
//! Restaurant, pricing and order API settings loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BISTRO_WHATSAPP_NUMBER=+917012975494                               │
//! │     BISTRO_API_URL=https://orders.example.com                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/order-desk/checkout.toml (Linux)                         │
//! │     ~/Library/Application Support/com.bistro.order-desk/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     $ with 2 decimals, 3.99 delivery fee, localhost API                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [restaurant]
//! name = "Harbour Bistro"
//! whatsapp_number = "+917012975494"
//!
//! [pricing]
//! currency_symbol = "₹"
//! currency_decimals = 2
//! delivery_fee_cents = 399
//!
//! [api]
//! base_url = "https://orders.example.com"
//! timeout_secs = 15
//! ```
//!
//! Read-only after load, so no lock.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use bistro_core::{CurrencyFormat, FlatDeliveryFee, Money, DEFAULT_DELIVERY_FEE_CENTS};

use crate::error::{ConfigError, ConfigResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "checkout.toml";

/// Restaurant WhatsApp number used when none is configured.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "+917012975494";

// =============================================================================
// Restaurant Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    #[serde(default = "default_restaurant_name")]
    pub name: String,

    /// Number the WhatsApp channel sends orders to. Any formatting is
    /// accepted; only the digits are used in the link.
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,
}

fn default_restaurant_name() -> String {
    "Bistro".to_string()
}

fn default_whatsapp_number() -> String {
    DEFAULT_WHATSAPP_NUMBER.to_string()
}

impl Default for RestaurantSettings {
    fn default() -> Self {
        RestaurantSettings {
            name: default_restaurant_name(),
            whatsapp_number: default_whatsapp_number(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,

    /// Flat surcharge on delivery orders, in cents.
    #[serde(default = "default_delivery_fee_cents")]
    pub delivery_fee_cents: i64,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

fn default_delivery_fee_cents() -> i64 {
    DEFAULT_DELIVERY_FEE_CENTS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
            delivery_fee_cents: default_delivery_fee_cents(),
        }
    }
}

// =============================================================================
// Order API Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend origin; orders are posted to `<base_url>/api/orders`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bearer token sent with every order. Usually set via `BISTRO_API_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub restaurant: RestaurantSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub api: ApiSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`checkout.toml`)
    /// 3. Environment variables (`BISTRO_*`)
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading checkout config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let digits = self.whatsapp_digits();
        if !(7..=15).contains(&digits.len()) {
            return Err(ConfigError::Invalid(format!(
                "whatsapp_number must contain 7 to 15 digits, got: {}",
                self.restaurant.whatsapp_number
            )));
        }

        if self.pricing.delivery_fee_cents < 0 {
            return Err(ConfigError::Invalid(
                "delivery_fee_cents must not be negative".into(),
            ));
        }

        if self.pricing.currency_decimals > 3 {
            return Err(ConfigError::Invalid(
                "currency_decimals must be between 0 and 3".into(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        let url = Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Invalid(format!("base_url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        Ok(())
    }

    /// Applies `BISTRO_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("BISTRO_RESTAURANT_NAME") {
            self.restaurant.name = name;
        }

        if let Some(number) = lookup("BISTRO_WHATSAPP_NUMBER") {
            debug!(number = %number, "Overriding WhatsApp number from environment");
            self.restaurant.whatsapp_number = number;
        }

        if let Some(symbol) = lookup("BISTRO_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = symbol;
        }

        if let Some(fee) = lookup("BISTRO_DELIVERY_FEE_CENTS") {
            match fee.parse::<i64>() {
                Ok(cents) => self.pricing.delivery_fee_cents = cents,
                Err(_) => warn!(value = %fee, "Ignoring non-numeric BISTRO_DELIVERY_FEE_CENTS"),
            }
        }

        if let Some(url) = lookup("BISTRO_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("BISTRO_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.api.timeout_secs = secs;
            }
        }

        if let Some(token) = lookup("BISTRO_API_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bistro", "order-desk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::new(
            self.pricing.currency_symbol.clone(),
            self.pricing.currency_decimals,
        )
    }

    pub fn delivery_fee(&self) -> FlatDeliveryFee {
        FlatDeliveryFee::new(Money::from_cents(self.pricing.delivery_fee_cents))
    }

    /// The restaurant number reduced to digits, as `wa.me` expects.
    pub fn whatsapp_digits(&self) -> String {
        self.restaurant
            .whatsapp_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }

    /// Full URL of the order endpoint, `<base_url>/api/orders`.
    ///
    /// A base path is kept whether or not it ends in `/`.
    pub fn orders_url(&self) -> Result<Url, url::ParseError> {
        let mut base = Url::parse(&self.api.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("api/orders")
    }
}
