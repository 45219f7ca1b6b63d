//! # Bistro Checkout Library
//!
//! Checkout layer of the Bistro ordering page: the cart store, the
//! submission dispatcher and the outbound order channels.
//!
//! ## Module Organization
//! ```text
//! bistro_checkout/
//! ├── lib.rs          ◄─── You are here (wiring & tracing)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Cart store
//! │   ├── session.rs  ◄─── Signed-in identity
//! │   └── config.rs   ◄─── checkout.toml + BISTRO_* overrides
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart and customer form commands
//! │   └── checkout.rs ◄─── Submission commands
//! ├── checkout.rs     ◄─── Submission dispatcher (state machine)
//! ├── api.rs          ◄─── Order API client (reqwest)
//! ├── whatsapp.rs     ◄─── wa.me link channel
//! └── error.rs        ◄─── Error types and ApiError for commands
//! ```
//!
//! ## Startup
//! ```rust,no_run
//! use bistro_checkout::{init_tracing, CheckoutApp};
//! use bistro_checkout::state::CheckoutConfig;
//!
//! init_tracing();
//! let config = CheckoutConfig::load_or_default(None);
//! let app = CheckoutApp::new(config).expect("order API client");
//! assert!(app.cart.with_cart(|c| c.is_empty()));
//! ```

pub mod api;
pub mod checkout;
pub mod commands;
pub mod error;
pub mod state;
pub mod whatsapp;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use api::HttpOrderApi;
use checkout::Dispatcher;
use error::CheckoutResult;
use state::{CartState, CheckoutConfig, SessionState};
use whatsapp::LoggingLinkOpener;

/// Everything the ordering page holds for one browsing session.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CheckoutApp                                                            │
/// │                                                                         │
/// │  config ─────────────► fee, currency, WhatsApp number, API URL         │
/// │  cart ──────┐                                                           │
/// │  session ───┼────────► dispatcher ──► HttpOrderApi   (API channel)     │
/// │             │                     └─► LoggingLinkOpener (WhatsApp)     │
/// │             └─ shared: commands and dispatcher see the same cart        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct CheckoutApp {
    pub config: CheckoutConfig,
    pub cart: Arc<CartState>,
    pub session: Arc<SessionState>,
    pub dispatcher: Dispatcher,
}

impl CheckoutApp {
    /// Wires the default collaborators from `config`.
    ///
    /// ## Errors
    /// - `CheckoutError::Config` when `config` fails validation
    /// - `CheckoutError::Client` when the HTTP client cannot be built
    pub fn new(config: CheckoutConfig) -> CheckoutResult<Self> {
        config.validate()?;
        let api = HttpOrderApi::new(&config)?;
        let cart = Arc::new(CartState::new());
        let session = Arc::new(SessionState::new());

        let dispatcher = Dispatcher::new(
            Arc::clone(&cart),
            session.clone(),
            Arc::new(api),
            Arc::new(LoggingLinkOpener),
            &config,
        );

        info!(
            restaurant = %config.restaurant.name,
            orders_url = %config.api.base_url,
            "Checkout initialized"
        );

        Ok(CheckoutApp {
            config,
            cart,
            session,
            dispatcher,
        })
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bistro=trace` - Show trace for bistro crates only
/// - Default: `info,bistro=debug`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bistro=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::{Identity, MenuItem};

    #[test]
    fn test_app_shares_cart_with_dispatcher() {
        init_tracing();
        let app = CheckoutApp::new(CheckoutConfig::default()).unwrap();

        let item = MenuItem {
            id: 7,
            name: "Soup".to_string(),
            price_cents: 450,
            description: None,
            image_url: None,
        };
        commands::cart::add_to_cart(&app.cart, &app.config, item, Some(1), None).unwrap();
        app.session.sign_in(Identity::new("user-1"));

        assert_eq!(app.cart.with_cart(|c| c.item_count()), 1);
        assert_eq!(app.dispatcher.state(), checkout::SubmissionState::Idle);
    }

    #[test]
    fn test_app_rejects_invalid_config() {
        let mut config = CheckoutConfig::default();
        config.api.base_url = "ftp://orders.example.com".to_string();

        let err = CheckoutApp::new(config).unwrap_err();
        assert!(matches!(err, error::CheckoutError::Config(_)));

        let api_err = error::ApiError::from(err);
        assert_eq!(api_err.code, error::ErrorCode::ConfigError);
    }
}
