//! # Order Composition
//!
//! Turns a validated [`OrderDraft`] into what each submission channel sends.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   One draft, two outputs                                │
//! │                                                                         │
//! │                      OrderDraft + PriceBreakdown                        │
//! │                        │                    │                           │
//! │              build_payload()        compose_message()                   │
//! │                        │                    │                           │
//! │                        ▼                    ▼                           │
//! │              OrderPayload (JSON)    WhatsApp text                       │
//! │              → order API            → wa.me link                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both functions are pure; cart order is preserved in the output.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PriceBreakdown;
use crate::types::{CartItem, OrderDraft, OrderType};

// =============================================================================
// Price Formatting
// =============================================================================

/// Renders an amount for display.
pub trait PriceFormatter {
    fn format_price(&self, amount: Money) -> String;
}

impl<F> PriceFormatter for F
where
    F: Fn(Money) -> String,
{
    fn format_price(&self, amount: Money) -> String {
        self(amount)
    }
}

/// Symbol-prefixed fixed-precision currency format, e.g. `$12.34`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    /// Digits after the decimal point; amounts are always stored in cents.
    pub decimals: u8,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        CurrencyFormat {
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::new("$", 2)
    }
}

impl PriceFormatter for CurrencyFormat {
    /// ## Example
    /// ```rust
    /// use bistro_core::{CurrencyFormat, Money, PriceFormatter};
    ///
    /// let rupees = CurrencyFormat::new("₹", 2);
    /// assert_eq!(rupees.format_price(Money::from_cents(1399)), "₹13.99");
    /// ```
    fn format_price(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let whole = (cents / 100).abs();
        let frac = (cents % 100).abs();

        match self.decimals {
            0 => {
                // Round half away from zero when dropping the cents.
                let rounded = whole + i64::from(frac >= 50);
                format!("{}{}{}", sign, self.symbol, rounded)
            }
            1 => format!("{}{}{}.{}", sign, self.symbol, whole, frac / 10),
            n => format!(
                "{}{}{}.{:02}{}",
                sign,
                self.symbol,
                whole,
                frac,
                "0".repeat(usize::from(n) - 2)
            ),
        }
    }
}

// =============================================================================
// API Payload
// =============================================================================

/// One line of the order as the backend receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl From<&CartItem> for OrderLinePayload {
    fn from(item: &CartItem) -> Self {
        OrderLinePayload {
            menu_item_id: item.item_id,
            menu_item_name: item.name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            line_total_cents: item.line_total().cents(),
            special_requests: item.special_requests.clone(),
        }
    }
}

/// Snapshot of an order posted to the order API.
///
/// Built once per submission attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub user_id: Option<String>,
    pub items: Vec<OrderLinePayload>,
}

/// Builds the API payload for a draft that already passed the checkout guard.
pub fn build_payload(draft: &OrderDraft<'_>, breakdown: &PriceBreakdown) -> OrderPayload {
    OrderPayload {
        customer_name: draft.customer_name().unwrap_or_default().to_string(),
        customer_email: draft.customer_email().map(str::to_string),
        customer_phone: draft.customer_phone().unwrap_or_default().to_string(),
        order_type: draft.order_type,
        table_number: draft.table_number(),
        delivery_address: draft.delivery_address().map(str::to_string),
        subtotal_cents: breakdown.subtotal.cents(),
        delivery_fee_cents: breakdown.delivery_fee.cents(),
        total_cents: breakdown.total.cents(),
        special_instructions: draft.special_instructions().map(str::to_string),
        user_id: draft.user_id().map(str::to_string),
        items: draft.items.iter().map(OrderLinePayload::from).collect(),
    }
}

// =============================================================================
// WhatsApp Message
// =============================================================================

const NAME_FALLBACK: &str = "Customer";
const NOT_PROVIDED: &str = "Not provided";
const CLOSING_PROMPT: &str =
    "Please confirm this order and let me know the estimated preparation time. Thank you! 🙏";

/// Composes the human-readable order text sent over WhatsApp.
///
/// ## Layout
/// ```text
/// 🍽️ *New Order Request*
///
/// 👤 *Customer Details:*
/// Name: Asha
/// Phone: +15550100
/// Email: Not provided
///
/// 📋 Order Type: Delivery
/// 📍 Delivery Address: 12 Harbour Road        (delivery only)
///
/// 🛒 *Order Items:*
/// 1. Burger x2 - $10.00
///
/// 💰 *Order Summary:*
/// Subtotal: $10.00
/// Delivery Fee: $3.99                         (only when non-zero)
/// *Total: $13.99*
///
/// 📝 *Special Instructions:*                  (only when given)
/// Ring the bell twice
///
/// Please confirm this order and ...
/// ```
pub fn compose_message<F>(draft: &OrderDraft<'_>, breakdown: &PriceBreakdown, formatter: &F) -> String
where
    F: PriceFormatter + ?Sized,
{
    let mut message = String::new();
    // Writing into a String cannot fail.
    let _ = write_message(&mut message, draft, breakdown, formatter);
    message
}

fn write_message<F>(
    out: &mut String,
    draft: &OrderDraft<'_>,
    breakdown: &PriceBreakdown,
    formatter: &F,
) -> fmt::Result
where
    F: PriceFormatter + ?Sized,
{
    out.push_str("🍽️ *New Order Request*\n\n");

    out.push_str("👤 *Customer Details:*\n");
    writeln!(out, "Name: {}", draft.customer_name().unwrap_or(NAME_FALLBACK))?;
    writeln!(out, "Phone: {}", draft.customer_phone().unwrap_or(NOT_PROVIDED))?;
    writeln!(out, "Email: {}", draft.customer_email().unwrap_or(NOT_PROVIDED))?;
    out.push('\n');

    writeln!(out, "📋 Order Type: {}", draft.order_type.label())?;
    if let Some(table) = draft.table_number() {
        writeln!(out, "🪑 Table Number: {}", table)?;
    }
    if let Some(address) = draft.delivery_address() {
        writeln!(out, "📍 Delivery Address: {}", address)?;
    }

    out.push_str("\n🛒 *Order Items:*\n");
    for (index, item) in draft.items.iter().enumerate() {
        writeln!(
            out,
            "{}. {} x{} - {}",
            index + 1,
            item.name,
            item.quantity,
            formatter.format_price(item.line_total())
        )?;
    }

    out.push_str("\n💰 *Order Summary:*\n");
    writeln!(out, "Subtotal: {}", formatter.format_price(breakdown.subtotal))?;
    if breakdown.has_delivery_fee() {
        writeln!(out, "Delivery Fee: {}", formatter.format_price(breakdown.delivery_fee))?;
    }
    writeln!(out, "*Total: {}*", formatter.format_price(breakdown.total))?;

    if let Some(instructions) = draft.special_instructions() {
        write!(out, "\n📝 *Special Instructions:*\n{}\n", instructions)?;
    }

    write!(out, "\n{}", CLOSING_PROMPT)
}

// =============================================================================
// Unit Tests
// =============================================================================
