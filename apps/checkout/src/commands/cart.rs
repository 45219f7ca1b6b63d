//! # Cart Commands
//!
//! Handlers behind the cart panel and customer form of the ordering page.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Details  │────►│  Placed  │       │
//! │  │  Cart    │     │          │     │ Entered  │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │                   add_to_cart     set_order_type     place_order        │
//! │                   change_quantity set_customer_info  (checkout.rs)      │
//! │                   remove_from_cart                        │             │
//! │                        │                                  ▼             │
//! │                   clear_cart ─────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating command returns the whole [`CartResponse`] so the page can
//! re-render from one value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use bistro_core::{
    CartItem, CustomerInfo, CustomerInfoPatch, MenuItem, OrderType, PriceBreakdown,
    PriceFormatter,
};

use crate::error::ApiError;
use crate::state::{Cart, CartState, CheckoutConfig};

/// Order summary panel: totals in cents plus display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub subtotal: String,
    /// Absent when there is no fee line to show.
    pub delivery_fee: Option<String>,
    pub total: String,
}

impl OrderSummary {
    fn new(cart: &Cart, breakdown: &PriceBreakdown, formatter: &impl PriceFormatter) -> Self {
        OrderSummary {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: breakdown.subtotal.cents(),
            delivery_fee_cents: breakdown.delivery_fee.cents(),
            total_cents: breakdown.total.cents(),
            subtotal: formatter.format_price(breakdown.subtotal),
            delivery_fee: breakdown
                .has_delivery_fee()
                .then(|| formatter.format_price(breakdown.delivery_fee)),
            total: formatter.format_price(breakdown.total),
        }
    }
}

/// Cart response including lines, order details and the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub order_type: OrderType,
    pub customer: CustomerInfo,
    pub summary: OrderSummary,
}

impl CartResponse {
    fn new(cart: &Cart, config: &CheckoutConfig) -> Self {
        CartResponse {
            items: cart.items.clone(),
            order_type: cart.order_type,
            customer: cart.customer.clone(),
            summary: summarize(cart, config),
        }
    }
}

fn summarize(cart: &Cart, config: &CheckoutConfig) -> OrderSummary {
    let breakdown = cart.quote(&config.delivery_fee());
    OrderSummary::new(cart, &breakdown, &config.currency_format())
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState, config: &CheckoutConfig) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::new(c, config))
}

/// Adds a menu item to the cart.
///
/// ## Behavior
/// - Already in cart: quantity increases
/// - Not in cart: added with name and price frozen
///
/// ## Arguments
/// * `item` - Menu entry as shown on the menu page
/// * `quantity` - Quantity to add (default: 1)
/// * `special_requests` - Optional note for this line
pub fn add_to_cart(
    cart: &CartState,
    config: &CheckoutConfig,
    item: MenuItem,
    quantity: Option<i64>,
    special_requests: Option<String>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(item_id = item.id, quantity, "add_to_cart command");

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        c.add_item(&item, quantity, special_requests.as_deref())?;
        Ok(CartResponse::new(c, config))
    })
}

/// The +/- buttons: sets a line's quantity. Zero or below removes the line.
pub fn change_quantity(
    cart: &CartState,
    config: &CheckoutConfig,
    item_id: i64,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_id, quantity, "change_quantity command");

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        c.update_quantity(item_id, quantity)?;
        Ok(CartResponse::new(c, config))
    })
}

/// Removes a line from the cart.
pub fn remove_from_cart(
    cart: &CartState,
    config: &CheckoutConfig,
    item_id: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_id, "remove_from_cart command");

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        c.remove_item(item_id)?;
        Ok(CartResponse::new(c, config))
    })
}

/// Clears all lines. Order type and customer details stay.
pub fn clear_cart(cart: &CartState, config: &CheckoutConfig) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::new(c, config)
    })
}

/// The order-type radio group. Accepts `dine-in`, `takeaway` or `delivery`.
pub fn set_order_type(
    cart: &CartState,
    config: &CheckoutConfig,
    order_type: &str,
) -> Result<CartResponse, ApiError> {
    debug!(order_type, "set_order_type command");
    let order_type: OrderType = order_type.parse()?;

    Ok(cart.with_cart_mut(|c| {
        c.set_order_type(order_type);
        CartResponse::new(c, config)
    }))
}

/// The customer form. Only fields present in `patch` change.
pub fn set_customer_info(
    cart: &CartState,
    config: &CheckoutConfig,
    patch: CustomerInfoPatch,
) -> CartResponse {
    debug!("set_customer_info command");

    cart.with_cart_mut(|c| {
        c.set_customer_info(patch);
        CartResponse::new(c, config)
    })
}

/// Order summary panel only.
pub fn get_order_summary(cart: &CartState, config: &CheckoutConfig) -> OrderSummary {
    debug!("get_order_summary command");
    cart.with_cart(|c| summarize(c, config))
}
