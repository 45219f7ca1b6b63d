//! # Pricing Module
//!
//! Computes the order summary shown beside the cart and sent with the order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ORDER SUMMARY                                                          │
//! │                                                                         │
//! │  2x Burger                                           10.00              │
//! │  ─────────────────────────────────────────────────────────             │
//! │  Subtotal      Σ unit_price × quantity               10.00              │
//! │  Delivery Fee  policy.fee_for(order_type)             3.99              │
//! │  ─────────────────────────────────────────────────────────             │
//! │  Total         subtotal + delivery fee               13.99              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The delivery fee is a policy, not a literal: [`FlatDeliveryFee`] charges a
//! fixed amount for delivery orders and nothing otherwise, with 3.99 as the
//! default. An empty cart prices to all zeros whatever the order type.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartItem, OrderType};
use crate::DEFAULT_DELIVERY_FEE_CENTS;

// =============================================================================
// Delivery Fee Policy
// =============================================================================

/// Decides the surcharge for an order type.
pub trait DeliveryFeePolicy: Send + Sync {
    /// Fee applied to a non-empty cart of the given subtotal.
    fn fee_for(&self, order_type: OrderType, subtotal: Money) -> Money;
}

/// Fixed surcharge on delivery orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatDeliveryFee(Money);

impl FlatDeliveryFee {
    pub const fn new(fee: Money) -> Self {
        FlatDeliveryFee(fee)
    }

    pub const fn amount(&self) -> Money {
        self.0
    }
}

impl Default for FlatDeliveryFee {
    fn default() -> Self {
        FlatDeliveryFee(Money::from_cents(DEFAULT_DELIVERY_FEE_CENTS))
    }
}

impl DeliveryFeePolicy for FlatDeliveryFee {
    fn fee_for(&self, order_type: OrderType, _subtotal: Money) -> Money {
        match order_type {
            OrderType::Delivery => self.0,
            OrderType::DineIn | OrderType::Takeaway => Money::zero(),
        }
    }
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Subtotal, delivery fee and grand total of a cart.
///
/// ## Invariant
/// `total == subtotal + delivery_fee`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Whether the summary should print a delivery fee line.
    #[inline]
    pub fn has_delivery_fee(&self) -> bool {
        !self.delivery_fee.is_zero()
    }
}

/// Sum of line totals in the cart.
pub fn subtotal(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

/// Prices a cart under the given fee policy.
///
/// ## Example
/// ```rust
/// use bistro_core::money::Money;
/// use bistro_core::pricing::{calculate, FlatDeliveryFee};
/// use bistro_core::types::{CartItem, OrderType};
///
/// let items = [CartItem::new(1, "Burger", Money::from_cents(500), 2)];
/// let policy = FlatDeliveryFee::new(Money::from_cents(250));
///
/// let breakdown = calculate(&items, OrderType::Delivery, &policy);
/// assert_eq!(breakdown.total.cents(), 1250);
///
/// let breakdown = calculate(&items, OrderType::Takeaway, &policy);
/// assert_eq!(breakdown.total.cents(), 1000);
/// ```
pub fn calculate<P>(items: &[CartItem], order_type: OrderType, policy: &P) -> PriceBreakdown
where
    P: DeliveryFeePolicy + ?Sized,
{
    if items.is_empty() {
        return PriceBreakdown::default();
    }

    let subtotal = subtotal(items);
    let delivery_fee = policy.fee_for(order_type, subtotal);

    PriceBreakdown {
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    }
}

/// Prices a cart with the default 3.99 flat delivery fee.
pub fn quote(items: &[CartItem], order_type: OrderType) -> PriceBreakdown {
    calculate(items, order_type, &FlatDeliveryFee::default())
}

// =============================================================================
// Unit Tests
// =============================================================================
