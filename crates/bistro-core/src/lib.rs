//! # bistro-core: Pure Ordering Rules for Bistro Order Desk
//!
//! This crate holds the checkout rules of the ordering page as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bistro Order Desk Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Ordering Page (web)                          │   │
//! │  │    Cart UI ──► Order Type ──► Customer Form ──► Place Order     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               bistro-checkout (app layer)                       │   │
//! │  │    CartState, SessionState, Dispatcher, HttpOrderApi            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │  compose  │  │ validation│  │   │
//! │  │   │ CartItem  │  │ Breakdown │  │  Payload  │  │  checkout │  │   │
//! │  │   │ OrderType │  │ FeePolicy │  │  Message  │  │   guard   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK READS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, CartItem, OrderType, CustomerInfo, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Subtotal, delivery fee and grand total
//! - [`compose`] - Order payload and WhatsApp message composition
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and the shared checkout guard
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::money::Money;
//! use bistro_core::pricing::quote;
//! use bistro_core::types::{CartItem, OrderType};
//!
//! let burger = CartItem::new(1, "Burger", Money::from_cents(500), 2);
//! let breakdown = quote(&[burger], OrderType::Delivery);
//!
//! assert_eq!(breakdown.subtotal.cents(), 1000);
//! assert_eq!(breakdown.delivery_fee.cents(), 399);
//! assert_eq!(breakdown.total.cents(), 1399);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compose;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use compose::{
    build_payload, compose_message, CurrencyFormat, OrderLinePayload, OrderPayload,
    PriceFormatter,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{calculate, quote, DeliveryFeePolicy, FlatDeliveryFee, PriceBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat delivery surcharge in cents (3.99).
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 399;

/// Highest menu price accepted into a cart, in cents (100,000.00).
pub const MAX_PRICE_CENTS: i64 = 10_000_000;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;
