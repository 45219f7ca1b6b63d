//! # Commands Module
//!
//! All handlers exposed to the ordering page.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart lines, order type, customer form, summary
//! └── checkout.rs  ◄─── Place Order, Order via WhatsApp, sign-in prompt
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Ordering page                                                          │
//! │  ─────────────                                                          │
//! │  onClick(+)  ──► change_quantity(cart, config, item_id, qty + 1)        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust                                                                   │
//! │  ────                                                                   │
//! │  fn change_quantity(                                                    │
//! │      cart: &CartState,        ◄── Shared session state                 │
//! │      config: &CheckoutConfig, ◄── Currency + fee                       │
//! │      item_id: i64,            ◄── From the page                        │
//! │      quantity: i64,                                                     │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         │ (JSON serialization, camelCase)                               │
//! │         ▼                                                               │
//! │  Page receives: { items, orderType, customer, summary }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs.

pub mod cart;
pub mod checkout;
