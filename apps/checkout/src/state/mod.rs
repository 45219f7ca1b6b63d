//! # State Module
//!
//! Session state for the checkout layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │  CartState   │  │  SessionState    │  │  CheckoutConfig  │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Arc<Mutex<  │  │  Mutex<Option<   │  │  restaurant      │          │
//! │  │    Cart      │  │    Identity      │  │  pricing         │          │
//! │  │  >>          │  │  >>              │  │  api             │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: Protected by Arc<Mutex<T>> for exclusive access          │
//! │  • SessionState: Written only on sign-in / sign-out                    │
//! │  • CheckoutConfig: Read-only after initialization                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod session;

pub use cart::{Cart, CartState};
pub use config::{
    ApiSettings, CheckoutConfig, PricingSettings, RestaurantSettings, CONFIG_FILE_NAME,
    DEFAULT_WHATSAPP_NUMBER,
};
pub use session::{IdentityProvider, SessionState};
