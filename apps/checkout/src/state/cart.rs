//! # Cart State
//!
//! The customer's cart for the current session.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Command functions and the dispatcher share it
//! 2. Only one caller should modify the cart at a time
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Page Action              Command                 Cart State Change     │
//! │  ───────────              ───────                 ─────────────────     │
//! │                                                                         │
//! │  Add from menu ──────────► add_to_cart() ───────► items.push(line)     │
//! │                                                                         │
//! │  +/- buttons ────────────► change_quantity() ───► items[i].qty = n     │
//! │                                                   (n ≤ 0 removes)       │
//! │                                                                         │
//! │  Trash icon ─────────────► remove_from_cart() ──► items.remove(i)      │
//! │                                                                         │
//! │  Radio group ────────────► set_order_type() ────► order_type = t       │
//! │                                                                         │
//! │  Customer form ──────────► set_customer_info() ─► customer.apply(p)    │
//! │                                                                         │
//! │  Order placed ───────────► (dispatcher) ────────► items.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bistro_core::pricing::{self, DeliveryFeePolicy, PriceBreakdown};
use bistro_core::validation::{validate_cart_size, validate_price_cents, validate_quantity};
use bistro_core::{
    CartItem, CoreError, CoreResult, CustomerInfo, CustomerInfoPatch, Identity, MenuItem, Money,
    OrderDraft, OrderType, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};

/// The shopping cart plus the order details collected beside it.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item increases quantity)
/// - Quantity is in `1..=999`; setting it to zero or below removes the line
/// - At most 100 lines
/// - Line order is insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,

    pub order_type: OrderType,

    pub customer: CustomerInfo,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty delivery cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            order_type: OrderType::default(),
            customer: CustomerInfo::default(),
            created_at: Utc::now(),
        }
    }

    /// Adds a menu item or increases its quantity if already present.
    ///
    /// Name and price are frozen from `item` on first add. A special request
    /// given on a later add replaces the line's request. Prices outside
    /// `0..=MAX_PRICE_CENTS` are rejected.
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        quantity: i64,
        special_requests: Option<&str>,
    ) -> CoreResult<()> {
        validate_price_cents(item.price_cents)?;
        validate_quantity(quantity)?;

        if let Some(line) = self.items.iter_mut().find(|l| l.item_id == item.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            if let Some(requests) = special_requests {
                *line = line.clone().with_special_requests(requests);
            }
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        let mut line = CartItem::from_menu_item(item, quantity);
        if let Some(requests) = special_requests {
            line = line.with_special_requests(requests);
        }
        self.items.push(line);
        Ok(())
    }

    /// Sets the quantity of a line; zero or below removes it.
    pub fn update_quantity(&mut self, item_id: i64, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .items
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or(CoreError::ItemNotInCart(item_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by menu item id.
    pub fn remove_item(&mut self, item_id: i64) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|l| l.item_id != item_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(item_id))
        } else {
            Ok(())
        }
    }

    /// Empties the cart. Order type and customer details are kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    pub fn set_customer_info(&mut self, patch: CustomerInfoPatch) {
        self.customer.apply(patch);
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        pricing::subtotal(&self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prices the cart for its current order type.
    pub fn quote<P>(&self, policy: &P) -> PriceBreakdown
    where
        P: DeliveryFeePolicy + ?Sized,
    {
        pricing::calculate(&self.items, self.order_type, policy)
    }

    /// Borrowed view for the checkout guard and composers.
    pub fn draft<'a>(
        &'a self,
        identity: Option<&'a Identity>,
        special_instructions: &'a str,
    ) -> OrderDraft<'a> {
        OrderDraft::new(&self.items, self.order_type, &self.customer)
            .with_identity(identity)
            .with_special_instructions(special_instructions)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared cart handle owned by the session.
///
/// ## Why Not RwLock?
/// Cart operations are quick and most of them write.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use bistro_checkout::state::CartState;
    ///
    /// let cart = CartState::new();
    /// assert!(cart.with_cart(|c| c.is_empty()));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // Cart methods never leave partial state, so poisoning is recoverable.
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
