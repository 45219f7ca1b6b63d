//! # Domain Types
//!
//! Core domain types used throughout Bistro Order Desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │    CartItem     │   │  CustomerInfo   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  item_id        │   │  name, phone    │       │
//! │  │  name           │   │  name (frozen)  │   │  email?         │       │
//! │  │  price_cents    │   │  unit_price     │   │  table_number?  │       │
//! │  └─────────────────┘   │  quantity ≥ 1   │   │  address?       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderType     │   │    Identity     │   │   OrderDraft    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  DineIn         │   │  id             │   │  borrowed view  │       │
//! │  │  Takeaway       │   │  name?          │   │  fed to guard + │       │
//! │  │  Delivery       │   │  email?         │   │  composers      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on the restaurant menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Backend identifier of the menu item.
    pub id: i64,

    /// Display name shown on the menu, in the cart and in messages.
    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    pub description: Option<String>,

    pub image_url: Option<String>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the shopping cart.
///
/// Name and price are frozen when the item is added, so the cart keeps
/// showing what the customer saw even if the menu changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub item_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    /// Always at least 1 while the line is in a cart.
    pub quantity: i64,
    /// Free-text request for this line ("no onions").
    pub special_requests: Option<String>,
}

impl CartItem {
    /// Creates a cart line with no special request.
    pub fn new(item_id: i64, name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        CartItem {
            item_id,
            name: name.into(),
            unit_price_cents: unit_price.cents(),
            quantity,
            special_requests: None,
        }
    }

    /// Freezes a menu item into a cart line.
    pub fn from_menu_item(item: &MenuItem, quantity: i64) -> Self {
        CartItem::new(item.id, item.name.clone(), item.price(), quantity)
    }

    /// Attaches a per-line special request; blank text is dropped.
    pub fn with_special_requests(mut self, requests: impl Into<String>) -> Self {
        self.special_requests = non_blank(requests.into());
        self
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// How the customer receives the order.
///
/// Wire names match the ordering page: `dine-in`, `takeaway`, `delivery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Eaten at a table in the restaurant.
    #[serde(rename = "dine-in")]
    DineIn,
    /// Picked up at the counter.
    Takeaway,
    /// Brought to the customer's address for a flat fee.
    #[default]
    Delivery,
}

impl OrderType {
    /// All order types in display order.
    pub const ALL: [OrderType; 3] = [OrderType::DineIn, OrderType::Takeaway, OrderType::Delivery];

    /// Wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }

    /// Wire name with the first letter capitalized, as printed in messages.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine-in",
            OrderType::Takeaway => "Takeaway",
            OrderType::Delivery => "Delivery",
        }
    }

    /// Whether a table number is meaningful for this order type.
    pub const fn uses_table_number(&self) -> bool {
        matches!(self, OrderType::DineIn)
    }

    /// Whether a delivery address must be collected.
    pub const fn requires_address(&self) -> bool {
        matches!(self, OrderType::Delivery)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dine-in" | "dine_in" | "dinein" => Ok(OrderType::DineIn),
            "takeaway" | "take-away" | "pickup" => Ok(OrderType::Takeaway),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(ValidationError::InvalidFormat {
                field: "order type".to_string(),
                reason: format!(
                    "unknown order type '{}', expected dine-in, takeaway or delivery",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Customer Info
// =============================================================================

/// Details typed into the customer form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Only read for dine-in orders.
    pub table_number: Option<u32>,
    /// Only read for delivery orders.
    pub delivery_address: Option<String>,
}

impl CustomerInfo {
    /// Applies a partial update from the form.
    ///
    /// Present fields overwrite. A blank email or address clears it, and a
    /// table number of 0 clears it (the form sends 0 for an emptied field).
    pub fn apply(&mut self, patch: CustomerInfoPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = non_blank(email);
        }
        if let Some(table) = patch.table_number {
            self.table_number = (table != 0).then_some(table);
        }
        if let Some(address) = patch.delivery_address {
            self.delivery_address = non_blank(address);
        }
    }
}

/// Partial update for [`CustomerInfo`]; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfoPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

// =============================================================================
// Identity
// =============================================================================

/// The signed-in user, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// Everything a submission channel reads, borrowed from the cart store.
///
/// Field accessors apply the page's precedence rules once, so the guard and
/// both composers agree on what "the customer's name" is.
#[derive(Debug, Clone, Copy)]
pub struct OrderDraft<'a> {
    pub items: &'a [CartItem],
    pub order_type: OrderType,
    pub customer: &'a CustomerInfo,
    pub identity: Option<&'a Identity>,
    pub special_instructions: &'a str,
}

impl<'a> OrderDraft<'a> {
    pub fn new(items: &'a [CartItem], order_type: OrderType, customer: &'a CustomerInfo) -> Self {
        OrderDraft {
            items,
            order_type,
            customer,
            identity: None,
            special_instructions: "",
        }
    }

    pub fn with_identity(mut self, identity: Option<&'a Identity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_special_instructions(mut self, instructions: &'a str) -> Self {
        self.special_instructions = instructions;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Signed-in name if set, else the typed name.
    pub fn customer_name(&self) -> Option<&'a str> {
        self.identity
            .and_then(|id| trimmed(id.name.as_deref()))
            .or_else(|| trimmed(Some(self.customer.name.as_str())))
    }

    /// Signed-in email if set, else the typed email.
    pub fn customer_email(&self) -> Option<&'a str> {
        self.identity
            .and_then(|id| trimmed(id.email.as_deref()))
            .or_else(|| trimmed(self.customer.email.as_deref()))
    }

    pub fn customer_phone(&self) -> Option<&'a str> {
        trimmed(Some(self.customer.phone.as_str()))
    }

    /// Table number, only for dine-in orders.
    pub fn table_number(&self) -> Option<u32> {
        self.customer
            .table_number
            .filter(|_| self.order_type.uses_table_number())
    }

    /// Delivery address, only for delivery orders.
    pub fn delivery_address(&self) -> Option<&'a str> {
        trimmed(self.customer.delivery_address.as_deref())
            .filter(|_| self.order_type.requires_address())
    }

    pub fn special_instructions(&self) -> Option<&'a str> {
        trimmed(Some(self.special_instructions))
    }

    pub fn user_id(&self) -> Option<&'a str> {
        self.identity.map(|id| id.id.as_str())
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Asha".to_string(),
            phone: "+15550100".to_string(),
            email: Some("asha@example.com".to_string()),
            table_number: Some(7),
            delivery_address: Some("12 Harbour Road".to_string()),
        }
    }

    #[test]
    fn test_line_total() {
        let item = CartItem::new(1, "Burger", Money::from_cents(500), 2);
        assert_eq!(item.line_total().cents(), 1000);
    }

    #[test]
    fn test_from_menu_item_freezes_price() {
        let mut menu = MenuItem {
            id: 3,
            name: "Lassi".to_string(),
            price_cents: 250,
            description: None,
            image_url: None,
        };
        let line = CartItem::from_menu_item(&menu, 1);
        menu.price_cents = 300;
        assert_eq!(line.unit_price_cents, 250);
        assert_eq!(line.name, "Lassi");
    }

    #[test]
    fn test_blank_special_request_dropped() {
        let item = CartItem::new(1, "Soup", Money::from_cents(100), 1).with_special_requests("  ");
        assert_eq!(item.special_requests, None);
    }

    #[test]
    fn test_order_type_wire_names() {
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), "\"dine-in\"");
        assert_eq!(serde_json::to_string(&OrderType::Takeaway).unwrap(), "\"takeaway\"");
        let parsed: OrderType = serde_json::from_str("\"delivery\"").unwrap();
        assert_eq!(parsed, OrderType::Delivery);
    }

    #[test]
    fn test_order_type_parsing_and_labels() {
        assert_eq!("Dine-In".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert_eq!("takeaway".parse::<OrderType>().unwrap(), OrderType::Takeaway);
        assert!("drive-thru".parse::<OrderType>().is_err());
        assert_eq!(OrderType::DineIn.label(), "Dine-in");
        assert_eq!(OrderType::default(), OrderType::Delivery);
    }

    #[test]
    fn test_customer_patch() {
        let mut info = customer();
        info.apply(CustomerInfoPatch {
            phone: Some("+15550199".to_string()),
            email: Some(String::new()),
            table_number: Some(0),
            ..Default::default()
        });
        assert_eq!(info.name, "Asha");
        assert_eq!(info.phone, "+15550199");
        assert_eq!(info.email, None);
        assert_eq!(info.table_number, None);
        assert_eq!(info.delivery_address.as_deref(), Some("12 Harbour Road"));
    }

    #[test]
    fn test_draft_prefers_identity() {
        let info = customer();
        let identity = Identity::new("u-1").with_name("Asha K").with_email("ak@example.com");
        let draft = OrderDraft::new(&[], OrderType::Takeaway, &info).with_identity(Some(&identity));
        assert_eq!(draft.customer_name(), Some("Asha K"));
        assert_eq!(draft.customer_email(), Some("ak@example.com"));
        assert_eq!(draft.user_id(), Some("u-1"));

        // Empty identity fields fall back to the form.
        let bare = Identity::new("u-2").with_name("");
        let draft = OrderDraft::new(&[], OrderType::Takeaway, &info).with_identity(Some(&bare));
        assert_eq!(draft.customer_name(), Some("Asha"));
        assert_eq!(draft.customer_email(), Some("asha@example.com"));
    }

    #[test]
    fn test_draft_order_type_gates_fields() {
        let info = customer();
        let dine_in = OrderDraft::new(&[], OrderType::DineIn, &info);
        assert_eq!(dine_in.table_number(), Some(7));
        assert_eq!(dine_in.delivery_address(), None);

        let delivery = OrderDraft::new(&[], OrderType::Delivery, &info);
        assert_eq!(delivery.table_number(), None);
        assert_eq!(delivery.delivery_address(), Some("12 Harbour Road"));

        let takeaway = OrderDraft::new(&[], OrderType::Takeaway, &info);
        assert_eq!(takeaway.table_number(), None);
        assert_eq!(takeaway.delivery_address(), None);
    }
}
