//! # Validation Module
//!
//! Input validation and the shared checkout guard.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Ordering page                                                │
//! │  ├── Required markers on the form                                      │
//! │  └── Place-order button disabled while name/phone are empty            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart store (bistro-checkout)                                 │
//! │  └── validate_price_cents / validate_quantity / validate_cart_size     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: validate_checkout ← THIS MODULE                              │
//! │  └── Run by BOTH submission channels before any payload is built       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::types::{CartItem, CustomerInfo, OrderDraft, OrderType};
//! use bistro_core::validation::validate_checkout;
//! use bistro_core::Money;
//!
//! let items = [CartItem::new(1, "Burger", Money::from_cents(500), 2)];
//! let customer = CustomerInfo {
//!     name: "Asha".into(),
//!     phone: "+15550100".into(),
//!     ..Default::default()
//! };
//!
//! // Delivery without an address is blocked
//! let draft = OrderDraft::new(&items, OrderType::Delivery, &customer);
//! assert!(validate_checkout(&draft).is_err());
//!
//! // Takeaway is fine
//! let draft = OrderDraft::new(&items, OrderType::Takeaway, &customer);
//! assert!(validate_checkout(&draft).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::OrderDraft;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Checkout Guard
// =============================================================================

/// The one guard both submission channels run before doing anything else.
///
/// ## Rules
/// - Name must be non-empty (signed-in name or typed name)
/// - Phone must be non-empty
/// - Delivery orders need a non-empty address
///
/// Blank means empty after trimming. Content is not otherwise checked; the
/// restaurant confirms details over the phone.
///
/// An empty cart is not a validation failure; callers treat it as a no-op
/// before reaching this guard.
pub fn validate_checkout(draft: &OrderDraft<'_>) -> ValidationResult<()> {
    draft
        .customer_phone()
        .ok_or_else(|| ValidationError::required("phone"))?;

    draft
        .customer_name()
        .ok_or_else(|| ValidationError::required("name"))?;

    if draft.order_type.requires_address() && draft.delivery_address().is_none() {
        return Err(ValidationError::required("delivery address"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a menu price in cents.
///
/// ## Rules
/// - Zero is allowed (complimentary item)
/// - Must not be negative
/// - Must not exceed MAX_PRICE_CENTS (100,000.00)
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());     // complimentary item
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX / 2).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates that one more line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CartItem, CustomerInfo, Identity, OrderType};

    fn items() -> Vec<CartItem> {
        vec![CartItem::new(1, "Burger", Money::from_cents(500), 2)]
    }

    fn customer(name: &str, phone: &str) -> CustomerInfo {
        CustomerInfo {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_checkout_requires_phone() {
        let items = items();
        let info = customer("Asha", "");
        let draft = OrderDraft::new(&items, OrderType::Takeaway, &info);
        assert_eq!(
            validate_checkout(&draft),
            Err(ValidationError::required("phone"))
        );
    }

    #[test]
    fn test_checkout_requires_name_unless_signed_in() {
        let items = items();
        let info = customer(" ", "+15550100");
        let draft = OrderDraft::new(&items, OrderType::Takeaway, &info);
        assert_eq!(validate_checkout(&draft), Err(ValidationError::required("name")));

        let identity = Identity::new("u-1").with_name("Asha");
        let draft = draft.with_identity(Some(&identity));
        assert!(validate_checkout(&draft).is_ok());
    }

    #[test]
    fn test_checkout_delivery_needs_address() {
        let items = items();
        let mut info = customer("Asha", "+15550100");
        let draft = OrderDraft::new(&items, OrderType::Delivery, &info);
        assert_eq!(
            validate_checkout(&draft),
            Err(ValidationError::required("delivery address"))
        );

        info.delivery_address = Some("12 Harbour Road".to_string());
        let draft = OrderDraft::new(&items, OrderType::Delivery, &info);
        assert!(validate_checkout(&draft).is_ok());
    }

    #[test]
    fn test_checkout_dine_in_ignores_address() {
        let items = items();
        let info = customer("Asha", "+15550100");
        let draft = OrderDraft::new(&items, OrderType::DineIn, &info);
        assert!(validate_checkout(&draft).is_ok());
    }

    #[test]
    fn test_checkout_accepts_free_form_details() {
        let items = items();
        let mut info = customer("Asha", "+91 70129 75494 ext. 12");
        info.delivery_address = Some("Flat 4B, ".repeat(100));
        let instructions = "Leave at the door. ".repeat(100);

        for order_type in OrderType::ALL {
            let draft = OrderDraft::new(&items, order_type, &info)
                .with_special_instructions(&instructions);
            assert_eq!(validate_checkout(&draft), Ok(()));
        }
    }

    #[test]
    fn test_checkout_reports_phone_before_name() {
        let items = items();
        let info = customer("", "  ");
        let draft = OrderDraft::new(&items, OrderType::Takeaway, &info);
        assert_eq!(
            validate_checkout(&draft),
            Err(ValidationError::required("phone"))
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
