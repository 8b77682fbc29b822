//! # Validation Module
//!
//! Input validation for carts and catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (kasser-api)                                            │
//! │  ├── JSON shape, payment method spelling                               │
//! │  └── Decimal → cents (max 2 decimal places)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Cart non-empty, quantity and price ranges                         │
//! │  └── Names, stock, discount sign                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout transaction (kasser-db)                             │
//! │  ├── Product exists / available / enough stock                         │
//! │  └── Discount ≤ subtotal                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  ├── CHECK (stock >= 0), UNIQUE(order_number), UNIQUE(store_id)        │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs before a connection is acquired, so a rejected cart
//! costs no database work at all.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, NewCategory, NewOrder, NewProduct, SettingsUpdate};
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS, MIN_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cart
// =============================================================================

/// Validates a cart before it reaches the checkout transaction.
///
/// ## Rules
/// - At least one line (`EmptyCart` otherwise)
/// - Every line: valid product id, quantity and unit price
/// - Discount not negative (the upper bound needs the subtotal, see `pricing`)
pub fn validate_new_order(order: &NewOrder) -> CoreResult<()> {
    if order.lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    for line in &order.lines {
        validate_cart_line(line)?;
    }

    validate_discount(order.discount)?;
    Ok(())
}

pub fn validate_cart_line(line: &CartLine) -> ValidationResult<()> {
    if line.product_id < 1 {
        return Err(ValidationError::InvalidFormat {
            field: "productId".to_string(),
            reason: format!("{} is not a valid product id", line.product_id),
        });
    }
    validate_quantity(line.quantity)?;
    validate_unit_price(line.price_at_time)?;
    Ok(())
}

/// Quantity of one line: 1 to 9999.
///
/// ## Example
/// ```rust
/// use kasser_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(10_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "1".to_string(),
            max: MAX_ITEM_QUANTITY.to_string(),
        });
    }
    Ok(())
}

/// Unit price: 0.01 to 999999.00.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !(MIN_UNIT_PRICE_CENTS..=MAX_UNIT_PRICE_CENTS).contains(&price.cents()) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: Money::from_cents(MIN_UNIT_PRICE_CENTS).to_string(),
            max: Money::from_cents(MAX_UNIT_PRICE_CENTS).to_string(),
        });
    }
    Ok(())
}

pub fn validate_discount(discount: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::Negative {
            field: "discount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

fn validate_name(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Product name: 2 to 100 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, 2, 100)
}

/// Category name: 2 to 50 characters.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, 2, 50)
}

/// Username: 3 to 50 characters.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_name("username", username, 3, 50)
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_unit_price(product.price)?;
    validate_stock(product.stock)?;
    Ok(())
}

pub fn validate_new_category(category: &NewCategory) -> ValidationResult<()> {
    validate_category_name(&category.name)
}

// =============================================================================
// Settings
// =============================================================================

/// Store name printed on receipts: 2 to 100 characters.
pub fn validate_store_name(name: &str) -> ValidationResult<()> {
    validate_name("storeName", name, 2, 100)
}

/// Currency label printed after amounts (`EGP`, `ج.م`): 1 to 10 characters.
pub fn validate_currency(currency: &str) -> ValidationResult<()> {
    validate_name("currency", currency, 1, 10)
}

pub fn validate_settings_update(update: &SettingsUpdate) -> ValidationResult<()> {
    validate_store_name(&update.store_name)?;
    validate_currency(&update.currency)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn line(product_id: i64, quantity: i64, cents: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
            price_at_time: Money::from_cents(cents),
        }
    }

    fn order(lines: Vec<CartLine>) -> NewOrder {
        NewOrder {
            lines,
            discount: Money::zero(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(validate_new_order(&order(vec![])), Err(CoreError::EmptyCart));
    }

    #[test]
    fn test_valid_cart() {
        assert!(validate_new_order(&order(vec![line(1, 2, 1500)])).is_ok());
    }

    #[test]
    fn test_line_rules() {
        assert!(validate_new_order(&order(vec![line(0, 1, 100)])).is_err());
        assert!(validate_new_order(&order(vec![line(1, 0, 100)])).is_err());
        assert!(validate_new_order(&order(vec![line(1, 10_000, 100)])).is_err());
        assert!(validate_new_order(&order(vec![line(1, 1, 0)])).is_err());
        assert!(validate_new_order(&order(vec![line(1, 1, 99_999_901)])).is_err());
        assert!(validate_new_order(&order(vec![line(1, 9_999, 99_999_900)])).is_ok());
    }

    #[test]
    fn test_negative_discount() {
        let mut o = order(vec![line(1, 1, 100)]);
        o.discount = Money::from_cents(-1);
        assert!(matches!(
            validate_new_order(&o),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9_999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_settings_update() {
        let update = |name: &str, currency: &str| SettingsUpdate {
            tax_enabled: true,
            tax_rate: crate::types::TaxRate::from_bps(1400),
            store_name: name.to_string(),
            currency: currency.to_string(),
        };

        assert!(validate_settings_update(&update("Koshary Corner", "EGP")).is_ok());
        assert!(validate_settings_update(&update("Koshary Corner", "ج.م")).is_ok());
        assert!(matches!(
            validate_settings_update(&update("  ", "EGP")),
            Err(ValidationError::Required { ref field }) if field == "storeName"
        ));
        assert!(matches!(
            validate_settings_update(&update("Koshary Corner", &"E".repeat(11))),
            Err(ValidationError::TooLong { ref field, max: 10 }) if field == "currency"
        ));
    }

    #[test]
    fn test_names() {
        assert!(validate_product_name("Tea").is_ok());
        assert!(validate_product_name("T").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(101)).is_err());

        // Length counts characters, not bytes
        assert!(validate_category_name("مشروبات").is_ok());
        assert!(validate_category_name(&"ش".repeat(50)).is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username("owner").is_ok());
    }

    #[test]
    fn test_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
