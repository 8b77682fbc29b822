//! # Error Types
//!
//! Domain-specific error types for kasser-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasser-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule rejections (never retried)       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── TenantError      - Missing or unusable credentials                │
//! │                                                                         │
//! │  kasser-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - Order transaction outcome                      │
//! │                                                                         │
//! │  kasser-api errors                                                     │
//! │  └── ApiError         - Status code + {"message": ...} body            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError → client │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities)
//! 3. Errors are enum variants, never String
//! 4. The `Display` text is what the cashier sees

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Each variant is a distinct, client-visible rejection. None of them is
/// transient, so callers must not retry on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The submitted cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product does not exist in the acting store.
    ///
    /// ## When This Occurs
    /// - Product id was never created
    /// - Product belongs to a different store (indistinguishable on purpose)
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    /// Product exists but is flagged unavailable.
    #[error("Product {name} is currently unavailable")]
    ProductUnavailable { product_id: i64, name: String },

    /// Not enough stock to cover the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line (qty: 10)
    ///      │
    ///      ▼
    /// Guarded decrement matches no row
    ///      │
    ///      ▼
    /// Re-read product: stock=5
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Falafel", available: 5, requested: 10 }
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Discount is negative or larger than the subtotal.
    #[error("Discount {discount} must be between 0 and the subtotal {subtotal}")]
    InvalidDiscount { discount: Money, subtotal: Money },

    /// Order does not exist in the acting store.
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    /// Category does not exist in the acting store.
    #[error("Category {0} not found")]
    CategoryNotFound(i64),

    /// Category cannot be deleted while products reference it.
    #[error("Category {category_id} is used by {products} product(s)")]
    CategoryInUse { category_id: i64, products: i64 },

    /// Product cannot be deleted while order lines reference it.
    #[error("Product {0} appears on existing orders and cannot be deleted")]
    ProductInUse(i64),

    /// The acting role lacks the capability for this operation.
    #[error("Not allowed to {action}")]
    Forbidden { action: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any database work runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., too many decimal places).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Tenant Error
// =============================================================================

/// Failures while resolving who is acting and for which store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantError {
    /// No bearer token, or the token is malformed, expired or badly signed.
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// The token is valid but carries no store claim.
    #[error("Token is not bound to a store")]
    TenantMissing,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 1,
            name: "Falafel".to_string(),
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Falafel: available 5, requested 10"
        );

        let err = CoreError::InvalidDiscount {
            discount: Money::from_cents(5000),
            subtotal: Money::from_cents(3000),
        };
        assert_eq!(
            err.to_string(),
            "Discount 50.00 must be between 0 and the subtotal 30.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "1".to_string(),
            max: "9999".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 9999");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        // Validation text is passed through untouched
        assert_eq!(core_err.to_string(), "name is required");
    }
}
