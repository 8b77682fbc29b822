//! # kasser-core: Pure Business Logic for Kasser POS
//!
//! This crate holds the rules of the order workflow as pure functions with
//! zero I/O dependencies. The database layer and the HTTP layer call into it;
//! it never calls out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasser POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kasser-api (axum)                            │   │
//! │  │   Bearer JWT ──► TenantContext ──► handlers ──► {message} JSON │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasser-db (SQLite)                           │   │
//! │  │   repositories • checkout transaction • settings get-or-create │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasser-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌─────────┐ ┌────────┐ │   │
//! │  │  │  types  │ │  money  │ │order_number│ │ pricing │ │ tenant │ │   │
//! │  │  │ Product │ │  Money  │ │ YYYYMMDD-  │ │ totals  │ │  Role  │ │   │
//! │  │  │  Order  │ │ Decimal │ │   NNNN     │ │  tax    │ │Context │ │   │
//! │  │  └─────────┘ └─────────┘ └────────────┘ └─────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Store, Product, Order, ...) and the order projection
//! - [`money`] - Integer cents, with decimal conversion at the wire boundary
//! - [`error`] - Domain and tenant error types
//! - [`validation`] - Cart and catalog input rules
//! - [`order_number`] - `YYYYMMDD-NNNN` formatting and parsing
//! - [`pricing`] - Subtotal, discount, tax and total arithmetic
//! - [`tenant`] - Roles and the per-request tenant context
//! - [`pagination`] - Page requests and paged results
//! - [`receipt`] - ESC/POS receipt rendering
//!
//! ## Example Usage
//!
//! ```rust
//! use kasser_core::money::Money;
//! use kasser_core::types::TaxRate;
//!
//! // 2 × 15.00 at 14 %
//! let subtotal = Money::from_cents(1500) * 2;
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1400));
//!
//! assert_eq!(tax.cents(), 420);
//! assert_eq!((subtotal + tax).cents(), 3420);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order_number;
pub mod pagination;
pub mod pricing;
pub mod receipt;
pub mod tenant;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, TenantError, ValidationError};
pub use money::Money;
pub use pagination::{PageRequest, Paged};
pub use pricing::OrderTotals;
pub use tenant::{Role, TenantContext};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart line.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Smallest accepted unit price (0.01).
pub const MIN_UNIT_PRICE_CENTS: i64 = 1;

/// Largest accepted unit price (999999.00).
pub const MAX_UNIT_PRICE_CENTS: i64 = 99_999_900;

/// Tax rate applied when a store has tax enabled but no rate stored (14 %).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_400;

/// Store name written into freshly created settings.
pub const DEFAULT_STORE_NAME: &str = "KasserPro";

/// Currency label written into freshly created settings.
pub const DEFAULT_CURRENCY: &str = "EGP";

/// Product name shown for order lines whose product row is gone.
pub const DELETED_PRODUCT_NAME: &str = "Deleted product";
