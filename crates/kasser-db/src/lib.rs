//! # kasser-db: Database Layer for Kasser POS
//!
//! This crate provides database access for the Kasser POS backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasser POS Data Flow                             │
//! │                                                                         │
//! │  axum handler (POST /api/orders, TenantContext extracted)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasser-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 001_initial  │  │   │
//! │  │   │               │    │ SettingsRepo  │    │  _schema.sql │  │   │
//! │  │   └───────▲───────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │   ┌───────┴────────────────────┴───────┐                       │   │
//! │  │   │  CheckoutService (checkout.rs)     │                       │   │
//! │  │   │  one transaction per order         │                       │   │
//! │  │   └────────────────────────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (store, catalog, orders, settings)
//! - [`checkout`] - The order transaction with stock reconciliation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasser_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kasser.db")).await?;
//!
//! let view = db.checkout().create_order(&ctx, new_order).await?;
//! let page = db.orders().list(ctx.store_id, PageRequest::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutConfig, CheckoutError, CheckoutService, PricingPolicy};
pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
pub use repository::store::StoreRepository;

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use kasser_core::{Money, NewProduct};
    use tempfile::TempDir;

    use crate::{Database, DbConfig};

    /// Fresh, migrated database in a temp directory.
    ///
    /// Keep the `TempDir` alive for as long as the database is used.
    pub async fn test_db() -> (Database, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("kasser-test.db")).max_connections(5);
        let db = Database::new(config).await.unwrap();
        (db, dir)
    }

    pub fn new_product(name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            stock,
            category_id: None,
            image_url: None,
            is_available: true,
        }
    }
}
