//! # Checkout
//!
//! Turns a cart into a persisted order while taking the sold units out of
//! stock, all in a single SQLite transaction.
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_new_order (kasser-core, no connection yet)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── per line: guarded UPDATE products ... RETURNING                   │
//! │  │      └── no row? re-read → NotFound / Unavailable / InsufficientStock│
//! │  ├── subtotal, discount ≤ subtotal                                     │
//! │  ├── tax rate from app_settings (no row → 0)                           │
//! │  ├── next order number for today (global sequence)                     │
//! │  ├── INSERT orders, INSERT order_items                                 │
//! │  └── read back the projection                                          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction: every write above is rolled back.    │
//! │  UNIQUE(order_number) violated → retry the whole transaction.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Overselling Cannot Happen
//! The first statement of every attempt is a write, so the transaction holds
//! SQLite's write lock before it reads anything. The stock check and the
//! decrement are the same statement (`WHERE stock >= ?`), and `CHECK
//! (stock >= 0)` sits underneath as a last line.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::repository::order::{self as order_repo, OrderHeader};
use crate::repository::{product, settings};
use kasser_core::pricing::{check_discount, subtotal_of};
use kasser_core::validation::validate_new_order;
use kasser_core::{CartLine, CoreError, Money, NewOrder, OrderView, TaxPolicy, TenantContext, ValidationError};

/// Attempts per order before giving up on order number conflicts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// =============================================================================
// Configuration
// =============================================================================

/// Which unit price an order line records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    /// The price the client sent with the line.
    #[default]
    ClientSnapshot,
    /// The catalog price at the moment of the sale.
    CatalogPrice,
}

impl PricingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingPolicy::ClientSnapshot => "client",
            PricingPolicy::CatalogPrice => "catalog",
        }
    }
}

impl fmt::Display for PricingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown pricing policy '{0}' (expected 'client' or 'catalog')")]
pub struct UnknownPricingPolicy(pub String);

impl FromStr for PricingPolicy {
    type Err = UnknownPricingPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(PricingPolicy::ClientSnapshot),
            "catalog" => Ok(PricingPolicy::CatalogPrice),
            _ => Err(UnknownPricingPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub max_attempts: u32,
    pub pricing: PricingPolicy,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pricing: PricingPolicy::default(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Outcome of a failed checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart broke a business rule. Never retried.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Another transaction took this order number first. Retried internally.
    #[error("Order number {0} is already taken")]
    OrderNumberConflict(String),

    /// Every attempt hit an order number conflict.
    #[error("Could not allocate an order number after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl CheckoutError {
    /// Whether a fresh attempt could succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::OrderNumberConflict(_))
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Rejected(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Storage(DbError::from(err))
    }
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    config: CheckoutConfig,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, config: CheckoutConfig) -> Self {
        CheckoutService { pool, config }
    }

    /// Confirms a cart for the acting store.
    ///
    /// ## Errors
    /// - `Rejected(EmptyCart | Validation)` - before touching the database
    /// - `Rejected(ProductNotFound | ProductUnavailable | InsufficientStock)`
    /// - `Rejected(InvalidDiscount)` - discount above the subtotal
    /// - `Conflict` - order number conflicts on every attempt
    /// - `Storage` - anything the database threw
    pub async fn create_order(
        &self,
        ctx: &TenantContext,
        order: NewOrder,
    ) -> Result<OrderView, CheckoutError> {
        validate_new_order(&order)?;

        let order = &order;
        retry_on_conflict(ctx.store_id, self.config.max_attempts, || {
            self.attempt(ctx, order)
        })
        .await
    }

    async fn attempt(&self, ctx: &TenantContext, order: &NewOrder) -> Result<OrderView, CheckoutError> {
        let store_id = ctx.store_id;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let mut priced: Vec<(&CartLine, Money)> = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let taken = product::decrement_stock(
                &mut tx,
                store_id,
                line.product_id,
                line.quantity,
                now,
            )
            .await?;

            let Some(taken) = taken else {
                return Err(why_not_sellable(&mut tx, store_id, line).await);
            };

            let unit_price = match self.config.pricing {
                PricingPolicy::ClientSnapshot => line.price_at_time,
                PricingPolicy::CatalogPrice => Money::from_cents(taken.price_cents),
            };
            priced.push((line, unit_price));
        }

        let subtotal = subtotal_of(priced.iter().map(|(line, price)| (*price, line.quantity)));
        check_discount(order.discount, subtotal)?;

        let stored_settings = settings::find_in(&mut tx, store_id).await?;
        let tax_rate = TaxPolicy::resolve(stored_settings.as_ref());

        let order_number = order_repo::next_order_number(&mut tx, now.date_naive()).await?;
        let header = OrderHeader {
            store_id,
            user_id: Some(ctx.user_id),
            order_number: &order_number,
            subtotal_cents: subtotal.cents(),
            discount_cents: order.discount.cents(),
            tax_rate,
            payment_method: order.payment_method,
            created_at: now,
        };

        let order_id = match order_repo::insert_order(&mut tx, &header).await {
            Ok(id) => id,
            Err(e) if e.is_unique_violation_on("order_number") => {
                return Err(CheckoutError::OrderNumberConflict(order_number));
            }
            Err(e) => return Err(e.into()),
        };

        for (line, price) in &priced {
            order_repo::insert_item(&mut tx, order_id, line.product_id, line.quantity, price.cents())
                .await?;
        }

        let view = order_repo::fetch_view(&mut tx, store_id, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            store_id,
            user_id = ctx.user_id,
            order_id,
            order_number = %view.order_number,
            lines = priced.len(),
            total = %view.total,
            "Order created"
        );
        Ok(view)
    }
}

/// Runs `run` until it returns anything but a retryable conflict, at most
/// `max_attempts` times (at least once).
async fn retry_on_conflict<T, F, Fut>(
    store_id: i64,
    max_attempts: u32,
    mut run: F,
) -> Result<T, CheckoutError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CheckoutError>>,
{
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        match run().await {
            Err(e) if e.is_retryable() => {
                warn!(
                    store_id,
                    error = %e,
                    attempt,
                    max_attempts = attempts,
                    "Order number conflict, retrying"
                );
            }
            outcome => return outcome,
        }
    }

    warn!(store_id, attempts, "Giving up on order number allocation");
    Err(CheckoutError::Conflict { attempts })
}

/// Works out which rule a line broke after its guarded decrement matched
/// nothing. Runs inside the same transaction, so it sees this order's own
/// earlier decrements.
async fn why_not_sellable(conn: &mut SqliteConnection, store_id: i64, line: &CartLine) -> CheckoutError {
    let product = match product::find_in_store(conn, store_id, line.product_id).await {
        Ok(product) => product,
        Err(e) => return e.into(),
    };

    let rejection = match product {
        None => CoreError::ProductNotFound(line.product_id),
        Some(p) if !p.is_available => CoreError::ProductUnavailable {
            product_id: p.id,
            name: p.name,
        },
        Some(p) => CoreError::InsufficientStock {
            product_id: p.id,
            name: p.name,
            available: p.stock,
            requested: line.quantity,
        },
    };

    debug!(store_id, product_id = line.product_id, %rejection, "Cart line rejected");
    rejection.into()
}
