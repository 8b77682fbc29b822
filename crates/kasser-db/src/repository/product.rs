//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD scoped to a store
//! - Manual stock changes that keep the availability flag consistent
//! - The guarded stock decrement used by the checkout transaction
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │     SET stock = stock - q,                                              │
//! │         is_available = (stock - q > 0 ? is_available : 0),             │
//! │         version = version + 1                                           │
//! │   WHERE id = ? AND store_id = ?          ← tenant scope                 │
//! │     AND is_available = 1                 ← still sellable               │
//! │     AND stock >= q                       ← enough on hand               │
//! │  RETURNING price_cents, stock                                           │
//! │                                                                         │
//! │  1 row  → decremented, live price + new stock returned                  │
//! │  0 rows → nothing changed; caller re-reads to say WHY                   │
//! │                                                                         │
//! │  Check and write are ONE statement, so two concurrent checkouts can     │
//! │  never both pass the check against the same units.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, ServiceResult};
use kasser_core::validation::{validate_new_product, validate_stock};
use kasser_core::{CoreError, NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, store_id, category_id, name, price_cents, stock, is_available, \
     image_url, created_at, updated_at, version";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product in `store_id`.
    ///
    /// A product created with zero stock is never available, whatever the
    /// caller asked for.
    pub async fn create(&self, store_id: i64, product: &NewProduct) -> ServiceResult<Product> {
        validate_new_product(product)?;

        if let Some(category_id) = product.category_id {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1 AND store_id = ?2)",
            )
            .bind(category_id)
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;
            if !exists {
                return Err(CoreError::CategoryNotFound(category_id).into());
            }
        }

        let now = Utc::now();
        let is_available = product.is_available && product.stock > 0;

        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products
                (store_id, category_id, name, price_cents, stock, is_available,
                 image_url, created_at, updated_at, version)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, 1)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(store_id)
        .bind(product.category_id)
        .bind(product.name.trim())
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(is_available)
        .bind(&product.image_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(store_id, product_id = created.id, "Product created");
        Ok(created)
    }

    /// Gets a product by id within a store.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found in this store
    /// * `Ok(None)` - No such product, or it belongs to another store
    pub async fn get(&self, store_id: i64, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        find_in_store(&mut conn, store_id, id).await
    }

    /// Lists all products of a store, by name.
    pub async fn list(&self, store_id: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = ?1 ORDER BY name, id"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Sets the stock level after a count or delivery.
    ///
    /// ## Availability
    /// ```text
    /// stock == 0  →  is_available = false
    /// stock  > 0  →  is_available = true   (restock re-enables the product)
    /// ```
    pub async fn set_stock(&self, store_id: i64, id: i64, stock: i64) -> ServiceResult<Product> {
        validate_stock(stock)?;

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET stock = ?1,
                is_available = CASE WHEN ?1 > 0 THEN 1 ELSE 0 END,
                version = version + 1,
                updated_at = ?2
            WHERE id = ?3 AND store_id = ?4
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(stock)
        .bind(Utc::now())
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        let product = updated.ok_or(CoreError::ProductNotFound(id))?;
        debug!(store_id, product_id = id, stock, "Stock set");
        Ok(product)
    }

    /// Deletes a product that no order references.
    ///
    /// ## Errors
    /// - `ProductNotFound` - not in this store
    /// - `ProductInUse` - at least one order line points at it
    pub async fn delete(&self, store_id: i64, id: i64) -> ServiceResult<()> {
        let referenced: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM order_items oi
                JOIN products p ON p.id = oi.product_id
                WHERE oi.product_id = ?1 AND p.store_id = ?2
            )
            "#,
        )
        .bind(id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;
        if referenced {
            return Err(CoreError::ProductInUse(id).into());
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from);

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(CoreError::ProductNotFound(id).into()),
            Ok(_) => {
                debug!(store_id, product_id = id, "Product deleted");
                Ok(())
            }
            // An order line was written between the check and the delete
            Err(e) if e.is_foreign_key_violation() => Err(CoreError::ProductInUse(id).into()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Statements usable inside a transaction
// =============================================================================

/// Result of a successful guarded decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct StockDecrement {
    /// Catalog price at the moment of the decrement.
    pub price_cents: i64,
    /// Stock left after the decrement.
    pub stock: i64,
}

/// Looks up a product by id within a store.
pub async fn find_in_store(
    conn: &mut SqliteConnection,
    store_id: i64,
    id: i64,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND store_id = ?2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Takes `quantity` units off a product if, and only if, it belongs to the
/// store, is available and has enough stock.
///
/// `Ok(None)` means no row matched and nothing was written.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    store_id: i64,
    product_id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<StockDecrement>> {
    let row = sqlx::query_as::<_, StockDecrement>(
        r#"
        UPDATE products
        SET stock = stock - ?1,
            is_available = CASE WHEN stock - ?1 <= 0 THEN 0 ELSE is_available END,
            version = version + 1,
            updated_at = ?2
        WHERE id = ?3
          AND store_id = ?4
          AND is_available = 1
          AND stock >= ?1
        RETURNING price_cents, stock
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(dec) = &row {
        debug!(store_id, product_id, quantity, stock_left = dec.stock, "Stock decremented");
    }
    Ok(row)
}

// =============================================================================
// Unit Tests
// =============================================================================
