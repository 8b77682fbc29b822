//! # Order Repository
//!
//! Order reads (list and single projection) plus the statements the checkout
//! transaction runs to mint a number and persist an order.
//!
//! ## Read Path
//! ```text
//! list(store, page)
//!    │
//!    ├── COUNT(*) orders of the store
//!    ├── page of orders     ORDER BY created_at DESC, id DESC  LIMIT/OFFSET
//!    └── items of that page LEFT JOIN products (name, may be gone)
//!    │
//!    ▼
//! Paged<OrderView>   (tax + total derived in kasser-core)
//! ```
//!
//! All three reads run in one transaction so the page and its items come
//! from the same snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasser_core::order_number;
use kasser_core::{Order, OrderItem, OrderView, PageRequest, Paged, PaymentMethod, TaxRate};

const ORDER_COLUMNS: &str = "o.id, o.store_id, o.user_id, o.order_number, o.subtotal_cents, \
     o.discount_cents, o.tax_rate_bps, o.payment_method, o.created_at";

const ITEM_COLUMNS: &str = "oi.id, oi.order_id, oi.product_id, p.name AS product_name, \
     oi.quantity, oi.price_at_time_cents";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// One order of the store, projected.
    ///
    /// Orders of other stores are reported as absent.
    pub async fn get(&self, store_id: i64, id: i64) -> DbResult<Option<OrderView>> {
        let mut conn = self.pool.acquire().await?;
        fetch_view(&mut conn, store_id, id).await
    }

    /// A page of the store's orders, newest first.
    pub async fn list(&self, store_id: i64, page: PageRequest) -> DbResult<Paged<OrderView>> {
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE store_id = ?1")
            .bind(store_id)
            .fetch_one(&mut *tx)
            .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            WHERE o.store_id = ?1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(store_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id IN (
                SELECT o.id FROM orders o
                WHERE o.store_id = ?1
                ORDER BY o.created_at DESC, o.id DESC
                LIMIT ?2 OFFSET ?3
            )
            ORDER BY oi.order_id, oi.id
            "#
        ))
        .bind(store_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        let views = orders
            .iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderView::project(order, &items)
            })
            .collect();

        debug!(store_id, page = page.page(), total_count, "Listed orders");
        Ok(Paged::new(views, total_count, page))
    }
}

// =============================================================================
// Statements usable inside a transaction
// =============================================================================

const HIGHEST_SUFFIX_SQL: &str = r#"
    SELECT MAX(CAST(substr(order_number, ?1) AS INTEGER))
    FROM orders
    WHERE order_number >= ?2 || '-' AND order_number < ?2 || '.'
"#;

/// Highest numeric suffix among ALL orders numbered on `date`, any store.
///
/// The day is selected as a range (`'.'` sorts right after `'-'`) so the
/// lookup stays on the UNIQUE index of `order_number`.
pub async fn highest_suffix_on(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> DbResult<Option<i64>> {
    let suffix_start = order_number::PREFIX_LEN as i64 + 1;

    let highest: Option<i64> = sqlx::query_scalar(HIGHEST_SUFFIX_SQL)
    .bind(suffix_start)
    .bind(order_number::day_prefix(date))
    .fetch_one(&mut *conn)
    .await?;

    Ok(highest)
}

/// Next free order number for `date`.
///
/// Only safe against duplicates when the caller holds the write lock; the
/// UNIQUE index on `order_number` catches anything that slips through.
pub async fn next_order_number(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<String> {
    let highest = highest_suffix_on(conn, date).await?;
    Ok(order_number::format(date, order_number::next_counter(highest)))
}

/// Header row of a new order.
#[derive(Debug, Clone)]
pub struct OrderHeader<'a> {
    pub store_id: i64,
    pub user_id: Option<i64>,
    pub order_number: &'a str,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_rate: TaxRate,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// Inserts the order header and returns its id.
///
/// `user_id` is recorded only when it names a user of the same store; a
/// token subject unknown to this database leaves the column NULL.
///
/// A duplicate number surfaces as `DbError::UniqueViolation` on
/// `orders.order_number`.
pub async fn insert_order(conn: &mut SqliteConnection, header: &OrderHeader<'_>) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders
            (store_id, user_id, order_number, subtotal_cents, discount_cents,
             tax_rate_bps, payment_method, created_at)
        VALUES (?1, (SELECT id FROM users WHERE id = ?2 AND store_id = ?1),
                ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING id
        "#,
    )
    .bind(header.store_id)
    .bind(header.user_id)
    .bind(header.order_number)
    .bind(header.subtotal_cents)
    .bind(header.discount_cents)
    .bind(header.tax_rate.bps())
    .bind(header.payment_method)
    .bind(header.created_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Inserts one order line with its captured unit price.
pub async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price_at_time_cents: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price_at_time_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_at_time_cents)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Loads and projects one order of a store.
pub async fn fetch_view(
    conn: &mut SqliteConnection,
    store_id: i64,
    id: i64,
) -> DbResult<Option<OrderView>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?1 AND o.store_id = ?2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ?1
        ORDER BY oi.id
        "#
    ))
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(OrderView::project(&order, &items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use sqlx::Row;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn header(store_id: i64, number: &str) -> OrderHeader<'_> {
        OrderHeader {
            store_id,
            user_id: None,
            order_number: number,
            subtotal_cents: 1000,
            discount_cents: 0,
            tax_rate: TaxRate::zero(),
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sequence_is_global_and_numeric() {
        let (db, _dir) = test_db().await;
        let a = db.stores().create_store("A").await.unwrap();
        let b = db.stores().create_store("B").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(next_order_number(&mut conn, day()).await.unwrap(), "20261019-0001");

        insert_order(&mut conn, &header(a.id, "20261019-0009")).await.unwrap();
        // Another store's order still advances the shared sequence
        insert_order(&mut conn, &header(b.id, "20261019-0010")).await.unwrap();
        // Neighbouring days do not count
        insert_order(&mut conn, &header(a.id, "20261018-0500")).await.unwrap();
        insert_order(&mut conn, &header(b.id, "20261020-0700")).await.unwrap();

        assert_eq!(next_order_number(&mut conn, day()).await.unwrap(), "20261019-0011");
    }

    #[tokio::test]
    async fn test_suffix_compared_numerically_past_9999() {
        let (db, _dir) = test_db().await;
        let a = db.stores().create_store("A").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        insert_order(&mut conn, &header(a.id, "20261019-9999")).await.unwrap();
        insert_order(&mut conn, &header(a.id, "20261019-10000")).await.unwrap();

        assert_eq!(next_order_number(&mut conn, day()).await.unwrap(), "20261019-10001");
    }

    #[tokio::test]
    async fn test_suffix_lookup_searches_the_order_number_index() {
        let (db, _dir) = test_db().await;
        let plan = sqlx::query(&format!("EXPLAIN QUERY PLAN {HIGHEST_SUFFIX_SQL}"))
            .bind(order_number::PREFIX_LEN as i64 + 1)
            .bind(order_number::day_prefix(day()))
            .fetch_all(db.pool())
            .await
            .unwrap();

        let details: Vec<String> = plan.iter().map(|row| row.get("detail")).collect();
        assert!(
            details.iter().any(|d| d.starts_with("SEARCH") && d.contains("INDEX")),
            "full scan: {details:?}"
        );
    }

    #[tokio::test]
    async fn test_duplicate_number_is_a_unique_violation() {
        let (db, _dir) = test_db().await;
        let a = db.stores().create_store("A").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        insert_order(&mut conn, &header(a.id, "20261019-0001")).await.unwrap();
        let err = insert_order(&mut conn, &header(a.id, "20261019-0001"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("order_number"));
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_store() {
        let (db, _dir) = test_db().await;
        let a = db.stores().create_store("A").await.unwrap();
        let b = db.stores().create_store("B").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let id = insert_order(&mut conn, &header(a.id, "20261019-0001")).await.unwrap();
        drop(conn);

        assert!(db.orders().get(a.id, id).await.unwrap().is_some());
        assert!(db.orders().get(b.id, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let (db, _dir) = test_db().await;
        let a = db.stores().create_store("A").await.unwrap();
        let b = db.stores().create_store("B").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let created = Utc::now();
        for n in 1..=5 {
            let number = format!("20261019-{n:04}");
            let mut h = header(a.id, &number);
            h.created_at = created;
            insert_order(&mut conn, &h).await.unwrap();
        }
        insert_order(&mut conn, &header(b.id, "20261019-0006")).await.unwrap();
        drop(conn);

        let first = db.orders().list(a.id, PageRequest::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(first.total_count, 5);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);
        // Same timestamp: id breaks the tie, newest first
        assert_eq!(first.items[0].order_number, "20261019-0005");
        assert_eq!(first.items[1].order_number, "20261019-0004");

        let last = db.orders().list(a.id, PageRequest::new(Some(3), Some(2))).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].order_number, "20261019-0001");
        assert!(!last.has_next_page);
    }
}
