//! # Category Repository
//!
//! Product categories, scoped to a store. A category that still has
//! products cannot be deleted; callers move or delete the products first.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, ServiceResult};
use kasser_core::validation::validate_new_category;
use kasser_core::{Category, CoreError, NewCategory};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn create(&self, store_id: i64, category: &NewCategory) -> ServiceResult<Category> {
        validate_new_category(category)?;

        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (store_id, name, color, icon, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, store_id, name, color, icon, created_at
            "#,
        )
        .bind(store_id)
        .bind(category.name.trim())
        .bind(&category.color)
        .bind(&category.icon)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(store_id, category_id = created.id, "Category created");
        Ok(created)
    }

    pub async fn get(&self, store_id: i64, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, store_id, name, color, icon, created_at FROM categories WHERE id = ?1 AND store_id = ?2",
        )
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn list(&self, store_id: i64) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, store_id, name, color, icon, created_at FROM categories WHERE store_id = ?1 ORDER BY name, id",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Number of products in the category.
    pub async fn product_count(&self, store_id: i64, id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1 AND store_id = ?2")
                .bind(id)
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes an empty category.
    ///
    /// ## Errors
    /// - `CategoryNotFound` - not in this store
    /// - `CategoryInUse` - products still reference it
    pub async fn delete(&self, store_id: i64, id: i64) -> ServiceResult<()> {
        let products = self.product_count(store_id, id).await?;
        if products > 0 {
            return Err(CoreError::CategoryInUse {
                category_id: id,
                products,
            }
            .into());
        }

        let done = sqlx::query("DELETE FROM categories WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        debug!(store_id, category_id = id, "Category deleted");
        Ok(())
    }
}
