//! # Store Repository
//!
//! Tenants and their staff accounts.
//!
//! Login and password handling live outside this backend; users exist here
//! so that orders can reference who rang them up and tokens can name a role.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbResult, ServiceResult};
use kasser_core::validation::validate_username;
use kasser_core::{Role, Store, User, ValidationError};

const USER_COLUMNS: &str = "id, store_id, username, full_name, role, is_active, created_at";

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Creates an active store without expiry.
    pub async fn create_store(&self, name: &str) -> ServiceResult<Store> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }

        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (name, is_active, created_at)
            VALUES (?1, 1, ?2)
            RETURNING id, name, is_active, created_at, expires_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(store_id = store.id, name = %store.name, "Store created");
        Ok(store)
    }

    pub async fn get_store(&self, id: i64) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, name, is_active, created_at, expires_at FROM stores WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Creates a staff account.
    ///
    /// `store_id` is `None` only for platform-level SuperAdmins.
    /// Usernames are unique across the whole system.
    pub async fn create_user(
        &self,
        store_id: Option<i64>,
        username: &str,
        full_name: &str,
        role: Role,
    ) -> ServiceResult<User> {
        validate_username(username)?;
        if store_id.is_none() && !role.is_super_admin() {
            return Err(ValidationError::Required {
                field: "storeId".to_string(),
            }
            .into());
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (store_id, username, full_name, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(store_id)
        .bind(username.trim())
        .bind(full_name.trim())
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = user.id, ?store_id, role = %role, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list_users(&self, store_id: i64) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE store_id = ?1 ORDER BY username"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use crate::{DbError, ServiceError};

    #[tokio::test]
    async fn test_store_and_users() {
        let (db, _dir) = test_db().await;
        let store = db.stores().create_store("Koshary Corner").await.unwrap();
        assert!(store.is_active);
        assert!(store.expires_at.is_none());

        let owner = db
            .stores()
            .create_user(Some(store.id), "owner", "Mona Adel", Role::Owner)
            .await
            .unwrap();
        assert_eq!(owner.role, Role::Owner);

        let fetched = db.stores().get_user(owner.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "owner");
        let by_name = db.stores().get_user_by_username("owner").await.unwrap().unwrap();
        assert_eq!(by_name.id, owner.id);
        assert_eq!(db.stores().list_users(store.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let (db, _dir) = test_db().await;
        let store = db.stores().create_store("A").await.unwrap();
        db.stores()
            .create_user(Some(store.id), "cashier1", "C One", Role::Cashier)
            .await
            .unwrap();

        let err = db
            .stores()
            .create_user(Some(store.id), "cashier1", "C Two", Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Storage(ref e @ DbError::UniqueViolation { .. }) if e.is_unique_violation_on("username")
        ));
    }

    #[tokio::test]
    async fn test_only_super_admin_may_be_storeless() {
        let (db, _dir) = test_db().await;

        assert!(db
            .stores()
            .create_user(None, "root", "Platform", Role::SuperAdmin)
            .await
            .is_ok());
        assert!(db
            .stores()
            .create_user(None, "drifter", "No Store", Role::Cashier)
            .await
            .is_err());
    }
}
