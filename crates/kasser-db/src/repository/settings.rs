//! # Settings Repository
//!
//! Per-store settings and the tax policy derived from them.
//!
//! ## Get-or-Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SELECT ... WHERE store_id = ?                                         │
//! │       │                                                                 │
//! │       ├── found ───────────────────────────────────────► return it     │
//! │       ▼                                                                 │
//! │  INSERT defaults (tax on, 14 %, "KasserPro", "EGP")                    │
//! │       │                                                                 │
//! │       ├── ok ──────────────────────────────────────────► return it     │
//! │       ▼                                                                 │
//! │  UNIQUE(store_id) violated: a concurrent request won the race          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT again ─────────────────────────────────────────► return it     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checkout transaction does NOT go through get-or-create. It reads with
//! [`find_in`]; a store that never saved settings is charged no tax.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult, ServiceResult};
use kasser_core::validation::validate_settings_update;
use kasser_core::{
    AppSettings, SettingsUpdate, TaxPolicy, TaxRate, TenantContext, DEFAULT_CURRENCY,
    DEFAULT_STORE_NAME, DEFAULT_TAX_RATE_BPS,
};

const SETTINGS_COLUMNS: &str =
    "id, store_id, tax_enabled, tax_rate_bps, store_name, currency, updated_at";

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Settings of a store, if it has any.
    pub async fn find(&self, store_id: i64) -> DbResult<Option<AppSettings>> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, store_id).await
    }

    /// Settings of a store, created with defaults on first access.
    pub async fn get_or_create(&self, store_id: i64) -> DbResult<AppSettings> {
        if let Some(existing) = self.find(store_id).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query_as::<_, AppSettings>(&format!(
            r#"
            INSERT INTO app_settings (store_id, tax_enabled, tax_rate_bps, store_name, currency, updated_at)
            VALUES (?1, 1, ?2, ?3, ?4, ?5)
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(store_id)
        .bind(DEFAULT_TAX_RATE_BPS)
        .bind(DEFAULT_STORE_NAME)
        .bind(DEFAULT_CURRENCY)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from);

        match inserted {
            Ok(settings) => {
                info!(store_id, "Default settings created");
                Ok(settings)
            }
            Err(e) if e.is_unique_violation_on("store_id") => {
                debug!(store_id, "Settings created concurrently, re-reading");
                self.find(store_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("AppSettings", store_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Tax policy for a store (creating default settings if needed).
    pub async fn tax_policy(&self, store_id: i64) -> DbResult<TaxPolicy> {
        Ok(self.get_or_create(store_id).await?.tax_policy())
    }

    /// Turns tax on or off and sets the rate for the acting store.
    ///
    /// ## Errors
    /// - `Forbidden` - role is not Owner, Manager or SuperAdmin
    pub async fn update_tax(
        &self,
        ctx: &TenantContext,
        enabled: bool,
        rate: TaxRate,
    ) -> ServiceResult<AppSettings> {
        ctx.require_settings_manager()?;

        // Make sure the row exists, then update it in place
        self.get_or_create(ctx.store_id).await?;

        let updated = sqlx::query_as::<_, AppSettings>(&format!(
            r#"
            UPDATE app_settings
            SET tax_enabled = ?1, tax_rate_bps = ?2, updated_at = ?3
            WHERE store_id = ?4
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(enabled)
        .bind(rate.bps())
        .bind(Utc::now())
        .bind(ctx.store_id)
        .fetch_one(&self.pool)
        .await?;

        info!(
            store_id = ctx.store_id,
            user_id = ctx.user_id,
            enabled,
            rate_bps = rate.bps(),
            "Tax settings updated"
        );
        Ok(updated)
    }

    /// Replaces every editable setting of the acting store, creating the row
    /// if the store has none yet.
    ///
    /// ## Errors
    /// - `Forbidden` - role is not Owner, Manager or SuperAdmin
    /// - `Validation` - empty or oversized store name / currency
    pub async fn update(
        &self,
        ctx: &TenantContext,
        update: &SettingsUpdate,
    ) -> ServiceResult<AppSettings> {
        ctx.require_settings_manager()?;
        validate_settings_update(update)?;

        let updated = sqlx::query_as::<_, AppSettings>(&format!(
            r#"
            INSERT INTO app_settings (store_id, tax_enabled, tax_rate_bps, store_name, currency, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (store_id) DO UPDATE SET
                tax_enabled = excluded.tax_enabled,
                tax_rate_bps = excluded.tax_rate_bps,
                store_name = excluded.store_name,
                currency = excluded.currency,
                updated_at = excluded.updated_at
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(ctx.store_id)
        .bind(update.tax_enabled)
        .bind(update.tax_rate.bps())
        .bind(update.store_name.trim())
        .bind(update.currency.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(
            store_id = ctx.store_id,
            user_id = ctx.user_id,
            store_name = %updated.store_name,
            currency = %updated.currency,
            "Settings updated"
        );
        Ok(updated)
    }
}

/// Reads a store's settings on an existing connection or transaction.
pub async fn find_in(conn: &mut SqliteConnection, store_id: i64) -> DbResult<Option<AppSettings>> {
    let settings = sqlx::query_as::<_, AppSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM app_settings WHERE store_id = ?1"
    ))
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(settings)
}
