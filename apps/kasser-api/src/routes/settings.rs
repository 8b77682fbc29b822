//! Store settings endpoints.
//!
//! `GET` creates default settings on first access. `PUT` (everything) and
//! `PATCH /tax` are limited to roles that may manage the store.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;
use kasser_core::{SettingsUpdate, SettingsView, TaxRate, TenantContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaxRequest {
    pub tax_enabled: bool,
    /// Percentage, 0 to 100
    pub tax_rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub tax_enabled: bool,
    /// Percentage, 0 to 100
    pub tax_rate: Decimal,
    pub store_name: String,
    pub currency: String,
}

pub async fn get_settings(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<Json<SettingsView>> {
    let settings = state.db.settings().get_or_create(ctx.store_id).await?;
    Ok(Json(SettingsView::from(&settings)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    ctx: TenantContext,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    let update = SettingsUpdate {
        tax_enabled: request.tax_enabled,
        tax_rate: TaxRate::try_from_percent(request.tax_rate)?,
        store_name: request.store_name,
        currency: request.currency,
    };

    state.db.settings().update(&ctx, &update).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_tax(
    State(state): State<AppState>,
    ctx: TenantContext,
    payload: Result<Json<UpdateTaxRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    let rate = TaxRate::try_from_percent(request.tax_rate)?;

    state
        .db
        .settings()
        .update_tax(&ctx, request.tax_enabled, rate)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
