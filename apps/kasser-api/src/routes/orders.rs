//! # Order Endpoints
//!
//! ```text
//! POST /api/orders            cart ──► CheckoutService ──► 201 OrderView
//! GET  /api/orders            ?page=1&pageSize=20 ──► Paged<OrderView>
//! GET  /api/orders/{id}       ──► OrderView | 404
//! GET  /api/orders/{id}/print ──► ESC/POS bytes (application/octet-stream)
//! ```
//!
//! Amounts arrive as JSON numbers and are converted to integer cents here;
//! anything with more than two decimal places is a 400.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;
use kasser_core::receipt::render_receipt;
use kasser_core::{
    CartLine, CoreError, Money, NewOrder, OrderView, PageRequest, Paged, PaymentMethod,
    TenantContext, ValidationError, DEFAULT_CURRENCY, DEFAULT_STORE_NAME,
};

// =============================================================================
// Wire Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CartLineRequest>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub price_at_time: Decimal,
}

impl CreateOrderRequest {
    pub fn into_new_order(self) -> Result<NewOrder, ValidationError> {
        let lines = self
            .items
            .into_iter()
            .map(|item| {
                Ok(CartLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price_at_time: Money::try_from_decimal("priceAtTime", item.price_at_time)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(NewOrder {
            lines,
            discount: Money::try_from_decimal("discount", self.discount)?,
            payment_method: self.payment_method,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn create_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderView>)> {
    let Json(request) = payload?;
    let order = request.into_new_order()?;

    let view = state.db.checkout().create_order(&ctx, order).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    ctx: TenantContext,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<OrderView>>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.page_size);

    let orders = state.db.orders().list(ctx.store_id, page).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<OrderView>> {
    let Path(id) = id?;
    let order = find_order(&state, &ctx, id).await?;
    Ok(Json(order))
}

pub async fn print_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let order = find_order(&state, &ctx, id).await?;

    // Printing never creates settings; fall back to the defaults instead
    let settings = state.db.settings().find(ctx.store_id).await?;
    let (store_name, currency) = match &settings {
        Some(s) => (s.store_name.as_str(), s.currency.as_str()),
        None => (DEFAULT_STORE_NAME, DEFAULT_CURRENCY),
    };

    let bytes = render_receipt(&order, store_name, currency);
    debug!(store_id = ctx.store_id, order_id = id, bytes = bytes.len(), "Receipt rendered");

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

async fn find_order(state: &AppState, ctx: &TenantContext, id: i64) -> ApiResult<OrderView> {
    let order = state
        .db
        .orders()
        .get(ctx.store_id, id)
        .await?
        .ok_or(CoreError::OrderNotFound(id))?;
    Ok(order)
}
