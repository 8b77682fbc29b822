//! HTTP routes.
//!
//! Handlers are thin: extract the tenant, translate the wire shape into
//! kasser-core types, call kasser-db, map the error.

pub mod health;
pub mod orders;
pub mod settings;

use axum::routing::{get, patch};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the combined router
pub fn router(state: AppState) -> Router {
    // Tenant-scoped (bearer token required, see TenantContext extractor)
    let api = Router::new()
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/print", get(orders::print_order))
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/api/settings/tax", patch(settings::update_tax));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
