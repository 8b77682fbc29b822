//! # Kasser API
//!
//! REST server for the multi-tenant Kasser POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kasser API Routes                               │
//! │                                                                         │
//! │  ┌────────────────────────────┐  ┌────────────────────────────────────┐│
//! │  │  Orders                    │  │  Settings                          ││
//! │  │                            │  │                                    ││
//! │  │ • POST /api/orders         │  │ • GET   /api/settings              ││
//! │  │ • GET  /api/orders         │  │ • PATCH /api/settings/tax          ││
//! │  │ • GET  /api/orders/{id}    │  │                                    ││
//! │  │ • GET  /api/orders/{id}/   │  └────────────────────────────────────┘│
//! │  │        print               │                                        │
//! │  └────────────────────────────┘  ┌────────────────────────────────────┐│
//! │                                  │  GET /health (no token)            ││
//! │                                  └────────────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────────────────────────────────┐  │  │
//! │  │  │  kasser-db   │  │    JWT Auth                              │  │  │
//! │  │  │  (SQLite)    │  │    Bearer token → TenantContext          │  │  │
//! │  │  └──────────────┘  └──────────────────────────────────────────┘  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `HTTP_PORT` - HTTP port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./kasser.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ISSUER` - Expected issuer (default: KasserPro)
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `ORDER_MAX_ATTEMPTS` - checkout retries on order number conflicts (default: 3)
//! - `KASSER_PRICING` - `client` or `catalog` (default: client)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;

use kasser_db::Database;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            config.jwt_access_lifetime_secs,
        );

        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }

    /// Router with this state attached.
    pub fn into_router(self) -> Router {
        router(self)
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::{ApiConfig, AppState};
    use kasser_core::{Money, NewProduct, Product, Role, TenantContext};
    use kasser_db::{Database, DbConfig};

    pub struct TestApp {
        pub router: Router,
        pub state: AppState,
        pub store_id: i64,
        pub owner: TenantContext,
        pub cashier: TenantContext,
        _dir: TempDir,
    }

    pub fn test_config(dir: &TempDir) -> ApiConfig {
        ApiConfig {
            http_port: 0,
            database_path: dir.path().join("kasser-api-test.db"),
            db_max_connections: 5,
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "KasserPro".to_string(),
            jwt_access_lifetime_secs: 3600,
            order_max_attempts: 3,
            pricing: "client".to_string(),
        }
    }

    /// Migrated database with one store, an owner and a cashier.
    pub async fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let db = Database::new(DbConfig::new(config.database_path.clone()).max_connections(5))
            .await
            .unwrap();

        let store = db.stores().create_store("Koshary Corner").await.unwrap();
        let owner = db
            .stores()
            .create_user(Some(store.id), "owner", "Mona Adel", Role::Owner)
            .await
            .unwrap();
        let cashier = db
            .stores()
            .create_user(Some(store.id), "cashier", "Omar Said", Role::Cashier)
            .await
            .unwrap();

        let state = AppState::new(db, &config);
        TestApp {
            router: super::router(state.clone()),
            state,
            store_id: store.id,
            owner: TenantContext::new(store.id, owner.id, Role::Owner),
            cashier: TenantContext::new(store.id, cashier.id, Role::Cashier),
            _dir: dir,
        }
    }

    impl TestApp {
        pub fn db(&self) -> &Database {
            &self.state.db
        }

        pub fn token(&self, ctx: TenantContext) -> String {
            self.state
                .jwt
                .issue(ctx.user_id, Some(ctx.store_id), ctx.role)
                .unwrap()
        }

        pub async fn product(&self, name: &str, price_cents: i64, stock: i64) -> Product {
            self.db()
                .products()
                .create(
                    self.store_id,
                    &NewProduct {
                        name: name.to_string(),
                        price: Money::from_cents(price_cents),
                        stock,
                        category_id: None,
                        image_url: None,
                        is_available: true,
                    },
                )
                .await
                .unwrap()
        }

        /// Sends a request and returns the status and raw body.
        pub async fn send_raw(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<String>,
        ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, headers, bytes.to_vec())
        }

        /// Sends a JSON request and parses the JSON response (Null when empty).
        pub async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, _, bytes) = self
                .send_raw(method, uri, token, body.map(|b| b.to_string()))
                .await;
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }
}
