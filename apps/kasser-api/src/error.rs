//! Error types for the Kasser API.
//!
//! Every failure leaves the server as a status code plus a
//! `{ "message": "..." }` body.
//!
//! ```text
//! CoreError (cart / catalog rules) ─────► 400 / 403 / 404 / 409
//! TenantError ──────────────────────────► 401
//! CheckoutError::Conflict ──────────────► 409
//! DbError / CheckoutError::Storage ─────► 500 (logged, generic message)
//! JSON / query / path rejections ───────► 400
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use kasser_core::{CoreError, TenantError, ValidationError};
use kasser_db::{CheckoutError, DbError, ServiceError};

const STORAGE_FAILURE_MESSAGE: &str = "An internal error occurred, please try again";

/// Kasser API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Internal detail; the client only sees a generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn storage(err: DbError) -> Self {
        error!(error = %err, ?err, "Storage failure");
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(_) => STORAGE_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(ErrorBody { message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::OrderNotFound(_) | CoreError::CategoryNotFound(_) => {
                ApiError::NotFound(message)
            }
            CoreError::Forbidden { .. } => ApiError::Forbidden(message),
            CoreError::CategoryInUse { .. } | CoreError::ProductInUse(_) => {
                ApiError::Conflict(message)
            }
            // Cart rejections, including unknown products, are client input errors
            CoreError::EmptyCart
            | CoreError::ProductNotFound(_)
            | CoreError::ProductUnavailable { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::InvalidDiscount { .. }
            | CoreError::Validation(_) => ApiError::BadRequest(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        warn!(error = %err, "Request rejected by tenant resolution");
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::storage(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(core) => core.into(),
            ServiceError::Storage(db) => ApiError::storage(db),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(core) => core.into(),
            CheckoutError::Conflict { .. } | CheckoutError::OrderNumberConflict(_) => {
                ApiError::Conflict(err.to_string())
            }
            CheckoutError::Storage(db) => ApiError::storage(db),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
