//! JWT authentication module.
//!
//! Issues and validates access tokens, and resolves the tenant of a request.
//!
//! ## Tenant Resolution
//! ```text
//! Authorization: Bearer <jwt>
//!      │
//!      ├── header missing / not "Bearer ..." ──► 401 Unauthenticated
//!      ▼
//! HS256 signature, exp, iss
//!      │
//!      ├── invalid or expired ─────────────────► 401 Unauthenticated
//!      ▼
//! claims.store_id
//!      │
//!      ├── absent ─────────────────────────────► 401 TenantMissing
//!      ▼
//! TenantContext { store_id, user_id, role }
//! ```
//!
//! Every order and settings handler takes [`TenantContext`] as an argument,
//! so no handler can run without a resolved store.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;
use kasser_core::{Role, TenantContext, TenantError};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Store the user acts for; `None` for platform-level accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Turns validated claims into the tenant of a request.
    pub fn tenant(&self) -> Result<TenantContext, TenantError> {
        let user_id: i64 = self
            .sub
            .parse()
            .map_err(|_| TenantError::Unauthenticated("malformed subject claim".to_string()))?;
        let store_id = self.store_id.ok_or(TenantError::TenantMissing)?;

        Ok(TenantContext::new(store_id, user_id, self.role))
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.issuer)
            .field("access_lifetime_secs", &self.access_lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, issuer: impl Into<String>, access_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_lifetime_secs,
        }
    }

    /// Generate an access token.
    pub fn issue(&self, user_id: i64, store_id: Option<i64>, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            store_id,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, TenantError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TenantError::Unauthenticated(format!("invalid token: {}", e)))
    }

    /// Resolves the tenant behind an `Authorization` header value.
    pub fn resolve(&self, auth_header: Option<&str>) -> Result<TenantContext, TenantError> {
        let header = auth_header
            .ok_or_else(|| TenantError::Unauthenticated("missing bearer token".to_string()))?;
        let token = extract_bearer_token(header).ok_or_else(|| {
            TenantError::Unauthenticated("authorization header is not a bearer token".to_string())
        })?;

        self.validate(token)?.tenant()
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(*ctx);
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match state.jwt.resolve(header) {
            Ok(ctx) => {
                parts.extensions.insert(ctx);
                Ok(ctx)
            }
            Err(e) => {
                warn!(uri = %parts.uri, error = %e, "Tenant resolution failed");
                Err(ApiError::Unauthorized(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret", "KasserPro", 3600)
    }

    #[test]
    fn test_token_roundtrip_resolves_tenant() {
        let jwt = manager();
        let token = jwt.issue(7, Some(3), Role::Cashier).unwrap();

        let header = format!("Bearer {token}");
        let ctx = jwt.resolve(Some(&header)).unwrap();
        assert_eq!(ctx, TenantContext::new(3, 7, Role::Cashier));
    }

    #[test]
    fn test_token_without_store_is_tenant_missing() {
        let jwt = manager();
        let token = jwt.issue(1, None, Role::SuperAdmin).unwrap();

        let header = format!("Bearer {token}");
        assert_eq!(jwt.resolve(Some(&header)), Err(TenantError::TenantMissing));
    }

    #[test]
    fn test_bad_credentials_are_unauthenticated() {
        let jwt = manager();
        assert!(matches!(jwt.resolve(None), Err(TenantError::Unauthenticated(_))));
        assert!(matches!(
            jwt.resolve(Some("Basic dXNlcjpwYXNz")),
            Err(TenantError::Unauthenticated(_))
        ));
        assert!(matches!(
            jwt.resolve(Some("Bearer not.a.jwt")),
            Err(TenantError::Unauthenticated(_))
        ));

        // Signed with another secret
        let foreign = JwtManager::new("other-secret", "KasserPro", 3600)
            .issue(1, Some(1), Role::Owner)
            .unwrap();
        let header = format!("Bearer {foreign}");
        assert!(matches!(jwt.resolve(Some(&header)), Err(TenantError::Unauthenticated(_))));

        // Wrong issuer
        let foreign = JwtManager::new("test-secret", "SomeoneElse", 3600)
            .issue(1, Some(1), Role::Owner)
            .unwrap();
        let header = format!("Bearer {foreign}");
        assert!(matches!(jwt.resolve(Some(&header)), Err(TenantError::Unauthenticated(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60 s leeway
        let jwt = JwtManager::new("test-secret", "KasserPro", -3600);
        let token = jwt.issue(1, Some(1), Role::Owner).unwrap();

        let header = format!("Bearer {token}");
        assert!(matches!(jwt.resolve(Some(&header)), Err(TenantError::Unauthenticated(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("bearer abc"), None);
    }
}
