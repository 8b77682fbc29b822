//! Kasser API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use kasser_db::checkout::DEFAULT_MAX_ATTEMPTS;
use kasser_db::{CheckoutConfig, PricingPolicy};

/// Kasser API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Upper bound of the connection pool
    pub db_max_connections: u32,

    /// JWT secret key for signing and validating tokens
    pub jwt_secret: String,

    /// Expected `iss` claim
    pub jwt_issuer: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Checkout attempts before an order number conflict is reported
    pub order_max_attempts: u32,

    /// `client` (price sent with the cart) or `catalog` (live product price)
    pub pricing: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: parse_var("HTTP_PORT", "8080")?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./kasser.db".to_string())
                .into(),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // In production, this MUST be set via environment variable
                "kasser-dev-secret-change-in-production".to_string()
            }),

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "KasserPro".to_string()),

            jwt_access_lifetime_secs: parse_var("JWT_ACCESS_LIFETIME_SECS", "3600")?, // 1 hour

            order_max_attempts: parse_var("ORDER_MAX_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())?,

            pricing: env::var("KASSER_PRICING").unwrap_or_else(|_| "client".to_string()),
        };

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.order_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("ORDER_MAX_ATTEMPTS".to_string()));
        }
        config.checkout()?;

        Ok(config)
    }

    /// Checkout settings derived from this configuration.
    pub fn checkout(&self) -> Result<CheckoutConfig, ConfigError> {
        let pricing = PricingPolicy::from_str(&self.pricing)
            .map_err(|_| ConfigError::InvalidValue("KASSER_PRICING".to_string()))?;

        Ok(CheckoutConfig {
            max_attempts: self.order_max_attempts,
            pricing,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiConfig {
        ApiConfig {
            http_port: 8080,
            database_path: "./kasser.db".into(),
            db_max_connections: 5,
            jwt_secret: "secret".to_string(),
            jwt_issuer: "KasserPro".to_string(),
            jwt_access_lifetime_secs: 3600,
            order_max_attempts: 3,
            pricing: "client".to_string(),
        }
    }

    #[test]
    fn test_checkout_config_from_pricing() {
        let mut config = sample();
        assert_eq!(config.checkout().unwrap().pricing, PricingPolicy::ClientSnapshot);

        config.pricing = "catalog".to_string();
        let checkout = config.checkout().unwrap();
        assert_eq!(checkout.pricing, PricingPolicy::CatalogPrice);
        assert_eq!(checkout.max_attempts, 3);

        config.pricing = "whatever".to_string();
        assert!(matches!(
            config.checkout(),
            Err(ConfigError::InvalidValue(name)) if name == "KASSER_PRICING"
        ));
    }

    #[test]
    fn test_parse_var_default_and_error() {
        let port: u16 = parse_var("KASSER_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let bad: Result<u16, _> = parse_var("KASSER_TEST_UNSET_PORT", "not-a-port");
        assert!(matches!(bad, Err(ConfigError::InvalidValue(_))));
    }
}
