//! # Tenant Context
//!
//! Who is acting, and on behalf of which store.
//!
//! A [`TenantContext`] is produced once per request from the bearer token
//! (see `kasser-api::auth`) and handed to every store-scoped operation. The
//! store id inside it is the ONLY source of tenant scoping; request bodies
//! never carry one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// Staff role. Closed set; capabilities are methods, not string compares.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    Owner,
    Manager,
    Cashier,
    SuperAdmin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Manager => "Manager",
            Role::Cashier => "Cashier",
            Role::SuperAdmin => "SuperAdmin",
        }
    }

    /// Owners, managers and platform admins may change store settings.
    pub const fn can_manage_settings(&self) -> bool {
        matches!(self, Role::Owner | Role::Manager | Role::SuperAdmin)
    }

    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Owner" => Ok(Role::Owner),
            "Manager" => Ok(Role::Manager),
            "Cashier" => Ok(Role::Cashier),
            "SuperAdmin" => Ok(Role::SuperAdmin),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Tenant Context
// =============================================================================

/// The resolved identity of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub store_id: i64,
    pub user_id: i64,
    pub role: Role,
}

impl TenantContext {
    pub const fn new(store_id: i64, user_id: i64, role: Role) -> Self {
        TenantContext {
            store_id,
            user_id,
            role,
        }
    }

    /// Fails with `Forbidden` unless the role may manage settings.
    pub fn require_settings_manager(&self) -> CoreResult<()> {
        if self.role.can_manage_settings() {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                action: "manage store settings".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_capability() {
        assert!(Role::Owner.can_manage_settings());
        assert!(Role::Manager.can_manage_settings());
        assert!(Role::SuperAdmin.can_manage_settings());
        assert!(!Role::Cashier.can_manage_settings());
    }

    #[test]
    fn test_super_admin() {
        assert!(Role::SuperAdmin.is_super_admin());
        assert!(!Role::Owner.is_super_admin());
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Owner, Role::Manager, Role::Cashier, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_cashier_cannot_manage_settings() {
        let ctx = TenantContext::new(1, 3, Role::Cashier);
        let err = ctx.require_settings_manager().unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        let ctx = TenantContext::new(1, 1, Role::Owner);
        assert!(ctx.require_settings_manager().is_ok());
    }
}
