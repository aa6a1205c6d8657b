// User domain types
//
// These types represent portal users, their role, and the identity that
// callers present to services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{PortalError, Result};

/// Role of a portal user.
/// - `user`: regular employee, can join events and request rewards
/// - `admin`: can manage events and rewards and settle approvals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular employee.
    #[default]
    User,
    /// Portal administrator.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// User - an employee taking part in the stamp rally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Unique employee code used to log in.
    #[cfg_attr(feature = "openapi", schema(example = "1024"))]
    pub employee_code: String,
    /// Role of the user.
    pub role: UserRole,
    /// Current stamp balance. Cached sum of the user's stamp history.
    pub stamps: i32,
    /// Timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

/// Identity attached to a request: who is acting and with which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with `PermissionDenied` unless the actor is an admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, "admin operation denied");
            Err(PortalError::PermissionDenied)
        }
    }
}
