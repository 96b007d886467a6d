//! User account entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_EMPLOYEE, ROLE_HR, ROLE_MANAGER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    #[serde(rename = "HR")]
    Hr,
    Manager,
    Employee,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Roles that may act on other employees' leave and timesheets
    pub fn is_approver(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Hr | UserRole::Manager)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Hr => ROLE_HR,
            UserRole::Manager => ROLE_MANAGER,
            UserRole::Employee => ROLE_EMPLOYEE,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_HR => UserRole::Hr,
            ROLE_MANAGER => UserRole::Manager,
            _ => UserRole::Employee,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Employee code this account belongs to, e.g. `EMP001`
    pub employee_code: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Fields needed to create an account; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub employee_code: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "jane_doe")]
    pub username: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Employee")]
    pub role: UserRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            employee_id: user.employee_code,
            username: user.username,
            email: user.email,
            role: user.role,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Who is making a request, as far as business rules care.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: Uuid,
    pub employee_code: String,
    pub role: UserRole,
}

impl Actor {
    pub fn can_approve(&self) -> bool {
        self.role.is_approver()
    }
}
