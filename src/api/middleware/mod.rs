//! API middleware.

mod auth;

pub use auth::{
    auth_middleware, require_admin, require_role, CurrentUser, APPROVER_ROLES, HR_ROLES,
};
