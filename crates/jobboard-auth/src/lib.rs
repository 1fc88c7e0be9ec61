//! Jobboard Authentication and Authorization
//!
//! This crate provides JWT-based authentication and role-based
//! access control for the job board.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rbac;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{
    AuthUser, RoleGate, RoleStore, allow_roles, auth_middleware, require_minimum_role, resolve_role,
    role_gate,
};
pub use password::{hash_password, verify_password};
pub use rbac::{can_manage_role, has_minimum_role, role_level};
