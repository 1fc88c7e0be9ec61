//! Admin user management routes

use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use jobboard_auth::{AuthUser, allow_roles, can_manage_role, hash_password, role_gate};
use jobboard_db::{NewUser, Role};
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

use super::auth::UserResponse;
use crate::error::ApiError;
use crate::state::AppState;

// ==================== Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Update user request
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

// ==================== Helpers ====================

fn actor_role(actor: &AuthUser) -> Result<Role, ApiError> {
    // The role gate has already resolved and cached the role
    actor
        .role
        .clone()
        .ok_or_else(|| ApiError::Internal("Caller role not resolved".to_string()))
}

fn parse_role(role_str: &str) -> Result<Role, ApiError> {
    Role::from_str(role_str)
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role_str)))
}

// ==================== Handlers ====================

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!("Creating user: {}", request.email);

    let role = parse_role(&request.role)?;
    let actor_role = actor_role(&actor)?;

    if !can_manage_role(actor_role.as_str(), role.as_str()) {
        return Err(ApiError::Forbidden(format!(
            "Cannot create a user with role {}",
            role
        )));
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            email: request.email,
            password_hash,
            name: request.name,
            role,
        })
        .await?;

    info!("Created user: {}", user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(user.into()))
}

/// PUT /api/users/{id}
async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!("Updating user: {}", id);

    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    let actor_role = actor_role(&actor)?;
    if !can_manage_role(actor_role.as_str(), user.role.as_str()) {
        return Err(ApiError::Forbidden(format!(
            "Cannot manage a user with role {}",
            user.role
        )));
    }

    // Update role if provided
    if let Some(role_str) = &request.role {
        let role = parse_role(role_str)?;
        if !can_manage_role(actor_role.as_str(), role.as_str()) {
            return Err(ApiError::Forbidden(format!(
                "Cannot assign role {}",
                role
            )));
        }
        state.db.update_user_role(id, role).await?;
    }

    // Update password if provided
    if let Some(password) = &request.password {
        let password_hash = hash_password(password)?;
        state.db.update_user_password(id, &password_hash).await?;
    }

    // Update active flag if provided
    if let Some(is_active) = request.is_active {
        state.db.update_user_active(id, is_active).await?;
    }

    // Fetch updated user
    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated user: {}", user.email);

    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    debug!("Deleting user: {}", id);

    let deleted = state.db.delete_user(id).await?;

    if deleted {
        info!("Deleted user: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("User: {}", id)))
    }
}

// ==================== Routes ====================

/// Create admin user-management routes
///
/// The whole group sits behind an allow-list gate for ADMIN: membership is
/// exact, so a future role added above EMPLOYER would not silently gain
/// access here.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}", put(update_user))
        .route("/api/users/{id}", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            (state.db.clone(), allow_roles([Role::Admin])),
            role_gate,
        ))
}
