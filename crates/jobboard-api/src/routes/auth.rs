//! Login, registration and own-profile routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use jobboard_auth::{AuthError, hash_password, verify_password};
use jobboard_db::{NewUser, Role, User};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// ==================== Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Defaults to JOB_SEEKER; ADMIN cannot be self-registered
    pub role: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            phone: user.phone,
            company_name: user.company_name,
            resume: user.resume,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Handlers ====================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!("Registration attempt for: {}", request.email);

    let role = match request.role.as_deref() {
        None => Role::JobSeeker,
        Some(role_str) => Role::from_str(role_str)
            .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role_str)))?,
    };

    if role.is_admin() {
        return Err(ApiError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
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

    info!("Registered user: {}", user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    debug!("Login attempt for: {}", request.email);

    let user = state
        .db
        .get_user_by_email(&request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    // The issued token carries the role so later requests can skip the
    // role lookup entirely
    let token = state
        .jwt
        .generate_token(user.id, &user.email, user.role.as_str())?;

    info!("User {} logged in successfully", user.email);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.expires_in_secs(),
    }))
}

/// GET /api/auth/me
async fn me(
    State(state): State<AppState>,
    identity: Option<Extension<jobboard_auth::AuthUser>>,
) -> Result<Json<UserResponse>, ApiError> {
    let Extension(identity) = identity.ok_or(AuthError::AuthenticationRequired)?;
    let id = identity.id.ok_or(AuthError::AuthenticationRequired)?;

    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}

// ==================== Routes ====================

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
