//! Authentication API Endpoints
//! Mission: Provide login and password rotation endpoints

use crate::auth::{
    jwt::JwtHandler,
    models::{ChangePasswordRequest, Claims, LoginRequest, LoginResponse, UserResponse},
    user_store::UserStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("Login attempt: {}", payload.username);

    // Unknown user, inactive user, and wrong password all fail identically.
    let valid = state
        .user_store
        .verify_password(&payload.username, &payload.password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("Failed login attempt: {}", payload.username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_username(&payload.username)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let (token, expires_in) = state
        .jwt_handler
        .generate_token(&user)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("Login successful: {}", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Rotate the authenticated user's password - POST /change-password
pub async fn change_password(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AuthApiError> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthApiError::Unauthorized)?;

    if payload.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthApiError::WeakPassword);
    }

    let valid = state
        .user_store
        .verify_password_for_id(&user_id, &payload.current_password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("Password change with wrong current password: {}", claims.username);
        return Err(AuthApiError::InvalidCredentials);
    }

    state
        .user_store
        .update_password(&user_id, &payload.new_password)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("Password changed for user {}", claims.username);

    // Tokens issued under the old password stay valid until natural expiry.
    Ok(Json(json!({ "message": "Password updated" })))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Unauthorized,
    WeakPassword,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 6 characters",
            ),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
