/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register new user
/// - `POST /api/v1/auth/login` - Login and get tokens
/// - `POST /api/v1/auth/refresh` - Rotate the token pair
/// - `POST /api/v1/auth/logout` - Revoke the refresh session
///
/// Every login or register opens a refresh session; refresh rotates it
/// (revokes the old session row and opens a new one), so a refresh token can
/// be redeemed at most once.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{jwt, password},
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh/logout request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token issued at login or the previous refresh
    pub refresh_token: String,
}

/// Token response shared by register, login and refresh
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: String,

    /// Access token (15 minutes)
    pub access_token: String,

    /// Refresh token (30 days, single-use)
    pub refresh_token: String,
}

/// Simple acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

/// Opens a session and mints its token pair
async fn open_session(state: &AppState, user_id: Uuid) -> ApiResult<jwt::TokenPair> {
    let session_id = Uuid::new_v4();
    let pair = jwt::issue_token_pair(user_id, session_id, state.jwt_secret())?;

    Session::open(
        &state.db,
        session_id,
        user_id,
        &pair.refresh_token,
        Duration::days(30),
    )
    .await?;

    Ok(pair)
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(ApiError::from)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let pair = open_session(&state, user.id).await?;

    Ok(Json(TokenResponse {
        user_id: user.id.to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Login endpoint
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(ApiError::from)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let pair = open_session(&state, user.id).await?;

    Ok(Json(TokenResponse {
        user_id: user.id.to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a rotated pair. The presented token's
/// session is revoked and a new one opened, so replaying an old refresh
/// token fails with 401.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, revoked, or already-rotated token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let session = Session::find_by_id(&state.db, claims.sid)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown session".to_string()))?;

    if !session.accepts(&req.refresh_token) {
        return Err(ApiError::Unauthorized(
            "Refresh token revoked or expired".to_string(),
        ));
    }

    // Rotate: old session dies, new one opens
    Session::revoke(&state.db, session.id).await?;
    let pair = open_session(&state, claims.sub).await?;

    tracing::debug!(user_id = %claims.sub, "Refresh token rotated");

    Ok(Json(TokenResponse {
        user_id: claims.sub.to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Logout endpoint
///
/// Revokes the refresh session. Idempotent: logging out an already-revoked
/// session still returns 200.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    Session::revoke(&state.db, claims.sid).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "goodpass1".to_string(),
            name: Some("Ada".to_string()),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "goodpass1".to_string(),
            name: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
            name: None,
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "user@example.com".to_string(),
            password: "whatever".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = LoginRequest {
            email: "nope".to_string(),
            password: "whatever".to_string(),
        };
        assert!(invalid.validate().is_err());
    }
}
