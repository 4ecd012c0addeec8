/// Profile endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/users/me` - Current user's profile
/// - `PATCH /api/v1/users/me` - Update name/bio/avatar (explicit null clears)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateUser, User},
};

/// Returns the authenticated user's profile
///
/// The password hash is never serialized.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates the authenticated user's profile
///
/// Absent fields are untouched; explicit null clears name/bio/avatar.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateUser>,
) -> ApiResult<Json<User>> {
    let user = User::update_profile(&state.db, auth.user_id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
