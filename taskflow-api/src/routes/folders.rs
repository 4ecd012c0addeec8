/// Folder endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/folders` - List the caller's folders
/// - `POST   /api/v1/folders` - Create (name required) → 201
/// - `PATCH  /api/v1/folders/:id` - Partial update
/// - `DELETE /api/v1/folders/:id` - Delete (tasks/notes are unfiled, not deleted)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::folder::{CreateFolder, Folder, UpdateFolder},
};
use uuid::Uuid;
use validator::Validate;

/// Create folder request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Display color
    #[serde(default)]
    pub color: Option<String>,

    /// Privacy flag
    #[serde(default)]
    pub is_private: bool,
}

/// Folder list response
#[derive(Debug, Serialize)]
pub struct FolderListResponse {
    /// The caller's folders
    pub folders: Vec<Folder>,

    /// Total count
    pub total: usize,
}

/// Loads a folder and checks the caller owns it
async fn load_owned_folder(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Folder> {
    let folder = Folder::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Folder not found".to_string()))?;

    if folder.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this folder".to_string(),
        ));
    }

    Ok(folder)
}

/// Lists the caller's folders
pub async fn list_folders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<FolderListResponse>> {
    let folders = Folder::list(&state.db, auth.user_id).await?;
    let total = folders.len();

    Ok(Json(FolderListResponse { folders, total }))
}

/// Creates a folder owned by the caller
pub async fn create_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<Folder>)> {
    req.validate().map_err(ApiError::from)?;

    let folder = Folder::create(
        &state.db,
        auth.user_id,
        CreateFolder {
            name: req.name,
            color: req.color,
            is_private: req.is_private,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(folder)))
}

/// Applies a partial update to an owned folder
pub async fn update_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFolder>,
) -> ApiResult<Json<Folder>> {
    if let Some(ref name) = req.name {
        if name.is_empty() || name.len() > 100 {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "name".to_string(),
                    message: "Name must be 1-100 characters".to_string(),
                },
            ]));
        }
    }

    load_owned_folder(&state, &auth, id).await?;

    let folder = Folder::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Folder not found".to_string()))?;

    Ok(Json(folder))
}

/// Deletes an owned folder
///
/// Tasks and notes filed under it keep existing with `folder_id` cleared.
pub async fn delete_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_owned_folder(&state, &auth, id).await?;

    Folder::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_folder_request_validation() {
        let valid: CreateFolderRequest = serde_json::from_str(r#"{"name": "Work"}"#).unwrap();
        assert!(valid.validate().is_ok());
        assert!(!valid.is_private);

        let empty: CreateFolderRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
