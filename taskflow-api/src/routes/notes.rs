/// Note endpoints
///
/// Same ownership-checked shape as tasks, plus per-note collaborators: the
/// owner can share a note by email with a viewer or editor role. Editors can
/// read and update the note; viewers can only read it. Trash, restore,
/// permanent delete, and sharing stay owner-only.
///
/// # Endpoints
///
/// - `GET    /api/v1/notes` - List (filters: folder_id, tag, pinned, favorite, deleted, search)
/// - `POST   /api/v1/notes` - Create (title required) → 201
/// - `GET    /api/v1/notes/trash` - List trashed notes
/// - `GET    /api/v1/notes/:id` - Fetch one (owner or collaborator)
/// - `PATCH  /api/v1/notes/:id` - Partial update (owner or editor)
/// - `DELETE /api/v1/notes/:id` - Soft delete
/// - `POST   /api/v1/notes/:id/restore` - Clear the delete marker
/// - `DELETE /api/v1/notes/:id/permanent` - Irreversible delete
/// - `GET    /api/v1/notes/:id/collaborators` - List collaborators
/// - `POST   /api/v1/notes/:id/collaborators` - Invite a user by email
/// - `DELETE /api/v1/notes/:id/collaborators/:user_id` - Revoke access

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::{
        note::{CollaboratorRole, CreateNote, Note, NoteCollaborator, NoteFilter, UpdateNote},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create note request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    /// Note title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Initial content
    #[serde(default)]
    pub content: String,

    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Pin immediately
    #[serde(default)]
    pub is_pinned: bool,

    /// Favorite immediately
    #[serde(default)]
    pub is_favorite: bool,

    /// Optional folder
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteCollaboratorRequest {
    /// Email of the user to invite (must already have an account)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role to grant (default: editor)
    #[serde(default = "default_invite_role")]
    pub role: CollaboratorRole,
}

fn default_invite_role() -> CollaboratorRole {
    CollaboratorRole::Editor
}

/// Note list response
#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    /// Matching notes
    pub notes: Vec<Note>,

    /// Total count
    pub total: usize,
}

/// Collaborator list response
#[derive(Debug, Serialize)]
pub struct CollaboratorListResponse {
    /// Collaborators with identity and role
    pub collaborators: Vec<NoteCollaborator>,

    /// Total count
    pub total: usize,
}

/// How much access a caller needs to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Owner or any collaborator
    Read,

    /// Owner or editor collaborator
    Write,

    /// Owner only (trash, permanent delete, sharing)
    Owner,
}

/// Loads a note and checks the caller's access level
///
/// 404 when the id doesn't exist, 403 when the caller lacks the required
/// level.
async fn load_note_with_access(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
    access: Access,
) -> ApiResult<Note> {
    let note = Note::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.user_id == auth.user_id {
        return Ok(note);
    }

    let role = Note::collaborator_role(&state.db, id, auth.user_id).await?;
    let allowed = match access {
        Access::Read => role.is_some(),
        Access::Write => role.map(|r| r.can_edit()).unwrap_or(false),
        Access::Owner => false,
    };

    if !allowed {
        return Err(ApiError::Forbidden(
            "You do not have access to this note".to_string(),
        ));
    }

    Ok(note)
}

/// Lists the caller's notes with optional filters
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<NoteFilter>,
) -> ApiResult<Json<NoteListResponse>> {
    let notes = Note::list(&state.db, auth.user_id, &filter).await?;
    let total = notes.len();

    Ok(Json(NoteListResponse { notes, total }))
}

/// Lists the caller's trashed notes
pub async fn list_trashed_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<NoteListResponse>> {
    let filter = NoteFilter {
        deleted: Some(true),
        ..Default::default()
    };
    let notes = Note::list(&state.db, auth.user_id, &filter).await?;
    let total = notes.len();

    Ok(Json(NoteListResponse { notes, total }))
}

/// Creates a note owned by the caller
pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    req.validate().map_err(ApiError::from)?;

    let note = Note::create(
        &state.db,
        auth.user_id,
        CreateNote {
            title: req.title,
            content: req.content,
            tags: req.tags,
            is_pinned: req.is_pinned,
            is_favorite: req.is_favorite,
            folder_id: req.folder_id,
        },
    )
    .await?;

    tracing::info!(note_id = %note.id, user_id = %auth.user_id, "Note created");

    Ok((StatusCode::CREATED, Json(note)))
}

/// Fetches a single note (owner or collaborator)
pub async fn get_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    let note = load_note_with_access(&state, &auth, id, Access::Read).await?;

    Ok(Json(note))
}

/// Applies a partial update (owner or editor)
pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNote>,
) -> ApiResult<Json<Note>> {
    if let Some(ref title) = req.title {
        if title.is_empty() || title.len() > 200 {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "title".to_string(),
                    message: "Title must be 1-200 characters".to_string(),
                },
            ]));
        }
    }

    load_note_with_access(&state, &auth, id, Access::Write).await?;

    let note = Note::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

/// Soft-deletes a note (owner only)
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    load_note_with_access(&state, &auth, id, Access::Owner).await?;

    let note = Note::soft_delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

/// Restores a trashed note (owner only)
pub async fn restore_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    load_note_with_access(&state, &auth, id, Access::Owner).await?;

    let note = Note::restore(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

/// Permanently deletes a note (owner only)
pub async fn permanently_delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_note_with_access(&state, &auth, id, Access::Owner).await?;

    Note::delete_permanent(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Invites a user by email to collaborate on the note (owner only)
///
/// # Errors
///
/// - `404 Not Found`: no account with that email
/// - `400 Bad Request`: attempting to invite the owner
pub async fn invite_collaborator(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteCollaboratorRequest>,
) -> ApiResult<Json<CollaboratorListResponse>> {
    req.validate().map_err(ApiError::from)?;

    let note = load_note_with_access(&state, &auth, id, Access::Owner).await?;

    let invitee = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user with that email".to_string()))?;

    if invitee.id == note.user_id {
        return Err(ApiError::BadRequest(
            "The owner already has access".to_string(),
        ));
    }

    Note::add_collaborator(&state.db, id, invitee.id, req.role).await?;

    let collaborators = Note::list_collaborators(&state.db, id).await?;
    let total = collaborators.len();

    Ok(Json(CollaboratorListResponse {
        collaborators,
        total,
    }))
}

/// Lists collaborators (owner or collaborator)
pub async fn list_collaborators(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CollaboratorListResponse>> {
    load_note_with_access(&state, &auth, id, Access::Read).await?;

    let collaborators = Note::list_collaborators(&state.db, id).await?;
    let total = collaborators.len();

    Ok(Json(CollaboratorListResponse {
        collaborators,
        total,
    }))
}

/// Revokes a collaborator's access (owner only)
pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    load_note_with_access(&state, &auth, id, Access::Owner).await?;

    let removed = Note::remove_collaborator(&state.db, id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Collaborator not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_note_request_validation() {
        let valid: CreateNoteRequest =
            serde_json::from_str(r#"{"title": "Meeting Notes"}"#).unwrap();
        assert!(valid.validate().is_ok());

        let empty: CreateNoteRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_invite_defaults_to_editor() {
        let req: InviteCollaboratorRequest =
            serde_json::from_str(r#"{"email": "friend@example.com"}"#).unwrap();
        assert_eq!(req.role, CollaboratorRole::Editor);
    }
}
