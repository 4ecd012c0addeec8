/// Task endpoints
///
/// Ownership-checked CRUD plus the trash flow. Every mutation loads the
/// document first: an absent id is 404, a caller that isn't the owner gets
/// 403 and the document is left unchanged.
///
/// # Endpoints
///
/// - `GET    /api/v1/tasks` - List (filters: status, folder_id, deleted, search)
/// - `POST   /api/v1/tasks` - Create (title required) → 201
/// - `GET    /api/v1/tasks/trash` - List trashed tasks
/// - `GET    /api/v1/tasks/:id` - Fetch one
/// - `PATCH  /api/v1/tasks/:id` - Partial update (null due_date clears)
/// - `DELETE /api/v1/tasks/:id` - Soft delete (move to trash)
/// - `POST   /api/v1/tasks/:id/restore` - Clear the delete marker
/// - `DELETE /api/v1/tasks/:id/permanent` - Irreversible delete
/// - `POST   /api/v1/tasks/:id/duplicate` - Copy with "(Copy)" title → 201

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
    models::task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// `title` is optional at the deserialization layer so a missing field maps
/// to the same 400 validation error as an empty one.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title (required, enforced in the handler)
    #[validate(length(max = 200, message = "Title must be 1-200 characters"))]
    #[serde(default)]
    pub title: Option<String>,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Initial status (default: todo)
    #[serde(default)]
    pub status: Option<TaskStatus>,

    /// Priority (default: medium)
    #[serde(default)]
    pub priority: Option<TaskPriority>,

    /// Optional due date
    #[serde(default)]
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,

    /// Optional folder
    #[serde(default)]
    pub folder_id: Option<Uuid>,

    /// Optional team
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    /// Matching tasks
    pub tasks: Vec<Task>,

    /// Total count
    pub total: usize,
}

/// Loads a task and checks the caller owns it
///
/// 404 when the id doesn't exist, 403 when it belongs to someone else.
async fn load_owned_task(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this task".to_string(),
        ));
    }

    Ok(task)
}

/// Lists the caller's tasks with optional filters
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = Task::list(&state.db, auth.user_id, &filter).await?;
    let total = tasks.len();

    Ok(Json(TaskListResponse { tasks, total }))
}

/// Lists the caller's trashed tasks
pub async fn list_trashed_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter {
        deleted: Some(true),
        ..Default::default()
    };
    let tasks = Task::list(&state.db, auth.user_id, &filter).await?;
    let total = tasks.len();

    Ok(Json(TaskListResponse { tasks, total }))
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty title
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(ApiError::from)?;

    let title = match req.title {
        Some(title) if !title.is_empty() => title,
        _ => {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "title".to_string(),
                    message: "Title is required".to_string(),
                },
            ]))
        }
    };

    let data = CreateTask {
        title,
        description: req.description,
        status: req.status.unwrap_or(TaskStatus::Todo),
        priority: req.priority.unwrap_or(TaskPriority::Medium),
        due_date: req.due_date,
        folder_id: req.folder_id,
        team_id: req.team_id,
    };

    let task = Task::create(&state.db, auth.user_id, data).await?;

    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = load_owned_task(&state, &auth, id).await?;

    Ok(Json(task))
}

/// Applies a partial update to an owned task
///
/// Absent fields are untouched; explicit `null` clears due_date, folder_id,
/// team_id, or description.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
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

    load_owned_task(&state, &auth, id).await?;

    let task = Task::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Soft-deletes an owned task (moves it to the trash)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    load_owned_task(&state, &auth, id).await?;

    let task = Task::soft_delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Restores a trashed task
///
/// A permanently deleted id is gone: this returns 404.
pub async fn restore_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    load_owned_task(&state, &auth, id).await?;

    let task = Task::restore(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Permanently deletes a task
///
/// This cannot be undone; a later restore attempt returns 404.
pub async fn permanently_delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_owned_task(&state, &auth, id).await?;

    Task::delete_permanent(&state.db, id).await?;

    tracing::info!(task_id = %id, user_id = %auth.user_id, "Task permanently deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Duplicates a task
///
/// The copy keeps all properties, gets a "(Copy)" title suffix, and starts
/// outside the trash.
pub async fn duplicate_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let original = load_owned_task(&state, &auth, id).await?;

    let copy = Task::create(
        &state.db,
        auth.user_id,
        CreateTask {
            title: format!("{} (Copy)", original.title),
            description: original.description,
            status: original.status,
            priority: original.priority,
            due_date: original.due_date,
            folder_id: original.folder_id,
            team_id: original.team_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(copy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_request_validation() {
        let valid: CreateTaskRequest = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert!(valid.validate().is_ok());

        // Missing title deserializes; the handler rejects it
        let missing: CreateTaskRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(missing.title.is_none());

        let long = format!(r#"{{"title": "{}"}}"#, "a".repeat(201));
        let long: CreateTaskRequest = serde_json::from_str(&long).unwrap();
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_create_task_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(req.status.unwrap_or(TaskStatus::Todo), TaskStatus::Todo);
        assert_eq!(
            req.priority.unwrap_or(TaskPriority::Medium),
            TaskPriority::Medium
        );
        assert!(req.due_date.is_none());
    }
}
