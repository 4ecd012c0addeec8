/// Task model and database operations
///
/// Tasks are the core entity of TaskFlow: they carry a Kanban status, a
/// priority, an optional due date, and optional folder/team references.
/// Deleting a task is a soft delete (sets `deleted_at`), which feeds the
/// trash/restore flow; a separate permanent delete removes the row.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'doing', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(2000),
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     folder_id UUID REFERENCES folders(id) ON DELETE SET NULL,
///     team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::task::{Task, CreateTask, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, user_id, CreateTask {
///     title: "Buy milk".to_string(),
///     ..Default::default()
/// }).await?;
/// assert_eq!(task.status, TaskStatus::Todo);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kanban column a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// In progress
    Doing,

    /// Awaiting review
    Review,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// All statuses in board column order
    pub fn all() -> [TaskStatus; 4] {
        [
            TaskStatus::Todo,
            TaskStatus::Doing,
            TaskStatus::Review,
            TaskStatus::Done,
        ]
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Kanban status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Folder the task is filed under
    pub folder_id: Option<Uuid>,

    /// Team context the task is shared with
    pub team_id: Option<Uuid>,

    /// Soft-delete marker; set means the task is in the trash
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is in the trash
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title (required)
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Initial status (default: todo)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Priority (default: medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Optional due date
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// Optional folder
    #[serde(default)]
    pub folder_id: Option<Uuid>,

    /// Optional team
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

impl Default for CreateTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            status: default_status(),
            priority: default_priority(),
            due_date: None,
            folder_id: None,
            team_id: None,
        }
    }
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for partially updating a task
///
/// Absent fields are left untouched. The double-`Option` fields distinguish
/// "leave untouched" (outer `None`) from "clear to NULL" (`Some(None)`), so
/// an explicit `"due_date": null` in the request body clears the due date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    /// New title
    #[serde(default)]
    pub title: Option<String>,

    /// New description (null clears)
    #[serde(default)]
    pub description: Option<Option<String>>,

    /// New status
    #[serde(default)]
    pub status: Option<TaskStatus>,

    /// New priority
    #[serde(default)]
    pub priority: Option<TaskPriority>,

    /// New due date (null clears)
    #[serde(default)]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New folder (null unfiles)
    #[serde(default)]
    pub folder_id: Option<Option<Uuid>>,

    /// New team (null unshares)
    #[serde(default)]
    pub team_id: Option<Option<Uuid>>,
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in this status
    pub status: Option<TaskStatus>,

    /// Only tasks in this folder
    pub folder_id: Option<Uuid>,

    /// Include trashed instead of live tasks (default: live only)
    pub deleted: Option<bool>,

    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

impl Task {
    /// Creates a new task owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails (e.g., a dangling
    /// folder/team reference violates a foreign key).
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date, folder_id, team_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, status, priority, due_date,
                      folder_id, team_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.folder_id)
        .bind(data.team_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// Ownership is checked by the caller; this deliberately does not filter
    /// by user so handlers can distinguish 404 from 403.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, status, priority, due_date,
                   folder_id, team_id, deleted_at, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks with optional filters
    ///
    /// Live (non-trashed) tasks by default; `filter.deleted = Some(true)`
    /// lists the trash instead. Results are newest-first.
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, title, description, status, priority, due_date, \
             folder_id, team_id, deleted_at, created_at, updated_at \
             FROM tasks WHERE user_id = $1",
        );

        if filter.deleted.unwrap_or(false) {
            query.push_str(" AND deleted_at IS NOT NULL");
        } else {
            query.push_str(" AND deleted_at IS NULL");
        }

        let mut bind_count = 1;
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.folder_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND folder_id = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                bind_count
            ));
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(folder_id) = filter.folder_id {
            q = q.bind(folder_id);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Applies a partial update
    ///
    /// Only fields present in `data` are written; double-`Option` fields set
    /// to `Some(None)` clear their column.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.folder_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", folder_id = ${}", bind_count));
        }
        if data.team_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", team_id = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, user_id, title, description, status, priority, \
             due_date, folder_id, team_id, deleted_at, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(folder_id) = data.folder_id {
            q = q.bind(folder_id);
        }
        if let Some(team_id) = data.team_id {
            q = q.bind(team_id);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Soft-deletes a task (moves it to the trash)
    ///
    /// Idempotent: trashing an already-trashed task keeps the original
    /// `deleted_at`.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET deleted_at = COALESCE(deleted_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, status, priority, due_date,
                      folder_id, team_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Restores a trashed task
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET deleted_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, status, priority, due_date,
                      folder_id, team_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Permanently deletes a task
    ///
    /// Returns true if a row was removed. This cannot be undone.
    pub async fn delete_permanent(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::Doing.as_str(), "doing");
        assert_eq!(TaskStatus::Review.as_str(), "review");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_create_task_defaults() {
        let create: CreateTask = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(create.title, "Buy milk");
        assert_eq!(create.status, TaskStatus::Todo);
        assert_eq!(create.priority, TaskPriority::Medium);
        assert!(create.due_date.is_none());
    }

    #[test]
    fn test_update_task_distinguishes_absent_from_null() {
        // Absent → untouched
        let update: UpdateTask = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert!(update.due_date.is_none());

        // Explicit null → clear
        let update: UpdateTask = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(update.due_date, Some(None));

        // Value → set
        let update: UpdateTask =
            serde_json::from_str(r#"{"due_date": "2025-06-01T12:00:00Z"}"#).unwrap();
        assert!(matches!(update.due_date, Some(Some(_))));
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), r#""done""#);
        let status: TaskStatus = serde_json::from_str(r#""review""#).unwrap();
        assert_eq!(status, TaskStatus::Review);
    }

    #[test]
    fn test_all_statuses_in_board_order() {
        let all = TaskStatus::all();
        assert_eq!(all[0], TaskStatus::Todo);
        assert_eq!(all[3], TaskStatus::Done);
    }
}
