/// Task endpoints
///
/// Wrapper methods mirror the REST surface; request/response types are the
/// shared model DTOs.

use crate::client::ApiClient;
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_shared::models::task::{CreateTask, Task, TaskStatus};
use uuid::Uuid;

/// Task API wrapper
pub struct TasksApi<'a> {
    client: &'a ApiClient,
}

/// Task list response
#[derive(Debug, Deserialize)]
pub struct TaskList {
    /// Matching tasks
    pub tasks: Vec<Task>,

    /// Total count
    pub total: usize,
}

/// List filters, rendered into the query string
#[derive(Debug, Clone, Default)]
pub struct TaskListFilter {
    /// Only tasks in this status
    pub status: Option<TaskStatus>,

    /// Only tasks in this folder
    pub folder_id: Option<Uuid>,

    /// List the trash instead of live tasks
    pub deleted: Option<bool>,

    /// Substring search over title/description
    pub search: Option<String>,
}

impl TaskListFilter {
    /// Renders the filter as query parameters
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(folder_id) = self.folder_id {
            query.push(("folder_id".to_string(), folder_id.to_string()));
        }
        if let Some(deleted) = self.deleted {
            query.push(("deleted".to_string(), deleted.to_string()));
        }
        if let Some(ref search) = self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query
    }

    /// Stable fingerprint for cache keying
    pub fn fingerprint(&self) -> String {
        self.to_query()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<'a> TasksApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists tasks with optional filters
    pub async fn list(&self, filter: TaskListFilter) -> ClientResult<TaskList> {
        self.client
            .request_json(Method::GET, "/tasks", &filter.to_query(), None)
            .await
    }

    /// Lists trashed tasks
    pub async fn list_trash(&self) -> ClientResult<TaskList> {
        self.client
            .request_json(Method::GET, "/tasks/trash", &[], None)
            .await
    }

    /// Creates a task
    pub async fn create(&self, data: &CreateTask) -> ClientResult<Task> {
        self.client
            .request_json(
                Method::POST,
                "/tasks",
                &[],
                Some(serde_json::to_value(data).expect("serializable input")),
            )
            .await
    }

    /// Fetches a task
    pub async fn get(&self, id: Uuid) -> ClientResult<Task> {
        self.client
            .request_json(Method::GET, &format!("/tasks/{}", id), &[], None)
            .await
    }

    /// Partially updates a task
    pub async fn update(&self, id: Uuid, patch: serde_json::Value) -> ClientResult<Task> {
        self.client
            .request_json(Method::PATCH, &format!("/tasks/{}", id), &[], Some(patch))
            .await
    }

    /// Changes just the status (the Kanban move PATCH)
    pub async fn set_status(&self, id: Uuid, status: TaskStatus) -> ClientResult<Task> {
        self.update(id, json!({ "status": status })).await
    }

    /// Soft-deletes a task (moves it to the trash)
    pub async fn delete(&self, id: Uuid) -> ClientResult<Task> {
        self.client
            .request_json(Method::DELETE, &format!("/tasks/{}", id), &[], None)
            .await
    }

    /// Restores a trashed task
    pub async fn restore(&self, id: Uuid) -> ClientResult<Task> {
        self.client
            .request_json(Method::POST, &format!("/tasks/{}/restore", id), &[], None)
            .await
    }

    /// Permanently deletes a task
    pub async fn delete_permanent(&self, id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(Method::DELETE, &format!("/tasks/{}/permanent", id), None)
            .await
    }

    /// Duplicates a task
    pub async fn duplicate(&self, id: Uuid) -> ClientResult<Task> {
        self.client
            .request_json(Method::POST, &format!("/tasks/{}/duplicate", id), &[], None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_to_query() {
        let filter = TaskListFilter {
            status: Some(TaskStatus::Done),
            deleted: Some(false),
            ..Default::default()
        };

        let query = filter.to_query();
        assert!(query.contains(&("status".to_string(), "done".to_string())));
        assert!(query.contains(&("deleted".to_string(), "false".to_string())));
    }

    #[test]
    fn test_filter_fingerprint_stable() {
        let filter = TaskListFilter {
            status: Some(TaskStatus::Todo),
            search: Some("milk".to_string()),
            ..Default::default()
        };

        assert_eq!(filter.fingerprint(), "status=todo&search=milk");
        assert_eq!(TaskListFilter::default().fingerprint(), "");
    }
}
