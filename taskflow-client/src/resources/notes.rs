/// Note endpoints

use crate::client::ApiClient;
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_shared::models::note::{CollaboratorRole, CreateNote, Note, NoteCollaborator};
use uuid::Uuid;

/// Note API wrapper
pub struct NotesApi<'a> {
    client: &'a ApiClient,
}

/// Note list response
#[derive(Debug, Deserialize)]
pub struct NoteList {
    /// Matching notes
    pub notes: Vec<Note>,

    /// Total count
    pub total: usize,
}

/// Collaborator list response
#[derive(Debug, Deserialize)]
pub struct CollaboratorList {
    /// Collaborators with identity and role
    pub collaborators: Vec<NoteCollaborator>,

    /// Total count
    pub total: usize,
}

/// List filters, rendered into the query string
#[derive(Debug, Clone, Default)]
pub struct NoteListFilter {
    /// Only notes in this folder
    pub folder_id: Option<Uuid>,

    /// Only notes carrying this tag
    pub tag: Option<String>,

    /// Only pinned notes
    pub pinned: Option<bool>,

    /// Only favorite notes
    pub favorite: Option<bool>,

    /// List the trash instead of live notes
    pub deleted: Option<bool>,

    /// Substring search over title/content
    pub search: Option<String>,
}

impl NoteListFilter {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(folder_id) = self.folder_id {
            query.push(("folder_id".to_string(), folder_id.to_string()));
        }
        if let Some(ref tag) = self.tag {
            query.push(("tag".to_string(), tag.clone()));
        }
        if let Some(pinned) = self.pinned {
            query.push(("pinned".to_string(), pinned.to_string()));
        }
        if let Some(favorite) = self.favorite {
            query.push(("favorite".to_string(), favorite.to_string()));
        }
        if let Some(deleted) = self.deleted {
            query.push(("deleted".to_string(), deleted.to_string()));
        }
        if let Some(ref search) = self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query
    }
}

impl<'a> NotesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists notes with optional filters
    pub async fn list(&self, filter: NoteListFilter) -> ClientResult<NoteList> {
        self.client
            .request_json(Method::GET, "/notes", &filter.to_query(), None)
            .await
    }

    /// Lists trashed notes
    pub async fn list_trash(&self) -> ClientResult<NoteList> {
        self.client
            .request_json(Method::GET, "/notes/trash", &[], None)
            .await
    }

    /// Creates a note
    pub async fn create(&self, data: &CreateNote) -> ClientResult<Note> {
        self.client
            .request_json(
                Method::POST,
                "/notes",
                &[],
                Some(serde_json::to_value(data).expect("serializable input")),
            )
            .await
    }

    /// Fetches a note
    pub async fn get(&self, id: Uuid) -> ClientResult<Note> {
        self.client
            .request_json(Method::GET, &format!("/notes/{}", id), &[], None)
            .await
    }

    /// Partially updates a note
    pub async fn update(&self, id: Uuid, patch: serde_json::Value) -> ClientResult<Note> {
        self.client
            .request_json(Method::PATCH, &format!("/notes/{}", id), &[], Some(patch))
            .await
    }

    /// Pins or unpins a note
    pub async fn set_pinned(&self, id: Uuid, pinned: bool) -> ClientResult<Note> {
        self.update(id, json!({ "is_pinned": pinned })).await
    }

    /// Marks or unmarks a note as favorite
    pub async fn set_favorite(&self, id: Uuid, favorite: bool) -> ClientResult<Note> {
        self.update(id, json!({ "is_favorite": favorite })).await
    }

    /// Soft-deletes a note (moves it to the trash)
    pub async fn delete(&self, id: Uuid) -> ClientResult<Note> {
        self.client
            .request_json(Method::DELETE, &format!("/notes/{}", id), &[], None)
            .await
    }

    /// Restores a trashed note
    pub async fn restore(&self, id: Uuid) -> ClientResult<Note> {
        self.client
            .request_json(Method::POST, &format!("/notes/{}/restore", id), &[], None)
            .await
    }

    /// Permanently deletes a note
    pub async fn delete_permanent(&self, id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(Method::DELETE, &format!("/notes/{}/permanent", id), None)
            .await
    }

    /// Invites a user by email to collaborate
    pub async fn invite_collaborator(
        &self,
        id: Uuid,
        email: &str,
        role: CollaboratorRole,
    ) -> ClientResult<CollaboratorList> {
        self.client
            .request_json(
                Method::POST,
                &format!("/notes/{}/collaborators", id),
                &[],
                Some(json!({ "email": email, "role": role })),
            )
            .await
    }

    /// Lists collaborators
    pub async fn list_collaborators(&self, id: Uuid) -> ClientResult<CollaboratorList> {
        self.client
            .request_json(Method::GET, &format!("/notes/{}/collaborators", id), &[], None)
            .await
    }

    /// Revokes a collaborator's access
    pub async fn remove_collaborator(&self, id: Uuid, user_id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(
                Method::DELETE,
                &format!("/notes/{}/collaborators/{}", id, user_id),
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_to_query() {
        let filter = NoteListFilter {
            tag: Some("work".to_string()),
            pinned: Some(true),
            ..Default::default()
        };

        let query = filter.to_query();
        assert!(query.contains(&("tag".to_string(), "work".to_string())));
        assert!(query.contains(&("pinned".to_string(), "true".to_string())));
        assert_eq!(query.len(), 2);
    }
}
