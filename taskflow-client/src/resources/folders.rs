/// Folder endpoints

use crate::client::ApiClient;
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use taskflow_shared::models::folder::{CreateFolder, Folder};
use uuid::Uuid;

/// Folder API wrapper
pub struct FoldersApi<'a> {
    client: &'a ApiClient,
}

/// Folder list response
#[derive(Debug, Deserialize)]
pub struct FolderList {
    /// The caller's folders
    pub folders: Vec<Folder>,

    /// Total count
    pub total: usize,
}

impl<'a> FoldersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists folders
    pub async fn list(&self) -> ClientResult<FolderList> {
        self.client
            .request_json(Method::GET, "/folders", &[], None)
            .await
    }

    /// Creates a folder
    pub async fn create(&self, data: &CreateFolder) -> ClientResult<Folder> {
        self.client
            .request_json(
                Method::POST,
                "/folders",
                &[],
                Some(serde_json::to_value(data).expect("serializable input")),
            )
            .await
    }

    /// Partially updates a folder
    pub async fn update(&self, id: Uuid, patch: serde_json::Value) -> ClientResult<Folder> {
        self.client
            .request_json(Method::PATCH, &format!("/folders/{}", id), &[], Some(patch))
            .await
    }

    /// Deletes a folder (tasks/notes under it are unfiled, not deleted)
    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(Method::DELETE, &format!("/folders/{}", id), None)
            .await
    }
}
