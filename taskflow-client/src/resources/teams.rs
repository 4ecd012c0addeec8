/// Team endpoints

use crate::client::ApiClient;
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_shared::models::team::{CreateTeam, Team, TeamMember, TeamRole};
use uuid::Uuid;

/// Team API wrapper
pub struct TeamsApi<'a> {
    client: &'a ApiClient,
}

/// Team list response
#[derive(Debug, Deserialize)]
pub struct TeamList {
    /// Teams the caller belongs to
    pub teams: Vec<Team>,

    /// Total count
    pub total: usize,
}

/// Member list response
#[derive(Debug, Deserialize)]
pub struct MemberList {
    /// Members with identity and role
    pub members: Vec<TeamMember>,

    /// Total count
    pub total: usize,
}

impl<'a> TeamsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists teams the caller belongs to
    pub async fn list(&self) -> ClientResult<TeamList> {
        self.client
            .request_json(Method::GET, "/teams", &[], None)
            .await
    }

    /// Creates a team
    pub async fn create(&self, data: &CreateTeam) -> ClientResult<Team> {
        self.client
            .request_json(
                Method::POST,
                "/teams",
                &[],
                Some(serde_json::to_value(data).expect("serializable input")),
            )
            .await
    }

    /// Fetches a team
    pub async fn get(&self, id: Uuid) -> ClientResult<Team> {
        self.client
            .request_json(Method::GET, &format!("/teams/{}", id), &[], None)
            .await
    }

    /// Partially updates a team
    pub async fn update(&self, id: Uuid, patch: serde_json::Value) -> ClientResult<Team> {
        self.client
            .request_json(Method::PATCH, &format!("/teams/{}", id), &[], Some(patch))
            .await
    }

    /// Deletes a team (owner only)
    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(Method::DELETE, &format!("/teams/{}", id), None)
            .await
    }

    /// Lists team members
    pub async fn list_members(&self, id: Uuid) -> ClientResult<MemberList> {
        self.client
            .request_json(Method::GET, &format!("/teams/{}/members", id), &[], None)
            .await
    }

    /// Adds a user to the team by email
    pub async fn add_member(
        &self,
        id: Uuid,
        email: &str,
        role: TeamRole,
    ) -> ClientResult<MemberList> {
        self.client
            .request_json(
                Method::POST,
                &format!("/teams/{}/members", id),
                &[],
                Some(json!({ "email": email, "role": role })),
            )
            .await
    }

    /// Removes a member from the team
    pub async fn remove_member(&self, id: Uuid, user_id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(
                Method::DELETE,
                &format!("/teams/{}/members/{}", id, user_id),
                None,
            )
            .await
    }
}
