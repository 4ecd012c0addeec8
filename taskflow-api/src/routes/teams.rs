/// Team endpoints
///
/// Role-gated team management: members can view, admins can edit details and
/// manage members, only the owner can delete the team. The owner membership
/// cannot be removed or demoted.
///
/// # Endpoints
///
/// - `GET    /api/v1/teams` - Teams the caller belongs to
/// - `POST   /api/v1/teams` - Create (creator becomes owner member) → 201
/// - `GET    /api/v1/teams/:id` - Fetch one (members only)
/// - `PATCH  /api/v1/teams/:id` - Update details (owner/admin)
/// - `DELETE /api/v1/teams/:id` - Delete (owner only)
/// - `GET    /api/v1/teams/:id/members` - List members
/// - `POST   /api/v1/teams/:id/members` - Add a user by email (owner/admin)
/// - `DELETE /api/v1/teams/:id/members/:user_id` - Remove a member (owner/admin)

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
    models::{
        team::{CreateTeam, Team, TeamMember, TeamRole, UpdateTeam},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add (must already have an account)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role to grant (default: member; granting owner is not allowed)
    #[serde(default = "default_member_role")]
    pub role: TeamRole,
}

fn default_member_role() -> TeamRole {
    TeamRole::Member
}

/// Team list response
#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    /// Teams the caller belongs to
    pub teams: Vec<Team>,

    /// Total count
    pub total: usize,
}

/// Member list response
#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    /// Members with identity and role
    pub members: Vec<TeamMember>,

    /// Total count
    pub total: usize,
}

/// Loads a team and the caller's role in it
///
/// 404 when the team doesn't exist, 403 when the caller isn't a member or
/// holds a lower role than required.
async fn load_team_with_role(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
    required: TeamRole,
) -> ApiResult<(Team, TeamRole)> {
    let team = Team::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    let role = Team::member_role(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("You are not a member of this team".to_string()))?;

    if !role.has_permission(required) {
        return Err(ApiError::Forbidden(
            "Insufficient role for this operation".to_string(),
        ));
    }

    Ok((team, role))
}

/// Lists teams the caller belongs to
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TeamListResponse>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;
    let total = teams.len();

    Ok(Json(TeamListResponse { teams, total }))
}

/// Creates a team; the creator becomes its owner member
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    req.validate().map_err(ApiError::from)?;

    let team = Team::create(
        &state.db,
        auth.user_id,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    tracing::info!(team_id = %team.id, owner_id = %auth.user_id, "Team created");

    Ok((StatusCode::CREATED, Json(team)))
}

/// Fetches a team (members only)
pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    let (team, _) = load_team_with_role(&state, &auth, id, TeamRole::Member).await?;

    Ok(Json(team))
}

/// Updates team details (owner/admin)
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeam>,
) -> ApiResult<Json<Team>> {
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

    load_team_with_role(&state, &auth, id, TeamRole::Admin).await?;

    let team = Team::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(team))
}

/// Deletes a team (owner only)
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_team_with_role(&state, &auth, id, TeamRole::Owner).await?;

    Team::delete(&state.db, id).await?;

    tracing::info!(team_id = %id, "Team deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Lists team members (members only)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberListResponse>> {
    load_team_with_role(&state, &auth, id, TeamRole::Member).await?;

    let members = Team::list_members(&state.db, id).await?;
    let total = members.len();

    Ok(Json(MemberListResponse { members, total }))
}

/// Adds a user to the team by email (owner/admin)
///
/// # Errors
///
/// - `404 Not Found`: no account with that email
/// - `400 Bad Request`: granting the owner role
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<MemberListResponse>> {
    req.validate().map_err(ApiError::from)?;

    if req.role == TeamRole::Owner {
        return Err(ApiError::BadRequest(
            "A team has exactly one owner".to_string(),
        ));
    }

    load_team_with_role(&state, &auth, id, TeamRole::Admin).await?;

    let invitee = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user with that email".to_string()))?;

    Team::add_member(&state.db, id, invitee.id, req.role).await?;

    let members = Team::list_members(&state.db, id).await?;
    let total = members.len();

    Ok(Json(MemberListResponse { members, total }))
}

/// Removes a member (owner/admin); the owner cannot be removed
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (team, _) = load_team_with_role(&state, &auth, id, TeamRole::Admin).await?;

    if user_id == team.owner_id {
        return Err(ApiError::BadRequest(
            "The team owner cannot be removed".to_string(),
        ));
    }

    let removed = Team::remove_member(&state.db, id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_validation() {
        let valid: CreateTeamRequest = serde_json::from_str(r#"{"name": "Platform"}"#).unwrap();
        assert!(valid.validate().is_ok());

        let empty: CreateTeamRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_add_member_defaults_to_member_role() {
        let req: AddMemberRequest =
            serde_json::from_str(r#"{"email": "friend@example.com"}"#).unwrap();
        assert_eq!(req.role, TeamRole::Member);
    }
}
