/// Team model and database operations
///
/// Teams implement a many-to-many relationship between users and a shared
/// workspace with role-based access control.
///
/// # Roles
///
/// - **owner**: Full control, can delete the team
/// - **admin**: Can manage members and edit team details
/// - **member**: Can view the team and share tasks into it
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('owner', 'admin', 'member');
///
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role team_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// RBAC roles for team memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full control, can delete the team
    Owner,

    /// Can manage members and edit team details
    Admin,

    /// Can view the team and share tasks into it
    Member,
}

impl TeamRole {
    /// Converts role to string
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
        }
    }

    /// Can edit team details and manage members
    pub fn can_manage(&self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Admin)
    }

    /// Can delete the team
    pub fn can_delete_team(&self) -> bool {
        matches!(self, TeamRole::Owner)
    }

    /// Checks if this role meets the required permission level
    ///
    /// Hierarchy: Owner > Admin > Member
    pub fn has_permission(&self, required: TeamRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            TeamRole::Owner => 3,
            TeamRole::Admin => 2,
            TeamRole::Member => 1,
        }
    }
}

/// Team model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// User who created the team
    pub owner_id: Uuid,

    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// A membership row joined with user identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Member user ID
    pub user_id: Uuid,

    /// Member email
    pub email: String,

    /// Member display name
    pub name: Option<String>,

    /// Role within the team
    pub role: TeamRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name (required)
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for partially updating a team
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeam {
    /// New name
    #[serde(default)]
    pub name: Option<String>,

    /// New description (null clears)
    #[serde(default)]
    pub description: Option<Option<String>>,
}

impl Team {
    /// Creates a new team and adds the creator as owner member
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateTeam,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(team.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists teams the user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.owner_id, t.name, t.description, t.created_at, t.updated_at
            FROM teams t
            JOIN team_members tm ON tm.team_id = t.id
            WHERE tm.user_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE teams SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, owner_id, name, description, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Team>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let team = q.fetch_optional(pool).await?;

        Ok(team)
    }

    /// Deletes a team (memberships cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Looks up the role a user holds in this team, if any
    pub async fn member_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamRole>, sqlx::Error> {
        let role: Option<(TeamRole,)> =
            sqlx::query_as("SELECT role FROM team_members WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(role.map(|(r,)| r))
    }

    /// Adds a user to the team (upserts the role)
    pub async fn add_member(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists members with their user identity
    pub async fn list_members(
        pool: &PgPool,
        team_id: Uuid,
    ) -> Result<Vec<TeamMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT tm.user_id, u.email, u.name, tm.role, tm.joined_at
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = $1
            ORDER BY tm.joined_at
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Removes a member from the team
    ///
    /// Returns true if a row was removed.
    pub async fn remove_member(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::Owner.as_str(), "owner");
        assert_eq!(TeamRole::Admin.as_str(), "admin");
        assert_eq!(TeamRole::Member.as_str(), "member");
    }

    #[test]
    fn test_team_role_permissions() {
        assert!(TeamRole::Owner.can_manage());
        assert!(TeamRole::Admin.can_manage());
        assert!(!TeamRole::Member.can_manage());

        assert!(TeamRole::Owner.can_delete_team());
        assert!(!TeamRole::Admin.can_delete_team());
    }

    #[test]
    fn test_team_role_hierarchy() {
        assert!(TeamRole::Owner.has_permission(TeamRole::Admin));
        assert!(TeamRole::Admin.has_permission(TeamRole::Member));
        assert!(!TeamRole::Member.has_permission(TeamRole::Admin));
        assert!(TeamRole::Admin.has_permission(TeamRole::Admin));
    }
}
