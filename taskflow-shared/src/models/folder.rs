/// Folder model and database operations
///
/// Folders organize tasks and notes. Deleting a folder is a hard delete;
/// tasks and notes that referenced it get their `folder_id` cleared by the
/// `ON DELETE SET NULL` foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Folder model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Folder name
    pub name: String,

    /// Display color (e.g., "#ff8800")
    pub color: Option<String>,

    /// Hidden from shared views
    pub is_private: bool,

    /// When the folder was created
    pub created_at: DateTime<Utc>,

    /// When the folder was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a folder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name (required)
    pub name: String,

    /// Display color
    #[serde(default)]
    pub color: Option<String>,

    /// Privacy flag
    #[serde(default)]
    pub is_private: bool,
}

/// Input for partially updating a folder
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFolder {
    /// New name
    #[serde(default)]
    pub name: Option<String>,

    /// New color (null clears)
    #[serde(default)]
    pub color: Option<Option<String>>,

    /// New privacy flag
    #[serde(default)]
    pub is_private: Option<bool>,
}

impl Folder {
    /// Creates a new folder owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateFolder,
    ) -> Result<Self, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (user_id, name, color, is_private)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, color, is_private, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.color)
        .bind(data.is_private)
        .fetch_one(pool)
        .await?;

        Ok(folder)
    }

    /// Finds a folder by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, user_id, name, color, is_private, created_at, updated_at
            FROM folders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(folder)
    }

    /// Lists a user's folders, alphabetically
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let folders = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, user_id, name, color, is_private, created_at, updated_at
            FROM folders
            WHERE user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(folders)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFolder,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE folders SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.is_private.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_private = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, user_id, name, color, is_private, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Folder>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(is_private) = data.is_private {
            q = q.bind(is_private);
        }

        let folder = q.fetch_optional(pool).await?;

        Ok(folder)
    }

    /// Deletes a folder
    ///
    /// Tasks and notes filed under it are unfiled, not deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
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
    fn test_create_folder_defaults() {
        let create: CreateFolder = serde_json::from_str(r#"{"name": "Work"}"#).unwrap();
        assert_eq!(create.name, "Work");
        assert!(create.color.is_none());
        assert!(!create.is_private);
    }

    #[test]
    fn test_update_folder_color_clearing() {
        let update: UpdateFolder = serde_json::from_str(r#"{"color": null}"#).unwrap();
        assert_eq!(update.color, Some(None));
    }
}
