/// Note model and database operations
///
/// Notes hold rich-text content (stored as text, rendered client-side), a
/// tag set, pin/favorite flags, and an optional folder. Like tasks they get
/// the trash/restore flow via `deleted_at`. Notes can additionally be shared
/// with collaborators who hold a per-note role.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE collaborator_role AS ENUM ('viewer', 'editor');
///
/// CREATE TABLE notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     content TEXT NOT NULL DEFAULT '',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     is_pinned BOOLEAN NOT NULL DEFAULT FALSE,
///     is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
///     folder_id UUID REFERENCES folders(id) ON DELETE SET NULL,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE note_collaborators (
///     note_id UUID NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role collaborator_role NOT NULL DEFAULT 'editor',
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (note_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role a collaborator holds on a shared note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collaborator_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    /// Read-only access
    Viewer,

    /// Can edit the note
    Editor,
}

impl CollaboratorRole {
    /// Converts role to string
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Viewer => "viewer",
            CollaboratorRole::Editor => "editor",
        }
    }

    /// Whether this role permits editing
    pub fn can_edit(&self) -> bool {
        matches!(self, CollaboratorRole::Editor)
    }
}

/// Note model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Note title
    pub title: String,

    /// Rich-text content (Markdown or JSON-based rich text, opaque here)
    pub content: String,

    /// Tags for categorization
    pub tags: Vec<String>,

    /// Pinned to the top of lists
    pub is_pinned: bool,

    /// Marked as favorite
    pub is_favorite: bool,

    /// Folder the note is filed under
    pub folder_id: Option<Uuid>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the note was created
    pub created_at: DateTime<Utc>,

    /// When the note was last updated
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether the note is in the trash
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A collaborator row joined with user identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteCollaborator {
    /// Collaborating user
    pub user_id: Uuid,

    /// Collaborator email
    pub email: String,

    /// Collaborator display name
    pub name: Option<String>,

    /// Granted role
    pub role: CollaboratorRole,

    /// When access was granted
    pub added_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNote {
    /// Note title (required)
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

/// Input for partially updating a note
///
/// `tags`, when present, replaces the whole set. `folder_id` uses the
/// double-`Option` so explicit null unfiles the note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNote {
    /// New title
    #[serde(default)]
    pub title: Option<String>,

    /// New content
    #[serde(default)]
    pub content: Option<String>,

    /// Replacement tag set
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Pin/unpin
    #[serde(default)]
    pub is_pinned: Option<bool>,

    /// Favorite/unfavorite
    #[serde(default)]
    pub is_favorite: Option<bool>,

    /// New folder (null unfiles)
    #[serde(default)]
    pub folder_id: Option<Option<Uuid>>,
}

/// Filters for listing notes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFilter {
    /// Only notes in this folder
    pub folder_id: Option<Uuid>,

    /// Only notes carrying this tag
    pub tag: Option<String>,

    /// Only pinned notes
    pub pinned: Option<bool>,

    /// Only favorite notes
    pub favorite: Option<bool>,

    /// Include trashed instead of live notes
    pub deleted: Option<bool>,

    /// Case-insensitive substring match on title or content
    pub search: Option<String>,
}

impl Note {
    /// Creates a new note owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateNote,
    ) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (user_id, title, content, tags, is_pinned, is_favorite, folder_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, content, tags, is_pinned, is_favorite,
                      folder_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.tags)
        .bind(data.is_pinned)
        .bind(data.is_favorite)
        .bind(data.folder_id)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// Finds a note by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, content, tags, is_pinned, is_favorite,
                   folder_id, deleted_at, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Lists a user's notes with optional filters
    ///
    /// Pinned notes sort first, then newest-first.
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &NoteFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, title, content, tags, is_pinned, is_favorite, \
             folder_id, deleted_at, created_at, updated_at \
             FROM notes WHERE user_id = $1",
        );

        if filter.deleted.unwrap_or(false) {
            query.push_str(" AND deleted_at IS NOT NULL");
        } else {
            query.push_str(" AND deleted_at IS NULL");
        }

        let mut bind_count = 1;
        if filter.folder_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND folder_id = ${}", bind_count));
        }
        if filter.tag.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND ${} = ANY(tags)", bind_count));
        }
        if let Some(pinned) = filter.pinned {
            query.push_str(if pinned {
                " AND is_pinned"
            } else {
                " AND NOT is_pinned"
            });
        }
        if let Some(favorite) = filter.favorite {
            query.push_str(if favorite {
                " AND is_favorite"
            } else {
                " AND NOT is_favorite"
            });
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (title ILIKE ${0} OR content ILIKE ${0})",
                bind_count
            ));
        }

        query.push_str(" ORDER BY is_pinned DESC, created_at DESC");

        let mut q = sqlx::query_as::<_, Note>(&query).bind(user_id);

        if let Some(folder_id) = filter.folder_id {
            q = q.bind(folder_id);
        }
        if let Some(ref tag) = filter.tag {
            q = q.bind(tag);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }

        let notes = q.fetch_all(pool).await?;

        Ok(notes)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateNote,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE notes SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }
        if data.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }
        if data.is_pinned.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_pinned = ${}", bind_count));
        }
        if data.is_favorite.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_favorite = ${}", bind_count));
        }
        if data.folder_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", folder_id = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, user_id, title, content, tags, is_pinned, \
             is_favorite, folder_id, deleted_at, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Note>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(tags) = data.tags {
            q = q.bind(tags);
        }
        if let Some(is_pinned) = data.is_pinned {
            q = q.bind(is_pinned);
        }
        if let Some(is_favorite) = data.is_favorite {
            q = q.bind(is_favorite);
        }
        if let Some(folder_id) = data.folder_id {
            q = q.bind(folder_id);
        }

        let note = q.fetch_optional(pool).await?;

        Ok(note)
    }

    /// Soft-deletes a note (moves it to the trash)
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET deleted_at = COALESCE(deleted_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, tags, is_pinned, is_favorite,
                      folder_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Restores a trashed note
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET deleted_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, tags, is_pinned, is_favorite,
                      folder_id, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Permanently deletes a note (collaborator rows cascade)
    pub async fn delete_permanent(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Grants a user access to this note (upserts the role)
    pub async fn add_collaborator(
        pool: &PgPool,
        note_id: Uuid,
        user_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO note_collaborators (note_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (note_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(note_id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists collaborators with their user identity
    pub async fn list_collaborators(
        pool: &PgPool,
        note_id: Uuid,
    ) -> Result<Vec<NoteCollaborator>, sqlx::Error> {
        let collaborators = sqlx::query_as::<_, NoteCollaborator>(
            r#"
            SELECT nc.user_id, u.email, u.name, nc.role, nc.added_at
            FROM note_collaborators nc
            JOIN users u ON u.id = nc.user_id
            WHERE nc.note_id = $1
            ORDER BY nc.added_at
            "#,
        )
        .bind(note_id)
        .fetch_all(pool)
        .await?;

        Ok(collaborators)
    }

    /// Looks up the role a user holds on this note, if any
    pub async fn collaborator_role(
        pool: &PgPool,
        note_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CollaboratorRole>, sqlx::Error> {
        let role: Option<(CollaboratorRole,)> = sqlx::query_as(
            "SELECT role FROM note_collaborators WHERE note_id = $1 AND user_id = $2",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role.map(|(r,)| r))
    }

    /// Revokes a collaborator's access
    ///
    /// Returns true if a row was removed.
    pub async fn remove_collaborator(
        pool: &PgPool,
        note_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM note_collaborators WHERE note_id = $1 AND user_id = $2")
                .bind(note_id)
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
    fn test_collaborator_role() {
        assert_eq!(CollaboratorRole::Viewer.as_str(), "viewer");
        assert_eq!(CollaboratorRole::Editor.as_str(), "editor");
        assert!(!CollaboratorRole::Viewer.can_edit());
        assert!(CollaboratorRole::Editor.can_edit());
    }

    #[test]
    fn test_create_note_defaults() {
        let create: CreateNote = serde_json::from_str(r#"{"title": "Meeting Notes"}"#).unwrap();
        assert_eq!(create.title, "Meeting Notes");
        assert_eq!(create.content, "");
        assert!(create.tags.is_empty());
        assert!(!create.is_pinned);
    }

    #[test]
    fn test_update_note_folder_clearing() {
        let update: UpdateNote = serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert_eq!(update.folder_id, Some(None));

        let update: UpdateNote = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(update.folder_id.is_none());
    }
}
