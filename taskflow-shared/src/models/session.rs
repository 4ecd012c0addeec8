/// Refresh session model and database operations
///
/// Every issued refresh token is backed by a session row. The token itself is
/// never stored; only its SHA-256 digest is, so a database leak does not leak
/// usable credentials. Refreshing rotates the session (the old row is revoked
/// and a new one opened), and logout revokes explicitly — a rotated-away or
/// revoked refresh token is rejected even if its JWT signature is still valid.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     refresh_token_hash VARCHAR(64) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// A refresh session row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Session ID, embedded in token claims as `sid`
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex digest of the refresh token
    pub refresh_token_hash: String,

    /// When the session was opened
    pub created_at: DateTime<Utc>,

    /// When the refresh token expires
    pub expires_at: DateTime<Utc>,

    /// Set when the session is rotated away or logged out
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Computes the hex SHA-256 digest of a refresh token
pub fn hash_refresh_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

impl Session {
    /// Opens a new session with a pre-allocated id
    ///
    /// The id is allocated by the caller so it can be embedded in the token
    /// claims before the row exists; the token digest is written once the
    /// token has been minted.
    pub async fn open(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, refresh_token_hash, created_at, expires_at, revoked_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(hash_refresh_token(refresh_token))
        .bind(Utc::now() + ttl)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, refresh_token_hash, created_at, expires_at, revoked_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Whether this session still accepts the given refresh token
    ///
    /// The token must hash to the stored digest, and the session must be
    /// neither revoked nor expired.
    pub fn accepts(&self, refresh_token: &str) -> bool {
        self.revoked_at.is_none()
            && self.expires_at > Utc::now()
            && self.refresh_token_hash == hash_refresh_token(refresh_token)
    }

    /// Revokes a session (rotation or logout)
    ///
    /// Returns true if a live session was revoked.
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes all live sessions of a user
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_refresh_token_is_hex_sha256() {
        let digest = hash_refresh_token("some-token");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic
        assert_eq!(digest, hash_refresh_token("some-token"));
        assert_ne!(digest, hash_refresh_token("other-token"));
    }

    #[test]
    fn test_accepts() {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token_hash: hash_refresh_token("the-token"),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(30),
            revoked_at: None,
        };

        assert!(session.accepts("the-token"));
        assert!(!session.accepts("wrong-token"));

        let revoked = Session {
            revoked_at: Some(Utc::now()),
            ..session.clone()
        };
        assert!(!revoked.accepts("the-token"));

        let expired = Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session
        };
        assert!(!expired.accepts("the-token"));
    }
}
