/// Persistent token storage
///
/// Holds the access/refresh token pair behind an `RwLock`, optionally backed
/// by a JSON file so a CLI session survives process restarts. Every write
/// bumps a generation counter; the refresh machinery uses it to detect that
/// another caller already rotated the tokens while it waited for the
/// refresh lock.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;

/// An access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential
    pub access_token: String,

    /// Long-lived credential used to mint new access tokens
    pub refresh_token: String,
}

#[derive(Debug, Default)]
struct TokenState {
    tokens: Option<TokenPair>,
    generation: u64,
}

/// Thread-safe token store with optional file persistence
#[derive(Debug)]
pub struct TokenStore {
    state: RwLock<TokenState>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Creates an empty in-memory store
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(TokenState::default()),
            path: None,
        }
    }

    /// Creates a file-backed store, loading existing tokens if present
    ///
    /// A missing or unreadable file starts the store empty rather than
    /// failing; a corrupt file is ignored the same way.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());

        Self {
            state: RwLock::new(TokenState {
                tokens,
                generation: 0,
            }),
            path: Some(path),
        }
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        let state = self.state.read().expect("token lock");
        state.tokens.as_ref().map(|t| t.access_token.clone())
    }

    /// Current refresh token, if any
    pub fn refresh_token(&self) -> Option<String> {
        let state = self.state.read().expect("token lock");
        state.tokens.as_ref().map(|t| t.refresh_token.clone())
    }

    /// Whether any tokens are stored
    pub fn is_authenticated(&self) -> bool {
        let state = self.state.read().expect("token lock");
        state.tokens.is_some()
    }

    /// Generation counter; bumped on every set/clear
    pub fn generation(&self) -> u64 {
        let state = self.state.read().expect("token lock");
        state.generation
    }

    /// Stores a new token pair and persists it if file-backed
    pub fn set(&self, tokens: TokenPair) {
        {
            let mut state = self.state.write().expect("token lock");
            state.tokens = Some(tokens.clone());
            state.generation += 1;
        }

        if let Some(ref path) = self.path {
            if let Ok(bytes) = serde_json::to_vec_pretty(&tokens) {
                if let Err(e) = std::fs::write(path, bytes) {
                    tracing::warn!("Failed to persist tokens: {}", e);
                }
            }
        }
    }

    /// Clears stored tokens (logout or terminal auth failure)
    pub fn clear(&self) {
        {
            let mut state = self.state.write().expect("token lock");
            state.tokens = None;
            state.generation += 1;
        }

        if let Some(ref path) = self.path {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let store = TokenStore::in_memory();
        assert!(!store.is_authenticated());
        assert_eq!(store.generation(), 0);

        store.set(pair("a1", "r1"));
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
        assert_eq!(store.generation(), 1);

        store.clear();
        assert!(!store.is_authenticated());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_generation_bumps_on_every_write() {
        let store = TokenStore::in_memory();
        store.set(pair("a1", "r1"));
        store.set(pair("a2", "r2"));
        assert_eq!(store.generation(), 2);
        assert_eq!(store.access_token().as_deref(), Some("a2"));
    }

    #[test]
    fn test_file_persistence() {
        let path = std::env::temp_dir().join(format!(
            "taskflow-tokens-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = TokenStore::with_file(&path);
        assert!(!store.is_authenticated());

        store.set(pair("a1", "r1"));

        // A fresh store picks up the persisted pair
        let reloaded = TokenStore::with_file(&path);
        assert_eq!(reloaded.access_token().as_deref(), Some("a1"));

        store.clear();
        let cleared = TokenStore::with_file(&path);
        assert!(!cleared.is_authenticated());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "taskflow-tokens-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, b"not json").unwrap();

        let store = TokenStore::with_file(&path);
        assert!(!store.is_authenticated());

        let _ = std::fs::remove_file(&path);
    }
}
