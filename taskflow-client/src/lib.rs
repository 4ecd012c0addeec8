//! # TaskFlow Client SDK
//!
//! Typed client for the TaskFlow API. Wraps reqwest with bearer-token
//! attachment and transparent refresh: a 401 triggers a single-flight token
//! refresh and the original request is replayed once with the new token.
//!
//! ## Modules
//!
//! - `client`: The `ApiClient` and request plumbing
//! - `tokens`: Persistent access/refresh token storage
//! - `refresh`: Single-flight refresh coordination
//! - `cache`: Optimistic list cache with snapshot/rollback
//! - `board`: Kanban board reordering
//! - `resources`: Typed per-resource API wrappers
//!
//! ## Example
//!
//! ```no_run
//! use taskflow_client::client::ApiClient;
//!
//! # async fn example() -> Result<(), taskflow_client::error::ClientError> {
//! let client = ApiClient::from_env();
//! client.auth().login("user@example.com", "password1").await?;
//!
//! let tasks = client.tasks().list(Default::default()).await?;
//! println!("{} tasks", tasks.total);
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod cache;
pub mod client;
pub mod error;
pub mod refresh;
pub mod resources;
pub mod tokens;

/// Current version of the TaskFlow client SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
