/// The TaskFlow API client
///
/// Wraps a reqwest client with the token lifecycle from the auth design:
/// every request attaches `Authorization: Bearer <access>` from the token
/// store; a 401 response triggers a single-flight refresh through the
/// [`RefreshGate`](crate::refresh::RefreshGate) and the original request is
/// replayed exactly once with the new token. A second 401 after replay is
/// terminal.
///
/// # Example
///
/// ```no_run
/// use taskflow_client::client::ApiClient;
///
/// # async fn example() -> Result<(), taskflow_client::error::ClientError> {
/// let client = ApiClient::from_env();
/// client.auth().login("user@example.com", "password1").await?;
/// let tasks = client.tasks().list(Default::default()).await?;
/// # Ok(())
/// # }
/// ```

use crate::error::{ApiErrorBody, ClientError, ClientResult};
use crate::refresh::RefreshGate;
use crate::resources::{
    auth::AuthApi, folders::FoldersApi, habits::HabitsApi, notes::NotesApi, tasks::TasksApi,
    teams::TeamsApi,
};
use crate::tokens::{TokenPair, TokenStore};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default API base URL when `TASKFLOW_API_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Typed TaskFlow API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    refresh_gate: Arc<RefreshGate>,
}

/// Refresh endpoint response shape
#[derive(Debug, Serialize, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

impl ApiClient {
    /// Creates a client for the given base URL with an in-memory token store
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");

        Self {
            http,
            base_url: base_url.into(),
            tokens: Arc::new(TokenStore::in_memory()),
            refresh_gate: Arc::new(RefreshGate::new()),
        }
    }

    /// Creates a client from the `TASKFLOW_API_URL` environment variable,
    /// falling back to localhost
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TASKFLOW_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Replaces the token store with a file-backed one
    pub fn with_token_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.tokens = Arc::new(TokenStore::with_file(path));
        self
    }

    /// The token store backing this client
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Auth endpoints (login, register, refresh, logout)
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Task endpoints
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    /// Note endpoints
    pub fn notes(&self) -> NotesApi<'_> {
        NotesApi::new(self)
    }

    /// Folder endpoints
    pub fn folders(&self) -> FoldersApi<'_> {
        FoldersApi::new(self)
    }

    /// Team endpoints
    pub fn teams(&self) -> TeamsApi<'_> {
        TeamsApi::new(self)
    }

    /// Habit endpoints
    pub fn habits(&self) -> HabitsApi<'_> {
        HabitsApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request once with the given access token attached
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
        access_token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let mut req = self.http.request(method.clone(), self.url(path));

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = access_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        Ok(req.send().await?)
    }

    /// Refreshes the access token, single-flight
    ///
    /// `observed_generation` is the token-store generation the caller saw
    /// when it got the 401. If the store moved past it while this call
    /// waited for the gate, the rotation already happened and the stored
    /// token is reused without touching the network.
    async fn refresh_access_token(&self, observed_generation: u64) -> ClientResult<String> {
        let _guard = self.refresh_gate.acquire().await;

        if self.tokens.generation() != observed_generation {
            // Someone else refreshed (or failed and cleared) while we waited
            return self.tokens.access_token().ok_or(ClientError::SessionExpired);
        }

        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(ClientError::SessionExpired)?;

        tracing::debug!("Refreshing access token");

        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if response.status().is_success() {
            let pair: RefreshResponse = response.json().await?;
            let access = pair.access_token.clone();
            self.tokens.set(TokenPair {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            });
            Ok(access)
        } else {
            // The refresh token is dead; clear the store so every waiter
            // fails out instead of retrying
            tracing::warn!(status = %response.status(), "Token refresh rejected");
            self.tokens.clear();
            Err(ClientError::SessionExpired)
        }
    }

    /// Performs an authenticated request with the 401-refresh-replay cycle
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<reqwest::Response> {
        let access = self
            .tokens
            .access_token()
            .ok_or(ClientError::NotAuthenticated)?;
        let observed_generation = self.tokens.generation();

        let response = self
            .send_once(&method, path, query, body.as_ref(), Some(&access))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // One refresh, one replay; a second 401 is terminal
        let new_access = self.refresh_access_token(observed_generation).await?;
        let replayed = self
            .send_once(&method, path, query, body.as_ref(), Some(&new_access))
            .await?;

        Ok(replayed)
    }

    /// Converts a non-success response into a `ClientError::Api`
    async fn into_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body: Option<ApiErrorBody> = response.json().await.ok();
        ClientError::api(status, body)
    }

    /// Authenticated request expecting a JSON response body
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let response = self.execute(method, path, query, body).await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Authenticated request with no expected response body
    pub(crate) async fn request_no_content(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<()> {
        let response = self.execute(method, path, &[], body).await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }

        Ok(())
    }

    /// Unauthenticated request (login, register, refresh, logout)
    pub(crate) async fn request_public<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let response = self
            .send_once(&method, path, &[], body.as_ref(), None)
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_fallback() {
        // In the absence of TASKFLOW_API_URL the localhost default applies
        if std::env::var("TASKFLOW_API_URL").is_err() {
            let client = ApiClient::from_env();
            assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        }
    }

    #[test]
    fn test_url_joins_path() {
        let client = ApiClient::new("http://example.com/api/v1");
        assert_eq!(client.url("/tasks"), "http://example.com/api/v1/tasks");
    }

    #[tokio::test]
    async fn test_unauthenticated_request_fails_fast() {
        let client = ApiClient::new("http://localhost:1");
        let result: ClientResult<serde_json::Value> = client
            .request_json(Method::GET, "/tasks", &[], None)
            .await;

        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }
}
