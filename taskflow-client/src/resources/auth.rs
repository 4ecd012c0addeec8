/// Auth endpoints
///
/// Login and register store the returned token pair in the client's token
/// store; logout revokes the refresh session server-side and clears it.

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::tokens::TokenPair;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_shared::models::user::User;

/// Auth API wrapper
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

/// Token response from register/login/refresh
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Authenticated user id
    pub user_id: String,

    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: String,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Registers a new account and stores its tokens
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ClientResult<TokenResponse> {
        let response: TokenResponse = self
            .client
            .request_public(
                Method::POST,
                "/auth/register",
                Some(json!({ "email": email, "password": password, "name": name })),
            )
            .await?;

        self.client.tokens().set(TokenPair {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
        });

        Ok(response)
    }

    /// Logs in and stores the issued tokens
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        let response: TokenResponse = self
            .client
            .request_public(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        self.client.tokens().set(TokenPair {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
        });

        Ok(response)
    }

    /// Fetches the authenticated user's profile
    pub async fn me(&self) -> ClientResult<User> {
        self.client
            .request_json(Method::GET, "/users/me", &[], None)
            .await
    }

    /// Updates the authenticated user's profile
    ///
    /// Absent fields are untouched; explicit null clears name/bio/avatar.
    pub async fn update_me(&self, patch: serde_json::Value) -> ClientResult<User> {
        self.client
            .request_json(Method::PATCH, "/users/me", &[], Some(patch))
            .await
    }

    /// Logs out: revokes the refresh session and clears stored tokens
    ///
    /// The store is cleared even if the server call fails; the session will
    /// expire on its own.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Some(refresh_token) = self.client.tokens().refresh_token() {
            let result: ClientResult<serde_json::Value> = self
                .client
                .request_public(
                    Method::POST,
                    "/auth/logout",
                    Some(json!({ "refresh_token": refresh_token })),
                )
                .await;

            if let Err(ref e) = result {
                tracing::warn!("Logout request failed: {}", e);
            }
        }

        self.client.tokens().clear();
        Ok(())
    }
}
