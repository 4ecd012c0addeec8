/// Error types for the client SDK

use serde::Deserialize;

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Unified client error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,

        /// Error message from the response body (or a fallback)
        message: String,
    },

    /// No tokens in the store; the caller must log in first
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The refresh token was rejected; stored tokens have been cleared and
    /// the user must log in again
    #[error("Session expired")]
    SessionExpired,
}

/// Error body shape returned by the API
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,
}

impl ClientError {
    /// Builds an API error from a status code and an optional parsed body
    pub fn api(status: u16, body: Option<ApiErrorBody>) -> Self {
        ClientError::Api {
            status,
            message: body
                .map(|b| b.message)
                .unwrap_or_else(|| "Unknown error".to_string()),
        }
    }

    /// Whether this error is an authentication failure (401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_fallback() {
        let err = ClientError::api(500, None);
        assert_eq!(err.to_string(), "API error (500): Unknown error");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::api(401, None).is_unauthorized());
        assert!(!ClientError::api(403, None).is_unauthorized());
        assert!(!ClientError::SessionExpired.is_unauthorized());
    }
}
