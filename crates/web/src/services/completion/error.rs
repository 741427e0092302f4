//! Error types for the completion client.

use thiserror::Error;

/// Errors that can occur when calling the completion provider.
///
/// None of these are retried; the caller surfaces them as an upstream failure.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response carried no message content.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// Client could not be configured.
    #[error("client configuration error: {0}")]
    Config(String),
}

/// OpenAI-style error envelope.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// Error message.
    pub message: String,
    /// Error type, when the provider sends one.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
