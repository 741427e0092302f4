//! Chat-completion provider access.
//!
//! The analysis pipeline only sees [`CompletionClient`]; [`OpenAiClient`] is
//! the production implementation. Tests substitute a scripted client.

mod error;
mod openai;

pub use error::{ApiError, ApiErrorResponse, CompletionError};
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// One single-turn completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Provider model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Content of the single user message.
    pub prompt: String,
}

/// A chat-completion backend.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn CompletionClient>`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `request` and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
