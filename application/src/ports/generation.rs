//! Generation service port
//!
//! Defines the interface for asking a language model for text.

use async_trait::async_trait;
use panel_domain::ConversationTurn;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Text generation backed by some model provider.
///
/// Implementations (adapters) live in the infrastructure layer. Rate
/// limiting and retries are the adapter's concern.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a reply to `prompt`, optionally under a system prompt and
    /// after the given prior conversation.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        context: &[ConversationTurn],
    ) -> Result<String, GenerationError>;
}
