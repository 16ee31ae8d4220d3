//! Generation agent abstraction.
//!
//! The application layer drives website generation through this trait,
//! decoupling the controller from the concrete HTTP client and making
//! generation flows testable with in-process fakes.

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Which instructional template accompanies the user prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// Full website generation with the marker contract.
    Generate,
    /// Prompt enhancement: expand the request, return only the new prompt.
    Enhance,
}

/// One chat-completion request. Ephemeral; never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub variant: PromptVariant,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, variant: PromptVariant) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            variant,
        }
    }
}

/// An agent that turns a request into raw response text.
///
/// # Cancellation
///
/// Implementations must observe the token: once it is cancelled, the call
/// resolves with [`WebllamaError::Cancelled`](crate::WebllamaError::Cancelled)
/// rather than a partial result.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// Sends the request and returns the first response message's text.
    async fn complete(&self, request: &GenerationRequest, cancel: CancellationToken)
    -> Result<String>;
}
