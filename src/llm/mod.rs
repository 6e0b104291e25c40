//! Reasoning service integration.
//!
//! The engine only needs plain prompt-in/text-out generation, so the
//! [`ReasoningService`] trait is intentionally narrow. [`OllamaClient`] speaks
//! the Ollama `/api/generate` protocol.

mod ollama;
mod provider;
#[cfg(test)]
pub(crate) mod testing;

pub use ollama::OllamaClient;
pub use provider::{GenerationRequest, ReasoningService, SamplingOptions};

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Create the reasoning service client from configuration.
pub fn create_reasoning_service(config: &LlmConfig) -> Result<Arc<dyn ReasoningService>, LlmError> {
    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        "Using Ollama reasoning service"
    );
    Ok(Arc::new(OllamaClient::new(config.clone())?))
}
