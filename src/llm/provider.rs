//! Reasoning service abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Sampling options forwarded to the text-generation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    /// Maximum output tokens (`num_predict` on the wire).
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingOptions {
    /// Create sampling options with the given temperature and token budget.
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            top_p: None,
        }
    }

    /// Set the nucleus-sampling parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// A single non-streaming generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub options: SamplingOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, options: SamplingOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }
}

/// External text-generation oracle.
///
/// Implementations apply their own request timeout and classify failures into
/// [`LlmError`]. They never retry.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Generate text for a prompt.
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;

    /// Identifier of the model used for generation.
    fn model_name(&self) -> &str;

    /// List models installed on the service.
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(vec![self.model_name().to_string()])
    }
}
