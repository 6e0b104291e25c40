//! Error types for the orchestration engine.

use std::time::Duration;

use crate::tools::ToolError;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the reasoning service.
///
/// The client never retries; callers pick their own degradation path.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} unreachable: {reason}")]
    Unreachable { provider: String, reason: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    NonSuccessStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse { provider: String, reason: String },
}

impl LlmError {
    /// Whether the service could not be contacted at all (as opposed to
    /// answering with something unusable).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LlmError::Timeout { .. } | LlmError::Unreachable { .. })
    }
}

/// Tool registry errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{name}' is already registered")]
    DuplicateTool { name: String },

    #[error("Unknown tool '{name}'")]
    UnknownTool { name: String },
}

/// Errors raised while planning or running a workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Could not parse plan: {reason}")]
    PlanParse { reason: String },

    #[error("Reasoning service unavailable: {0}")]
    ReasoningServiceUnavailable(#[source] LlmError),

    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// Request validation errors.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message too long: {length} bytes exceeds {max}")]
    TooLong { length: usize, max: usize },

    #[error("Message contains null bytes")]
    NullBytes,
}
