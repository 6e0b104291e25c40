//! Scripted reasoning service for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, ReasoningService};

/// Replays canned replies in order and records every request it receives.
///
/// When the script runs out, further calls fail as unreachable.
pub(crate) struct ScriptedReasoning {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedReasoning {
    pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A service that is never reachable.
    pub(crate) fn offline() -> Self {
        Self::new(vec![])
    }

    pub(crate) fn reply(text: &str) -> Result<String, LlmError> {
        Ok(text.to_string())
    }

    pub(crate) fn unreachable() -> Result<String, LlmError> {
        Err(LlmError::Unreachable {
            provider: "scripted".to_string(),
            reason: "connection refused".to_string(),
        })
    }

    pub(crate) fn status(code: u16) -> Result<String, LlmError> {
        Err(LlmError::NonSuccessStatus {
            provider: "scripted".to_string(),
            status: code,
            body: "error".to_string(),
        })
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoning {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unreachable)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
