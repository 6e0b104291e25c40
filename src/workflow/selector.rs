//! Reasoning-assisted single-tool selection and direct answers.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::context::ConversationContext;
use crate::error::LlmError;
use crate::llm::{GenerationRequest, ReasoningService, SamplingOptions};
use crate::tools::ToolRegistry;
use crate::workflow::plan::WorkflowOutcome;

const SELECT_TEMPERATURE: f32 = 0.3;
const SELECT_TOP_P: f32 = 0.9;
const SELECT_MAX_TOKENS: u32 = 20;

const DIRECT_TEMPERATURE: f32 = 0.7;
const DIRECT_MAX_TOKENS: u32 = 100;

/// `tool_used` for answers produced without any tool.
pub const DIRECT: &str = "direct_llm";

/// Asks the reasoning service which single tool fits a request.
pub struct ToolSelector {
    reasoning: Arc<dyn ReasoningService>,
    registry: Arc<ToolRegistry>,
}

impl ToolSelector {
    pub fn new(reasoning: Arc<dyn ReasoningService>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            reasoning,
            registry,
        }
    }

    /// Ask for a tool. `Ok(None)` means the oracle answered but named no
    /// registered tool.
    pub async fn choose(&self, text: &str) -> Result<Option<String>, LlmError> {
        let request = GenerationRequest::new(
            self.build_prompt(text),
            SamplingOptions::new(SELECT_TEMPERATURE, SELECT_MAX_TOKENS).with_top_p(SELECT_TOP_P),
        );
        let reply = self.reasoning.generate(request).await?;
        let choice = self.match_reply(&reply);
        tracing::info!(reply = %reply.trim(), choice = ?choice, "Reasoning service picked a tool");
        Ok(choice)
    }

    /// Find the registered tool named in a free-form reply. Longer names are
    /// tried first so `multi_weather` wins over `weather`.
    pub fn match_reply(&self, reply: &str) -> Option<String> {
        let reply = reply.trim().to_lowercase();
        let mut names: Vec<&str> = self.registry.names().collect();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        names
            .into_iter()
            .find(|name| reply.contains(name))
            .map(str::to_string)
    }

    pub fn build_prompt(&self, text: &str) -> String {
        let mut prompt = String::from(
            "You decide which tool to use for the user's request.\n\nAVAILABLE TOOLS:\n",
        );
        for tool in self.registry.describe_all() {
            let _ = writeln!(prompt, "- {}: {}", tool.name, tool.description);
        }
        let _ = write!(
            prompt,
            "\nINSTRUCTIONS:\n\
             - Answer ONLY with the tool name.\n\
             - If no tool is needed, answer \"none\".\n\
             - Examples:\n  \
             * \"¿Cuánto es 5+3?\" -> calculator\n  \
             * \"Clima en Madrid\" -> weather\n  \
             * \"Convierte a mayúsculas\" -> text_processor\n  \
             * \"¿Quién es Shakespeare?\" -> none\n\
             \nUser: {}\nTool:",
            text
        );
        prompt
    }

    /// Answer conversationally without any tool, using the caller's history.
    pub async fn direct_response(
        &self,
        text: &str,
        context: &ConversationContext,
    ) -> Result<WorkflowOutcome, LlmError> {
        let prompt = format!(
            "You are a friendly assistant. Answer concisely.\n\n{}User: {}\nAssistant:",
            context.render(),
            text
        );
        let request = GenerationRequest::new(
            prompt,
            SamplingOptions::new(DIRECT_TEMPERATURE, DIRECT_MAX_TOKENS),
        );

        let answer = self.reasoning.generate(request).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(LlmError::MalformedResponse {
                provider: self.reasoning.model_name().to_string(),
                reason: "empty answer".to_string(),
            });
        }
        Ok(WorkflowOutcome {
            tool_used: Some(DIRECT.to_string()),
            parameters: None,
            result: serde_json::Value::String(answer.to_string()),
            response: answer.to_string(),
            workflow_steps: None,
        })
    }
}
