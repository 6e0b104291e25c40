//! Folding step results into one answer.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::llm::{GenerationRequest, ReasoningService, SamplingOptions};
use crate::workflow::plan::{StepResult, WorkflowOutcome};

const SYNTHESIS_TEMPERATURE: f32 = 0.7;
const SYNTHESIS_MAX_TOKENS: u32 = 250;

/// `tool_used` when the reasoning service produced the answer.
pub const COMPOSED: &str = "workflow_composition";
/// `tool_used` when synthesis failed and a mechanical summary was used.
pub const BASIC: &str = "workflow_basic";

/// Sends step results back to the reasoning service for one coherent answer.
pub struct ResultSynthesizer {
    reasoning: Arc<dyn ReasoningService>,
    block_chars: usize,
}

impl ResultSynthesizer {
    pub fn new(reasoning: Arc<dyn ReasoningService>, block_chars: usize) -> Self {
        Self {
            reasoning,
            block_chars,
        }
    }

    /// Synthesize an answer. The step results are carried through unchanged
    /// whether or not synthesis succeeds.
    pub async fn synthesize(&self, text: &str, results: &[StepResult]) -> WorkflowOutcome {
        let request = GenerationRequest::new(
            self.build_prompt(text, results),
            SamplingOptions::new(SYNTHESIS_TEMPERATURE, SYNTHESIS_MAX_TOKENS),
        );

        match self.reasoning.generate(request).await {
            Ok(answer) if !answer.trim().is_empty() => {
                tracing::info!(steps = results.len(), "Synthesized workflow results");
                WorkflowOutcome::workflow(COMPOSED, results, answer.trim())
            }
            Ok(_) => {
                tracing::warn!("Synthesis returned an empty answer, using basic summary");
                basic_outcome(results)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Synthesis failed, using basic summary");
                basic_outcome(results)
            }
        }
    }

    /// One block per step, each truncated to the configured width.
    pub fn build_prompt(&self, text: &str, results: &[StepResult]) -> String {
        let mut prompt = format!("The user asked: '{}'\n\nResults obtained:\n", text);
        for result in results {
            let body = match (&result.result, &result.error) {
                (_, Some(err)) => format!("error: {}", err),
                (Some(value), None) => value.to_string(),
                (None, None) => String::new(),
            };
            let _ = write!(
                prompt,
                "\n{}:\n{}\n",
                result.action.to_uppercase(),
                truncate_chars(&body, self.block_chars)
            );
        }
        prompt.push_str(
            "\nINSTRUCTIONS:\n\
             - Analyze ALL of the results above.\n\
             - Write one coherent, useful answer.\n\
             - For weather comparisons, give specific recommendations.\n\
             - For calculations, give totals and a short analysis.\n\
             - Be concise. Use plain prose, not JSON.\n\
             \nAnswer:",
        );
        prompt
    }
}

fn basic_outcome(results: &[StepResult]) -> WorkflowOutcome {
    WorkflowOutcome::workflow(
        BASIC,
        results,
        format!("Executed {} steps. Results attached.", results.len()),
    )
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
