//! Plan requests to the reasoning service, and the plan parser.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::WorkflowError;
use crate::llm::{GenerationRequest, ReasoningService, SamplingOptions};
use crate::tools::ToolRegistry;
use crate::workflow::plan::{ANALYZE, Plan, PlanStep, SIMPLE, StepAction};

const PLAN_TEMPERATURE: f32 = 0.3;
const PLAN_MAX_TOKENS: u32 = 200;

/// Asks the reasoning service for a multi-step plan.
pub struct PlanRequester {
    reasoning: Arc<dyn ReasoningService>,
    registry: Arc<ToolRegistry>,
}

impl PlanRequester {
    pub fn new(reasoning: Arc<dyn ReasoningService>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            reasoning,
            registry,
        }
    }

    /// Request and validate a plan for `text`.
    ///
    /// Any failure here is recoverable: callers fall back to the intent
    /// matcher.
    pub async fn request_plan(&self, text: &str) -> Result<Plan, WorkflowError> {
        let request = GenerationRequest::new(
            self.build_prompt(text),
            SamplingOptions::new(PLAN_TEMPERATURE, PLAN_MAX_TOKENS),
        );

        let raw = self
            .reasoning
            .generate(request)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, unreachable = e.is_unavailable(), "Plan request failed");
                WorkflowError::ReasoningServiceUnavailable(e)
            })?;
        tracing::debug!(raw = %raw, "Plan response");

        parse_plan(&raw, &self.registry)
    }

    /// Build the planning prompt: every registered tool with its parameters,
    /// followed by the output format.
    pub fn build_prompt(&self, text: &str) -> String {
        let mut prompt = String::from(
            "You are a task planner. Break the user's request into steps that use the tools below.\n\nAVAILABLE TOOLS:\n",
        );
        for tool in self.registry.describe_all() {
            let _ = writeln!(prompt, "- {}: {}", tool.signature(), tool.description);
        }
        let _ = write!(
            prompt,
            r#"
INSTRUCTIONS:
- For the weather of 2 or more cities, use multi_weather.
- For several calculations, use batch_calculator.
- To compare or analyze results, add an "{analyze}" step after the tool steps.
- If one tool is enough, a single step is fine. Use "{simple}" only when no plan is needed.
- Reply with ONE JSON object and nothing else, in this format:

{{"workflow": [
  {{"step": 1, "action": "tool_name", "params": {{"param": "value"}}, "description": "what it does"}},
  {{"step": 2, "action": "{analyze}", "description": "analyze the results of step 1"}}
], "needs_analysis": true}}

User: {text}
Plan:"#,
            analyze = ANALYZE,
            simple = SIMPLE,
            text = text,
        );
        prompt
    }
}

/// Locate the JSON object in free-form oracle output: everything from the
/// first `{` to the last `}`.
pub fn extract_json(raw: &str) -> Result<&str, WorkflowError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(WorkflowError::PlanParse {
            reason: "no JSON object in response".to_string(),
        }),
    }
}

fn plan_error(reason: impl Into<String>) -> WorkflowError {
    WorkflowError::PlanParse {
        reason: reason.into(),
    }
}

/// Parse and validate oracle output into a [`Plan`].
///
/// Every action must be `analyze`, `simple` or a registered tool. Step
/// indices must be positive and increasing; a missing index becomes the
/// previous one plus one.
pub fn parse_plan(raw: &str, registry: &ToolRegistry) -> Result<Plan, WorkflowError> {
    let json = extract_json(raw)?;
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| plan_error(format!("invalid JSON: {}", e)))?;

    let entries = value
        .get("workflow")
        .ok_or_else(|| plan_error("missing 'workflow'"))?
        .as_array()
        .ok_or_else(|| plan_error("'workflow' is not a list"))?;
    if entries.is_empty() {
        return Err(plan_error("'workflow' is empty"));
    }

    let mut steps = Vec::with_capacity(entries.len());
    let mut previous = 0u32;
    for (i, entry) in entries.iter().enumerate() {
        let action = entry
            .get("action")
            .and_then(|a| a.as_str())
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| plan_error(format!("entry {} has no action", i + 1)))?;

        let action = StepAction::from_name(&action);
        if let StepAction::Tool(name) = &action
            && !registry.contains(name)
        {
            return Err(plan_error(format!("unknown tool '{}'", name)));
        }

        let step = match entry.get("step") {
            None | Some(serde_json::Value::Null) => previous + 1,
            Some(index) => index
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| plan_error(format!("invalid step index {}", index)))?,
        };
        if step <= previous {
            return Err(plan_error(format!(
                "step index {} does not follow {}",
                step, previous
            )));
        }
        previous = step;

        let parameters = entry
            .get("params")
            .or_else(|| entry.get("parameters"))
            .filter(|p| p.is_object())
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        let description = entry
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default();

        steps.push(PlanStep::new(step, action, parameters, description));
    }

    let needs_analysis = value
        .get("needs_analysis")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(Plan::new(steps, needs_analysis))
}
