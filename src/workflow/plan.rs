//! Plans, step results and workflow outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::tools::ToolOutput;

/// Marker action that asks for synthesis over all step results.
pub const ANALYZE: &str = "analyze";
/// Marker action that hands the request to single-tool selection.
pub const SIMPLE: &str = "simple";

/// What a plan step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Invoke a registered tool.
    Tool(String),
    /// Force synthesis; invokes nothing.
    Analyze,
    /// Abandon the plan in favour of single-tool selection.
    Simple,
}

impl StepAction {
    /// Classify a normalized action name.
    pub fn from_name(name: &str) -> Self {
        match name {
            ANALYZE => StepAction::Analyze,
            SIMPLE => StepAction::Simple,
            tool => StepAction::Tool(tool.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepAction::Tool(name) => name,
            StepAction::Analyze => ANALYZE,
            StepAction::Simple => SIMPLE,
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    /// Positive, strictly increasing within a plan.
    pub step: u32,
    pub action: StepAction,
    pub parameters: serde_json::Value,
    /// Advisory only.
    pub description: String,
}

impl PlanStep {
    pub fn new(
        step: u32,
        action: StepAction,
        parameters: serde_json::Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            step,
            action,
            parameters,
            description: description.into(),
        }
    }

    /// A step that runs a tool.
    pub fn tool(
        step: u32,
        name: impl Into<String>,
        parameters: serde_json::Value,
        description: impl Into<String>,
    ) -> Self {
        Self::new(step, StepAction::Tool(name.into()), parameters, description)
    }

    /// A step that marks the plan for synthesis.
    pub fn analyze(step: u32, description: impl Into<String>) -> Self {
        Self::new(
            step,
            StepAction::Analyze,
            serde_json::json!({}),
            description,
        )
    }
}

/// An ordered sequence of steps produced for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub needs_analysis: bool,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>, needs_analysis: bool) -> Self {
        Self {
            steps,
            needs_analysis,
        }
    }

    /// A plan with no steps: no tool was identified.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A plan that runs one tool and surfaces its result directly.
    pub fn single(
        tool: impl Into<String>,
        parameters: serde_json::Value,
        description: impl Into<String>,
    ) -> Self {
        Self::new(vec![PlanStep::tool(1, tool, parameters, description)], false)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether results must go through synthesis: the flag is set or any
    /// step is an `analyze` marker.
    pub fn requires_analysis(&self) -> bool {
        self.needs_analysis
            || self
                .steps
                .iter()
                .any(|s| s.action == StepAction::Analyze)
    }

    /// The first tool step, if any.
    pub fn first_tool_step(&self) -> Option<&PlanStep> {
        self.steps
            .iter()
            .find(|s| matches!(s.action, StepAction::Tool(_)))
    }
}

/// Outcome of one executed step.
///
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: u32,
    pub action: String,
    pub parameters: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Human-readable rendering of `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn success(step: &PlanStep, output: ToolOutput) -> Self {
        Self {
            step: step.step,
            action: step.action.to_string(),
            parameters: step.parameters.clone(),
            result: Some(output.result),
            response: Some(output.summary),
            error: None,
        }
    }

    pub fn failure(step: &PlanStep, error: impl Into<String>) -> Self {
        Self {
            step: step.step,
            action: step.action.to_string(),
            parameters: step.parameters.clone(),
            result: None,
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The caller-facing result of handling one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub tool_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    pub result: serde_json::Value,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_steps: Option<usize>,
}

impl WorkflowOutcome {
    /// An outcome that carries only text.
    pub fn message(response: impl Into<String>) -> Self {
        Self {
            tool_used: None,
            parameters: None,
            result: serde_json::Value::Null,
            response: response.into(),
            workflow_steps: None,
        }
    }

    /// The outcome of a single step surfaced directly.
    pub fn from_step(result: &StepResult) -> Self {
        let response = match (&result.response, &result.error) {
            (Some(text), _) => text.clone(),
            (None, Some(err)) => format!("{} failed: {}", result.action, err),
            (None, None) => String::new(),
        };
        Self {
            tool_used: Some(result.action.clone()),
            parameters: Some(result.parameters.clone()),
            result: match &result.error {
                Some(err) => serde_json::json!({ "error": err }),
                None => result.result.clone().unwrap_or_default(),
            },
            response,
            workflow_steps: None,
        }
    }

    /// A multi-step outcome carrying every step result.
    pub fn workflow(tool_used: &str, results: &[StepResult], response: impl Into<String>) -> Self {
        Self {
            tool_used: Some(tool_used.to_string()),
            parameters: None,
            result: serde_json::to_value(results).unwrap_or_default(),
            response: response.into(),
            workflow_steps: Some(results.len()),
        }
    }
}

/// Entry point into the pipeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Keyword matching only.
    #[default]
    Heuristic,
    /// The reasoning service picks one tool.
    Assisted,
    /// The reasoning service plans a multi-step workflow.
    Workflow,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Heuristic => "heuristic",
            Mode::Assisted => "assisted",
            Mode::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" => Ok(Mode::Heuristic),
            "assisted" => Ok(Mode::Assisted),
            "workflow" => Ok(Mode::Workflow),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_requires_analysis_from_marker_step() {
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "weather", serde_json::json!({}), ""),
                PlanStep::analyze(2, "compare"),
            ],
            false,
        );
        assert!(plan.requires_analysis());
        assert!(!Plan::single("weather", serde_json::json!({}), "").requires_analysis());
    }

    #[test]
    fn test_step_action_round_trips_names() {
        assert_eq!(StepAction::from_name("analyze"), StepAction::Analyze);
        assert_eq!(StepAction::from_name("simple"), StepAction::Simple);
        assert_eq!(
            StepAction::from_name("weather"),
            StepAction::Tool("weather".to_string())
        );
        assert_eq!(
            serde_json::to_value(StepAction::Analyze).unwrap(),
            serde_json::json!("analyze")
        );
    }

    #[test]
    fn test_step_result_serialization_omits_empty_fields() {
        let step = PlanStep::tool(3, "calculator", serde_json::json!({"a": 1}), "");
        let ok = StepResult::success(
            &step,
            ToolOutput::success(serde_json::json!(2.0), "1 add 1 = 2", Duration::ZERO),
        );
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["step"], 3);
        assert!(value.get("error").is_none());

        let failed = StepResult::failure(&step, "boom");
        assert!(!failed.is_success());
        let value = serde_json::to_value(&failed).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"], "boom");
    }

    #[test]
    fn test_outcome_from_failed_step() {
        let step = PlanStep::tool(1, "calculator", serde_json::json!({}), "");
        let outcome = WorkflowOutcome::from_step(&StepResult::failure(&step, "division by zero"));
        assert_eq!(outcome.tool_used.as_deref(), Some("calculator"));
        assert_eq!(outcome.result["error"], "division by zero");
        assert_eq!(outcome.response, "calculator failed: division by zero");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Workflow".parse::<Mode>().unwrap(), Mode::Workflow);
        assert_eq!(Mode::default(), Mode::Heuristic);
        assert!("creative".parse::<Mode>().is_err());
        let mode: Mode = serde_json::from_str("\"assisted\"").unwrap();
        assert_eq!(mode, Mode::Assisted);
    }
}
