//! Tool trait and types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::WorkflowConfig;
use crate::workflow::StepResult;

/// Error type for tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Output from a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The structured result.
    pub result: serde_json::Value,
    /// Human-readable rendering of the result.
    pub summary: String,
    /// Time taken.
    #[serde(skip)]
    pub duration: Duration,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(
        result: serde_json::Value,
        summary: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            result,
            summary: summary.into(),
            duration,
        }
    }
}

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    Text,
    TextList,
    /// A list of `{a, b, operation}` objects.
    OperationList,
    /// Any JSON value.
    Data,
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
}

impl ParamKind {
    fn json_schema(&self) -> serde_json::Value {
        match self {
            ParamKind::Number => serde_json::json!({ "type": "number" }),
            ParamKind::Text => serde_json::json!({ "type": "string" }),
            ParamKind::TextList => serde_json::json!({
                "type": "array",
                "items": { "type": "string" }
            }),
            ParamKind::OperationList => serde_json::json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "a": { "type": "number" },
                        "b": { "type": "number" },
                        "operation": {
                            "type": "string",
                            "enum": ["add", "subtract", "multiply", "divide"]
                        }
                    },
                    "required": ["a", "b", "operation"]
                }
            }),
            ParamKind::Data => serde_json::json!({}),
            ParamKind::Choice(values) => serde_json::json!({
                "type": "string",
                "enum": values
            }),
        }
    }

    fn prompt_label(&self) -> String {
        match self {
            ParamKind::Number => "number".to_string(),
            ParamKind::Text => "text".to_string(),
            ParamKind::TextList => "list of text".to_string(),
            ParamKind::OperationList => "list of {a, b, operation}".to_string(),
            ParamKind::Data => "any".to_string(),
            ParamKind::Choice(values) => values.join("|"),
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

impl ParameterSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }
}

/// Everything a tool may consult besides its own parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    /// The original user request. Tools scan it when parameters are missing.
    pub message: &'a str,
    /// Results of the steps that ran before this one.
    pub previous: &'a [StepResult],
    /// Invocation caps for bulk tools.
    pub limits: WorkflowConfig,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            previous: &[],
            limits: WorkflowConfig::default(),
        }
    }

    pub fn with_previous(mut self, previous: &'a [StepResult]) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_limits(mut self, limits: WorkflowConfig) -> Self {
        self.limits = limits;
        self
    }
}

/// Description of a registered tool, used for prompts and listings.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    /// JSON Schema for the tool's parameters.
    pub fn json_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| {
                let mut schema = p.kind.json_schema();
                if let Some(obj) = schema.as_object_mut() {
                    obj.insert("description".to_string(), p.description.into());
                }
                (p.name.to_string(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// One-line rendering for planning prompts, e.g.
    /// `calculator(operation: add|subtract, a: number, b: number)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind.prompt_label()))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// A deterministic capability the engine can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get a one-line description of what the tool does.
    fn description(&self) -> &str;

    /// Declared parameters, in prompt order.
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError>;

    /// Describe the tool for prompts and listings.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Read a numeric parameter, accepting numbers or numeric strings.
pub(crate) fn number_param(params: &serde_json::Value, key: &str) -> Option<f64> {
    match params.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a non-empty string parameter.
pub(crate) fn str_param<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "calculator".to_string(),
            description: "Basic arithmetic".to_string(),
            parameters: vec![
                ParameterSpec::required(
                    "operation",
                    ParamKind::Choice(&["add", "subtract"]),
                    "Operation",
                ),
                ParameterSpec::required("a", ParamKind::Number, "First operand"),
                ParameterSpec::optional("b", ParamKind::Number, "Second operand"),
            ],
        }
    }

    #[test]
    fn test_signature_keeps_parameter_order() {
        assert_eq!(
            descriptor().signature(),
            "calculator(operation: add|subtract, a: number, b: number)"
        );
    }

    #[test]
    fn test_json_schema() {
        let schema = descriptor().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["a"]["type"], "number");
        assert_eq!(
            schema["properties"]["operation"]["enum"],
            serde_json::json!(["add", "subtract"])
        );
        assert_eq!(schema["required"], serde_json::json!(["operation", "a"]));
    }

    #[test]
    fn test_number_param_accepts_strings() {
        let params = serde_json::json!({ "a": 5, "b": " 3.5 ", "c": true });
        assert_eq!(number_param(&params, "a"), Some(5.0));
        assert_eq!(number_param(&params, "b"), Some(3.5));
        assert_eq!(number_param(&params, "c"), None);
        assert_eq!(number_param(&params, "missing"), None);
    }
}
