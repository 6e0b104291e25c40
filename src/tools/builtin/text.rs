//! Text processing tool.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tools::extract;
use crate::tools::tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput, str_param,
};

/// Supported text transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    Uppercase,
    Lowercase,
    Reverse,
    CountWords,
    CountChars,
}

impl TextOp {
    pub const NAMES: &'static [&'static str] = &[
        "uppercase",
        "lowercase",
        "reverse",
        "count_words",
        "count_chars",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextOp::Uppercase => "uppercase",
            TextOp::Lowercase => "lowercase",
            TextOp::Reverse => "reverse",
            TextOp::CountWords => "count_words",
            TextOp::CountChars => "count_chars",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TextOp::Uppercase => text.to_uppercase(),
            TextOp::Lowercase => text.to_lowercase(),
            TextOp::Reverse => text.chars().rev().collect(),
            TextOp::CountWords => format!("{} words", text.split_whitespace().count()),
            TextOp::CountChars => format!("{} characters", text.chars().count()),
        }
    }
}

impl fmt::Display for TextOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextOp {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uppercase" => Ok(TextOp::Uppercase),
            "lowercase" => Ok(TextOp::Lowercase),
            "reverse" => Ok(TextOp::Reverse),
            "count_words" => Ok(TextOp::CountWords),
            "count_chars" => Ok(TextOp::CountChars),
            other => Err(ToolError::InvalidParameters(format!(
                "unsupported operation: {}",
                other
            ))),
        }
    }
}

/// Tool for simple text transformations.
pub struct TextProcessorTool;

#[async_trait]
impl Tool for TextProcessorTool {
    fn name(&self) -> &str {
        "text_processor"
    }

    fn description(&self) -> &str {
        "Transform text: uppercase, lowercase, reverse, count words or characters."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("text", ParamKind::Text, "Text to process"),
            ParameterSpec::required(
                "operation",
                ParamKind::Choice(TextOp::NAMES),
                "The transformation to apply",
            ),
        ]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let text = match params.get("text").and_then(|v| v.as_str()) {
            Some(text) => text.to_string(),
            None => extract::text_operand(ctx.message),
        };
        let operation = match str_param(&params, "operation") {
            Some(op) => op.parse()?,
            None => extract::text_operation(ctx.message),
        };

        let result = operation.apply(&text);

        Ok(ToolOutput::success(
            serde_json::json!({
                "original": text,
                "result": result,
                "operation": operation.as_str(),
            }),
            format!("Processed text: {}", result),
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_ops() {
        assert_eq!(TextOp::Uppercase.apply("hola"), "HOLA");
        assert_eq!(TextOp::Lowercase.apply("HoLa"), "hola");
        assert_eq!(TextOp::Reverse.apply("ñandú"), "údnañ");
        assert_eq!(TextOp::CountWords.apply("uno dos  tres"), "3 words");
        assert_eq!(TextOp::CountChars.apply("año"), "3 characters");
    }

    #[tokio::test]
    async fn test_falls_back_to_quoted_text_in_message() {
        let ctx = ExecutionContext::new(r#"convierte "hola mundo" a mayúsculas"#);
        let output = TextProcessorTool
            .execute(serde_json::json!({}), &ctx)
            .await
            .unwrap();

        assert_eq!(output.result["result"], "HOLA MUNDO");
        assert_eq!(output.result["operation"], "uppercase");
    }
}
