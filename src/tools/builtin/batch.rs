//! Several calculations in one invocation.

use std::time::Instant;

use async_trait::async_trait;

use crate::tools::builtin::{ArithmeticOp, Operation};
use crate::tools::extract;
use crate::tools::tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput, number_param,
    str_param,
};

/// Tool for running multiple calculations at once.
pub struct BatchCalculatorTool;

/// Parse one entry of the `operations` parameter.
///
/// Accepts `{a, b, operation}` objects and `"5 + 3"` style strings.
fn parse_entry(entry: &serde_json::Value) -> Option<Operation> {
    match entry {
        serde_json::Value::Object(_) => {
            let a = number_param(entry, "a")?;
            let b = number_param(entry, "b")?;
            let operation = match str_param(entry, "operation") {
                Some(op) => op.parse().ok()?,
                None => ArithmeticOp::Add,
            };
            Some(Operation::new(a, operation, b))
        }
        serde_json::Value::String(expr) => extract::operations(expr, 1).into_iter().next(),
        _ => None,
    }
}

#[async_trait]
impl Tool for BatchCalculatorTool {
    fn name(&self) -> &str {
        "batch_calculator"
    }

    fn description(&self) -> &str {
        "Run MULTIPLE calculations in one go (e.g. 5+3, 10-2, 8*4)."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::optional(
            "operations",
            ParamKind::OperationList,
            "Calculations to run; read from the request when omitted",
        )]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let limit = ctx.limits.max_batch_operations;

        let mut operations: Vec<Operation> = params
            .get("operations")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_entry).collect())
            .unwrap_or_default();

        // Planners frequently send placeholders like `"operations": "multiple"`.
        if operations.is_empty() {
            operations = extract::operations(ctx.message, limit);
        }
        if operations.is_empty() {
            return Err(ToolError::InvalidParameters(
                "no calculations given and none found in the request".to_string(),
            ));
        }
        if operations.len() > limit {
            tracing::debug!(
                requested = operations.len(),
                limit,
                "Truncating batch calculation"
            );
            operations.truncate(limit);
        }

        let mut lines = Vec::with_capacity(operations.len());
        let calculations: Vec<serde_json::Value> = operations
            .iter()
            .map(|op| match op.evaluate() {
                Ok(result) => {
                    lines.push(format!("{} = {}", op, result));
                    serde_json::json!({ "operation": op.to_string(), "result": result })
                }
                Err(e) => {
                    lines.push(format!("{}: {}", op, e));
                    serde_json::json!({ "operation": op.to_string(), "error": e.to_string() })
                }
            })
            .collect();

        Ok(ToolOutput::success(
            serde_json::json!({
                "calculations": calculations,
                "total_operations": calculations.len(),
            }),
            lines.join("; "),
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_operations() {
        let ctx = ExecutionContext::new("");
        let output = BatchCalculatorTool
            .execute(
                serde_json::json!({
                    "operations": [
                        { "a": 5, "b": 3, "operation": "add" },
                        { "a": 8, "b": 0, "operation": "divide" },
                        "10 - 2"
                    ]
                }),
                &ctx,
            )
            .await
            .unwrap();

        let calcs = &output.result["calculations"];
        assert_eq!(output.result["total_operations"], 3);
        assert_eq!(calcs[0]["result"], 8.0);
        assert!(calcs[1]["error"].as_str().unwrap().contains("division by zero"));
        assert_eq!(calcs[2]["operation"], "10 subtract 2");
    }

    #[tokio::test]
    async fn test_placeholder_falls_back_to_message() {
        let ctx = ExecutionContext::new("calcula 5+3, 10-2 y 8*4");
        let output = BatchCalculatorTool
            .execute(serde_json::json!({ "operations": "multiple" }), &ctx)
            .await
            .unwrap();

        assert_eq!(output.result["total_operations"], 3);
        assert_eq!(output.summary, "5 add 3 = 8; 10 subtract 2 = 8; 8 multiply 4 = 32");
    }

    #[tokio::test]
    async fn test_truncates_to_batch_limit() {
        let ctx = ExecutionContext::new("");
        let ops: Vec<serde_json::Value> = (0..25)
            .map(|i| serde_json::json!({ "a": i, "b": 1, "operation": "add" }))
            .collect();
        let output = BatchCalculatorTool
            .execute(serde_json::json!({ "operations": ops }), &ctx)
            .await
            .unwrap();

        assert_eq!(output.result["total_operations"], 10);
    }

    #[tokio::test]
    async fn test_message_extraction_is_capped_too() {
        let message = (0..30).map(|i| format!("{}+{}", i, i)).collect::<Vec<_>>().join(" ");
        let ctx = ExecutionContext::new(&message);
        let output = BatchCalculatorTool
            .execute(serde_json::json!({}), &ctx)
            .await
            .unwrap();

        assert_eq!(output.result["total_operations"], 10);
    }
}
