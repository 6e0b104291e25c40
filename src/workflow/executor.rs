//! Step-by-step plan execution.

use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::error::{Error, WorkflowError};
use crate::tools::{ExecutionContext, ToolOutput, ToolRegistry};
use crate::workflow::plan::{Plan, StepAction, StepResult};

/// What running a plan produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Every step was visited.
    Completed {
        results: Vec<StepResult>,
        needs_analysis: bool,
    },
    /// A `simple` step handed the request over to single-tool selection.
    /// Steps before it are discarded.
    Delegated,
}

/// Walks a plan in order, invoking tools through the registry.
pub struct WorkflowExecutor {
    registry: Arc<ToolRegistry>,
    limits: WorkflowConfig,
}

impl WorkflowExecutor {
    pub fn new(registry: Arc<ToolRegistry>, limits: WorkflowConfig) -> Self {
        Self { registry, limits }
    }

    /// Run every step of `plan`.
    ///
    /// A failing step is recorded and never stops the steps after it.
    pub async fn run(&self, text: &str, plan: &Plan) -> Execution {
        let mut results: Vec<StepResult> = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            let name = match &step.action {
                StepAction::Simple => {
                    tracing::info!(step = step.step, "Plan delegates to single-tool selection");
                    return Execution::Delegated;
                }
                StepAction::Analyze => continue,
                StepAction::Tool(name) => name,
            };

            tracing::info!(step = step.step, tool = %name, "Executing step");
            let ctx = ExecutionContext::new(text)
                .with_previous(&results)
                .with_limits(self.limits);
            let outcome = self.invoke_in(name, step.parameters.clone(), &ctx).await;

            let result = match outcome {
                Ok(output) => {
                    tracing::debug!(
                        step = step.step,
                        tool = %name,
                        duration_ms = output.duration.as_millis() as u64,
                        "Step completed"
                    );
                    StepResult::success(step, output)
                }
                Err(e) => {
                    tracing::warn!(step = step.step, tool = %name, error = %e, "Step failed");
                    StepResult::failure(step, e.to_string())
                }
            };
            results.push(result);
        }

        Execution::Completed {
            results,
            needs_analysis: plan.requires_analysis(),
        }
    }

    /// Invoke one tool outside of any plan.
    pub async fn invoke(
        &self,
        name: &str,
        params: serde_json::Value,
        text: &str,
    ) -> Result<ToolOutput, Error> {
        let ctx = ExecutionContext::new(text).with_limits(self.limits);
        self.invoke_in(name, params, &ctx).await
    }

    async fn invoke_in(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, Error> {
        let tool = self.registry.lookup(name)?;
        tool.execute(params, ctx).await.map_err(|source| {
            WorkflowError::ToolExecution {
                tool: name.to_string(),
                source,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::RegistryError;
    use crate::workflow::plan::PlanStep;

    fn executor() -> WorkflowExecutor {
        WorkflowExecutor::new(
            Arc::new(ToolRegistry::with_builtins().unwrap()),
            WorkflowConfig::default(),
        )
    }

    fn completed(execution: Execution) -> (Vec<StepResult>, bool) {
        match execution {
            Execution::Completed {
                results,
                needs_analysis,
            } => (results, needs_analysis),
            Execution::Delegated => panic!("plan was delegated"),
        }
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort_plan() {
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "calculator", serde_json::json!({"operation": "divide", "a": 1, "b": 0}), ""),
                PlanStep::tool(2, "not_a_tool", serde_json::json!({}), ""),
                PlanStep::tool(3, "weather", serde_json::json!({"city": "Madrid"}), ""),
            ],
            false,
        );

        let (results, needs_analysis) = completed(executor().run("", &plan).await);
        assert!(!needs_analysis);
        assert_eq!(results.len(), 3);
        assert!(results[0].error.as_deref().unwrap().contains("division by zero"));
        assert!(results[1].error.as_deref().unwrap().contains("Unknown tool"));
        assert!(results[2].is_success());
        assert_eq!(results[2].result.as_ref().unwrap()["temperature"], "22°C");
    }

    #[tokio::test]
    async fn test_analyze_step_forces_analysis_without_result() {
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "multi_weather", serde_json::json!({"cities": ["Madrid", "Barcelona"]}), ""),
                PlanStep::analyze(2, "compare"),
            ],
            false,
        );

        let (results, needs_analysis) = completed(executor().run("", &plan).await);
        assert!(needs_analysis);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].action, "multi_weather");
    }

    #[tokio::test]
    async fn test_later_steps_see_earlier_results() {
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "batch_calculator", serde_json::json!({"operations": "multiple"}), ""),
                PlanStep::tool(2, "data_summary", serde_json::json!({}), ""),
            ],
            false,
        );

        let (results, _) = completed(executor().run("calcula 5+3, 10-2 y 8*4", &plan).await);
        let summary = results[1].result.as_ref().unwrap();
        assert_eq!(summary["summary_type"], "calculations");
        assert_eq!(summary["total_sum"], 48.0);
    }

    #[tokio::test]
    async fn test_simple_step_delegates() {
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "weather", serde_json::json!({}), ""),
                PlanStep::new(2, StepAction::Simple, serde_json::json!({}), ""),
            ],
            false,
        );
        assert_eq!(executor().run("", &plan).await, Execution::Delegated);
    }

    #[tokio::test]
    async fn test_caps_apply_to_planned_steps() {
        let cities: Vec<String> = (0..9).map(|i| format!("City {}", i)).collect();
        let ops: Vec<serde_json::Value> = (0..14)
            .map(|i| serde_json::json!({"a": i, "b": 2, "operation": "multiply"}))
            .collect();
        let plan = Plan::new(
            vec![
                PlanStep::tool(1, "multi_weather", serde_json::json!({"cities": cities}), ""),
                PlanStep::tool(2, "batch_calculator", serde_json::json!({"operations": ops}), ""),
            ],
            true,
        );

        let (results, _) = completed(executor().run("", &plan).await);
        assert_eq!(results[0].result.as_ref().unwrap()["cities_count"], 5);
        assert_eq!(results[1].result.as_ref().unwrap()["total_operations"], 10);
    }

    #[tokio::test]
    async fn test_invoke_classifies_errors() {
        let executor = executor();

        let err = executor
            .invoke("nope", serde_json::json!({}), "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Registry(RegistryError::UnknownTool { .. })));

        let err = executor
            .invoke("calculator", serde_json::json!({"operation": "modulo", "a": 1, "b": 2}), "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Workflow(WorkflowError::ToolExecution { .. })));

        let output = executor
            .invoke("text_processor", serde_json::json!({"text": "abc", "operation": "reverse"}), "")
            .await
            .unwrap();
        assert_eq!(output.result["result"], "cba");
    }
}
