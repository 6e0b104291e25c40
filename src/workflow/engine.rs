//! Request orchestration: validate, pick the entry point, run the pipeline.

use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::context::ConversationContext;
use crate::error::{Error, InputError};
use crate::llm::ReasoningService;
use crate::safety::Validator;
use crate::tools::{ToolOutput, ToolRegistry};
use crate::workflow::executor::{Execution, WorkflowExecutor};
use crate::workflow::intent::IntentMatcher;
use crate::workflow::plan::{Mode, Plan, StepResult, WorkflowOutcome};
use crate::workflow::planner::PlanRequester;
use crate::workflow::selector::ToolSelector;
use crate::workflow::synthesis::ResultSynthesizer;

/// Response used when no tool fits and no direct answer is available.
pub const NO_TOOL_MESSAGE: &str =
    "I couldn't identify which tool to use. I can help with: arithmetic, weather, text processing.";

/// Response for a plan that ran no tool step.
pub const NO_ACTION_MESSAGE: &str = "No action executed.";

/// The planning → execution → synthesis pipeline.
///
/// Holds only shared, read-only state; one instance serves every request.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    reasoning: Arc<dyn ReasoningService>,
    validator: Validator,
    matcher: IntentMatcher,
    planner: PlanRequester,
    selector: ToolSelector,
    executor: WorkflowExecutor,
    synthesizer: ResultSynthesizer,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        reasoning: Arc<dyn ReasoningService>,
        limits: WorkflowConfig,
    ) -> Self {
        Self {
            validator: Validator::new(),
            matcher: IntentMatcher::new(limits),
            planner: PlanRequester::new(Arc::clone(&reasoning), Arc::clone(&registry)),
            selector: ToolSelector::new(Arc::clone(&reasoning), Arc::clone(&registry)),
            executor: WorkflowExecutor::new(Arc::clone(&registry), limits),
            synthesizer: ResultSynthesizer::new(
                Arc::clone(&reasoning),
                limits.synthesis_block_chars,
            ),
            registry,
            reasoning,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn reasoning(&self) -> &Arc<dyn ReasoningService> {
        &self.reasoning
    }

    /// Handle one request.
    ///
    /// Only invalid input is an error. Every other failure degrades to a
    /// fallback so the caller always gets an outcome. The exchange is
    /// appended to `context`.
    pub async fn handle(
        &self,
        message: &str,
        mode: Mode,
        context: &mut ConversationContext,
    ) -> Result<WorkflowOutcome, InputError> {
        self.validator.validate(message)?;
        let message = message.trim();
        tracing::info!(mode = %mode, "Handling request");

        let outcome = match mode {
            Mode::Heuristic => self.run_heuristic(message).await,
            Mode::Assisted => self.run_assisted(message, context).await,
            Mode::Workflow => self.run_workflow(message, context).await,
        };

        tracing::info!(
            mode = %mode,
            tool_used = outcome.tool_used.as_deref().unwrap_or("none"),
            "Request handled"
        );
        context.record_exchange(message, &outcome.response);
        Ok(outcome)
    }

    /// Run a single tool directly, bypassing planning.
    pub async fn execute_tool(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<ToolOutput, Error> {
        self.executor.invoke(name, params, "").await
    }

    /// Keyword matching only; never contacts the reasoning service unless
    /// the matched plan asks for analysis.
    async fn run_heuristic(&self, text: &str) -> WorkflowOutcome {
        let plan = self.matcher.match_text(text);
        if plan.is_empty() {
            return WorkflowOutcome::message(NO_TOOL_MESSAGE);
        }
        self.run_plan(text, &plan)
            .await
            .unwrap_or_else(|| WorkflowOutcome::message(NO_TOOL_MESSAGE))
    }

    async fn run_assisted(&self, text: &str, context: &ConversationContext) -> WorkflowOutcome {
        let tool = match self.selector.choose(text).await {
            Ok(tool) => tool,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    unreachable = e.is_unavailable(),
                    "Tool selection failed, using keyword matching"
                );
                return self.run_heuristic(text).await;
            }
        };

        let Some(tool) = tool else {
            return self.answer_directly(text, context).await;
        };
        let Some(params) = self.matcher.parameters_for(&tool, text) else {
            tracing::info!(tool = %tool, "No parameters in request, answering directly");
            return self.answer_directly(text, context).await;
        };

        let plan = Plan::single(tool, params, "Selected by the reasoning service");
        self.run_plan(text, &plan)
            .await
            .unwrap_or_else(|| WorkflowOutcome::message(NO_TOOL_MESSAGE))
    }

    async fn run_workflow(&self, text: &str, context: &ConversationContext) -> WorkflowOutcome {
        let plan = match self.planner.request_plan(text).await {
            Ok(plan) => {
                tracing::info!(steps = plan.steps.len(), "Planned workflow");
                plan
            }
            Err(e) => {
                tracing::warn!(error = %e, "Planning failed, using keyword matching");
                self.matcher.match_text(text)
            }
        };
        self.execute_plan(text, &plan, context).await
    }

    /// Execute a plan and produce the final outcome.
    pub async fn execute_plan(
        &self,
        text: &str,
        plan: &Plan,
        context: &ConversationContext,
    ) -> WorkflowOutcome {
        if plan.is_empty() {
            return self.answer_directly(text, context).await;
        }
        match self.run_plan(text, plan).await {
            Some(outcome) => outcome,
            None => self.run_assisted(text, context).await,
        }
    }

    /// `None` when the plan delegated to single-tool selection.
    async fn run_plan(&self, text: &str, plan: &Plan) -> Option<WorkflowOutcome> {
        match self.executor.run(text, plan).await {
            Execution::Delegated => None,
            Execution::Completed {
                results,
                needs_analysis,
            } => Some(self.finish(text, &results, needs_analysis).await),
        }
    }

    async fn finish(
        &self,
        text: &str,
        results: &[StepResult],
        needs_analysis: bool,
    ) -> WorkflowOutcome {
        if needs_analysis {
            return self.synthesizer.synthesize(text, results).await;
        }
        match results.last() {
            Some(last) => WorkflowOutcome::from_step(last),
            None => WorkflowOutcome::message(NO_ACTION_MESSAGE),
        }
    }

    async fn answer_directly(&self, text: &str, context: &ConversationContext) -> WorkflowOutcome {
        match self.selector.direct_response(text, context).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, unreachable = e.is_unavailable(), "Direct answer failed");
                WorkflowOutcome::message(NO_TOOL_MESSAGE)
            }
        }
    }
}
