//! The planning → execution → synthesis pipeline.
//!
//! [`Orchestrator`] is the entry point. It validates the request, obtains a
//! [`Plan`] (from the reasoning service, or from [`IntentMatcher`] when that
//! fails), runs it with [`WorkflowExecutor`], and folds multi-step results
//! through [`ResultSynthesizer`].

mod engine;
mod executor;
mod intent;
mod plan;
mod planner;
mod selector;
mod synthesis;

pub use engine::{NO_ACTION_MESSAGE, NO_TOOL_MESSAGE, Orchestrator};
pub use executor::{Execution, WorkflowExecutor};
pub use intent::IntentMatcher;
pub use plan::{Mode, Plan, PlanStep, StepAction, StepResult, WorkflowOutcome};
pub use planner::{PlanRequester, extract_json, parse_plan};
pub use selector::ToolSelector;
pub use synthesis::ResultSynthesizer;
