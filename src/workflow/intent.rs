//! Keyword-based intent matching.
//!
//! Used directly in heuristic mode, and as the mandatory fallback whenever the
//! reasoning service is unavailable or answers with something unusable.

use crate::config::WorkflowConfig;
use crate::tools::builtin::ArithmeticOp;
use crate::tools::extract;
use crate::workflow::plan::{Plan, PlanStep};

/// Request categories, each mapping to a canned plan shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    BatchArithmetic,
    Arithmetic,
    WeatherComparison,
    Weather,
    Text,
}

/// The decision table, highest priority first. The first match wins.
const PRIORITY: &[Intent] = &[
    Intent::BatchArithmetic,
    Intent::Arithmetic,
    Intent::WeatherComparison,
    Intent::Weather,
    Intent::Text,
];

/// Batch arithmetic needs at least this many integer literals.
const BATCH_MIN_INTEGERS: usize = 4;

/// Lower-cased message and the scans shared by every rule.
struct Scan<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    fn has(&self, keywords: &[&str]) -> bool {
        extract::contains_any(&self.lower, keywords)
    }
}

impl Intent {
    fn matches(self, scan: &Scan<'_>) -> bool {
        match self {
            Intent::BatchArithmetic => {
                scan.has(extract::BATCH_KEYWORDS)
                    && extract::integers(scan.text).len() >= BATCH_MIN_INTEGERS
            }
            Intent::Arithmetic => {
                extract::mentions_arithmetic(scan.text)
                    && extract::operand_pair(scan.text).is_some()
            }
            Intent::WeatherComparison => {
                scan.has(extract::COMPARISON_KEYWORDS)
                    && scan.has(extract::WEATHER_KEYWORDS)
                    && extract::cities(scan.text).len() >= 2
            }
            Intent::Weather => scan.has(extract::WEATHER_KEYWORDS),
            Intent::Text => scan.has(extract::TEXT_KEYWORDS),
        }
    }
}

/// Maps raw request text to a plan with an explicit, ordered decision table.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentMatcher {
    limits: WorkflowConfig,
}

impl IntentMatcher {
    pub fn new(limits: WorkflowConfig) -> Self {
        Self { limits }
    }

    /// Build a plan for the text. An empty plan means no tool was identified.
    pub fn match_text(&self, text: &str) -> Plan {
        let scan = Scan::new(text);
        let Some(intent) = PRIORITY.iter().copied().find(|i| i.matches(&scan)) else {
            tracing::debug!("No intent matched");
            return Plan::empty();
        };
        tracing::debug!(intent = ?intent, "Matched intent");

        match intent {
            Intent::BatchArithmetic => self.with_analysis(
                "batch_calculator",
                text,
                "Run the calculations in the request",
                "Total and analyze the results",
            ),
            Intent::WeatherComparison => self.with_analysis(
                "multi_weather",
                text,
                "Get the weather for every city mentioned",
                "Compare the cities and recommend one",
            ),
            Intent::Arithmetic => self.single("calculator", text, "Calculate"),
            Intent::Weather => self.single("weather", text, "Look up the weather"),
            Intent::Text => self.single("text_processor", text, "Transform the text"),
        }
    }

    /// Extract parameters for a named tool from the text.
    ///
    /// Returns `None` when the text does not carry enough to invoke the tool.
    pub fn parameters_for(&self, tool: &str, text: &str) -> Option<serde_json::Value> {
        match tool {
            "calculator" => {
                let (a, b) = extract::operand_pair(text)?;
                let operation =
                    extract::arithmetic_operation(text).unwrap_or(ArithmeticOp::Add);
                Some(serde_json::json!({
                    "operation": operation.as_str(),
                    "a": a,
                    "b": b,
                }))
            }
            "weather" => Some(serde_json::json!({ "city": extract::city(text) })),
            "text_processor" => Some(serde_json::json!({
                "text": extract::text_operand(text),
                "operation": extract::text_operation(text).as_str(),
            })),
            "multi_weather" => {
                let mut cities = extract::cities(text);
                if cities.is_empty() {
                    return None;
                }
                cities.truncate(self.limits.max_lookup_targets);
                Some(serde_json::json!({ "cities": cities }))
            }
            "batch_calculator" => {
                let operations: Vec<serde_json::Value> =
                    extract::operations(text, self.limits.max_batch_operations)
                        .iter()
                        .map(|op| {
                            serde_json::json!({
                                "a": op.a,
                                "b": op.b,
                                "operation": op.operation.as_str(),
                            })
                        })
                        .collect();
                if operations.is_empty() {
                    return None;
                }
                Some(serde_json::json!({ "operations": operations }))
            }
            _ => None,
        }
    }

    fn single(&self, tool: &str, text: &str, description: &str) -> Plan {
        let params = self
            .parameters_for(tool, text)
            .unwrap_or_else(|| serde_json::json!({}));
        Plan::single(tool, params, description)
    }

    fn with_analysis(&self, tool: &str, text: &str, description: &str, analysis: &str) -> Plan {
        let params = self
            .parameters_for(tool, text)
            .unwrap_or_else(|| serde_json::json!({}));
        Plan::new(
            vec![
                PlanStep::tool(1, tool, params, description),
                PlanStep::analyze(2, analysis),
            ],
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::workflow::plan::StepAction;

    fn tool_of(plan: &Plan) -> Option<&str> {
        plan.first_tool_step().map(|s| s.action.as_str())
    }

    #[test]
    fn test_simple_addition() {
        let plan = IntentMatcher::default().match_text("¿Cuánto es 5 + 3?");
        assert_eq!(plan.steps.len(), 1);
        assert!(!plan.needs_analysis);

        let step = &plan.steps[0];
        assert_eq!(step.action, StepAction::Tool("calculator".to_string()));
        assert_eq!(
            step.parameters,
            serde_json::json!({ "operation": "add", "a": 5.0, "b": 3.0 })
        );
    }

    #[test]
    fn test_operator_follows_keyword_class() {
        let matcher = IntentMatcher::default();
        let cases = [
            ("resta 4 de 10", "subtract"),
            ("multiplica 3 por 4", "multiply"),
            ("divide 12 entre 4", "divide"),
            ("what is 7 times 6", "multiply"),
            ("multiplica -3 por 4", "multiply"),
            ("divide -8 entre 2", "divide"),
            ("divide 20 entre 5 por favor", "divide"),
        ];
        for (text, expected) in cases {
            let plan = matcher.match_text(text);
            assert_eq!(plan.steps[0].parameters["operation"], expected, "{}", text);
        }
        let plan = matcher.match_text("multiplica -3 por 4");
        assert_eq!(plan.steps[0].parameters["a"], -3.0);
        assert_eq!(plan.steps[0].parameters["b"], 4.0);

        // Operands keep discovery order regardless of the phrasing.
        let plan = matcher.match_text("resta 4 de 10");
        assert_eq!(plan.steps[0].parameters["a"], 4.0);
        assert_eq!(plan.steps[0].parameters["b"], 10.0);
    }

    #[test]
    fn test_one_number_does_not_trigger_arithmetic() {
        let matcher = IntentMatcher::default();
        assert!(matcher.match_text("suma 3").is_empty());
        // Falls through to the next matching category instead.
        let plan = matcher.match_text("dame el clima más 1");
        assert_eq!(tool_of(&plan), Some("weather"));
    }

    #[test]
    fn test_keywords_inside_other_words_do_not_route() {
        let plan = IntentMatcher::default().match_text(r#"voltear "resolver""#);
        assert_eq!(tool_of(&plan), Some("text_processor"));
        assert_eq!(plan.steps[0].parameters["text"], "resolver");
        assert_eq!(plan.steps[0].parameters["operation"], "reverse");
    }

    #[test]
    fn test_batch_takes_priority_over_arithmetic() {
        let plan = IntentMatcher::default().match_text("calcula 5+3, 10-2 y 8*4");
        assert_eq!(tool_of(&plan), Some("batch_calculator"));
        assert!(plan.needs_analysis);
        assert_eq!(plan.steps[1].action, StepAction::Analyze);
        assert_eq!(
            plan.steps[0].parameters["operations"]
                .as_array()
                .map(|ops| ops.len()),
            Some(3)
        );
    }

    #[test]
    fn test_weather_comparison() {
        let plan = IntentMatcher::default().match_text("compara el clima de Madrid vs Barcelona");
        assert_eq!(tool_of(&plan), Some("multi_weather"));
        assert!(plan.needs_analysis);
        assert_eq!(
            plan.steps[0].parameters,
            serde_json::json!({ "cities": ["Madrid", "Barcelona"] })
        );
    }

    #[test]
    fn test_comparison_with_one_city_is_plain_weather() {
        let plan = IntentMatcher::default().match_text("compara el clima de Tokyo");
        assert_eq!(tool_of(&plan), Some("weather"));
        assert_eq!(plan.steps[0].parameters["city"], "Tokyo");
    }

    #[test]
    fn test_weather_defaults_to_madrid() {
        let plan = IntentMatcher::default().match_text("¿Qué tiempo hace?");
        assert_eq!(plan.steps[0].parameters["city"], "Madrid");
    }

    #[test]
    fn test_text_prefers_quoted_operand() {
        let plan = IntentMatcher::default()
            .match_text("convierte a mayúsculas \"hola mundo\" por favor");
        assert_eq!(tool_of(&plan), Some("text_processor"));
        assert_eq!(
            plan.steps[0].parameters,
            serde_json::json!({ "text": "hola mundo", "operation": "uppercase" })
        );
    }

    #[test]
    fn test_nothing_matches() {
        assert!(IntentMatcher::default().match_text("¿Quién es Shakespeare?").is_empty());
    }

    #[test]
    fn test_parameters_for_unknown_tool() {
        let matcher = IntentMatcher::default();
        assert_eq!(matcher.parameters_for("data_summary", "anything"), None);
        assert_eq!(matcher.parameters_for("calculator", "suma uno y dos"), None);
    }
}
