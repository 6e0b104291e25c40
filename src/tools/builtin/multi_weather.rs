//! Weather for several cities at once, for comparisons.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Local;

use crate::tools::builtin::weather;
use crate::tools::extract;
use crate::tools::tool::{ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput};

/// Tool for comparing the weather of multiple cities.
pub struct MultiWeatherTool;

/// Read the `cities` parameter as a list; a bare string counts as one city.
fn cities_param(params: &serde_json::Value) -> Vec<String> {
    match params.get("cities") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .collect(),
        Some(serde_json::Value::String(city)) => vec![city.trim().to_string()],
        _ => Vec::new(),
    }
}

#[async_trait]
impl Tool for MultiWeatherTool {
    fn name(&self) -> &str {
        "multi_weather"
    }

    fn description(&self) -> &str {
        "Weather for MULTIPLE cities (use for comparisons between 2+ cities)."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required(
            "cities",
            ParamKind::TextList,
            "Names of the cities to compare",
        )]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let mut cities = cities_param(&params);
        if cities.is_empty() {
            cities = extract::cities(ctx.message);
        }
        if cities.is_empty() {
            return Err(ToolError::InvalidParameters(
                "no cities given and none recognized in the request".to_string(),
            ));
        }

        let limit = ctx.limits.max_lookup_targets;
        if cities.len() > limit {
            tracing::debug!(
                requested = cities.len(),
                limit,
                "Truncating multi-city weather lookup"
            );
            cities.truncate(limit);
        }

        let mut reports = Vec::with_capacity(cities.len());
        let mut lines = Vec::with_capacity(cities.len());
        for city in &cities {
            if city.is_empty() {
                reports.push(serde_json::json!({
                    "city": city,
                    "error": "empty city name",
                }));
                continue;
            }
            let report = weather::lookup(city);
            lines.push(format!(
                "{}: {}, {}",
                report.city, report.temperature, report.condition
            ));
            reports.push(serde_json::to_value(&report).map_err(|e| {
                ToolError::ExecutionFailed(format!("failed to encode report: {}", e))
            })?);
        }

        Ok(ToolOutput::success(
            serde_json::json!({
                "cities_count": reports.len(),
                "weather_data": reports,
                "timestamp": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            }),
            format!("Weather for {} cities: {}", cities.len(), lines.join("; ")),
            start.elapsed(),
        ))
    }
}
