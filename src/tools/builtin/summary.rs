//! Summaries over results produced by earlier workflow steps.

use std::time::Instant;

use async_trait::async_trait;

use crate::tools::tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput, str_param,
};

const WEATHER_COMPARISON: &str = "weather_comparison";
const CALCULATIONS: &str = "calculations";

/// Tool for summarizing weather comparisons and calculation batches.
pub struct DataSummaryTool;

/// Find the most recent prior result this tool knows how to summarize.
fn previous_data(ctx: &ExecutionContext<'_>, wanted: Option<&str>) -> Option<(String, serde_json::Value)> {
    ctx.previous.iter().rev().find_map(|step| {
        let result = step.result.as_ref()?;
        let candidate = if let Some(data) = result.get("weather_data") {
            (WEATHER_COMPARISON, data)
        } else if let Some(data) = result.get("calculations") {
            (CALCULATIONS, data)
        } else {
            return None;
        };
        match wanted {
            Some(kind) if kind != candidate.0 => None,
            _ => Some((candidate.0.to_string(), candidate.1.clone())),
        }
    })
}

/// Weather entries may arrive as a list of reports or as a `city -> report` map.
fn weather_entries(data: &serde_json::Value) -> Vec<(String, &serde_json::Value)> {
    match data {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|r| {
                let city = r.get("city").and_then(|c| c.as_str()).unwrap_or_default();
                (city.to_string(), r)
            })
            .collect(),
        serde_json::Value::Object(map) => map.iter().map(|(city, r)| (city.clone(), r)).collect(),
        _ => Vec::new(),
    }
}

fn temperature_of(report: &serde_json::Value) -> Option<f64> {
    if let Some(t) = report.get("temperature_c").and_then(|t| t.as_f64()) {
        return Some(t);
    }
    report
        .get("temperature")
        .and_then(|t| t.as_str())
        .and_then(|t| t.trim().trim_end_matches("°C").trim().parse().ok())
}

fn summarize_weather(data: &serde_json::Value) -> Result<(serde_json::Value, String), ToolError> {
    let mut cities = Vec::new();
    let mut temps = Vec::new();
    let mut conditions = Vec::new();

    for (city, report) in weather_entries(data) {
        if report.get("error").is_some() {
            continue;
        }
        let Some(temp) = temperature_of(report) else {
            continue;
        };
        cities.push(city);
        temps.push(temp);
        conditions.push(
            report
                .get("condition")
                .and_then(|c| c.as_str())
                .unwrap_or("Unknown")
                .to_string(),
        );
    }

    if temps.is_empty() {
        return Err(ToolError::InvalidParameters(
            "no usable weather readings to summarize".to_string(),
        ));
    }

    let (mut warmest, mut coolest) = (0, 0);
    for (i, t) in temps.iter().enumerate() {
        if *t > temps[warmest] {
            warmest = i;
        }
        if *t < temps[coolest] {
            coolest = i;
        }
    }
    let average = temps.iter().sum::<f64>() / temps.len() as f64;

    let summary = serde_json::json!({
        "summary_type": WEATHER_COMPARISON,
        "cities": cities,
        "temperature_range": format!("{}°C - {}°C", temps[coolest], temps[warmest]),
        "average_temp": format!("{:.1}°C", average),
        "conditions": conditions,
        "best_weather_city": cities[warmest],
        "coolest_city": cities[coolest],
    });
    let text = format!(
        "{} cities, {}°C to {}°C (average {:.1}°C); warmest {}, coolest {}",
        cities.len(),
        temps[coolest],
        temps[warmest],
        average,
        cities[warmest],
        cities[coolest]
    );
    Ok((summary, text))
}

fn summarize_calculations(data: &serde_json::Value) -> Result<(serde_json::Value, String), ToolError> {
    let items = data.as_array().ok_or_else(|| {
        ToolError::InvalidParameters("calculations must be a list".to_string())
    })?;

    let total: f64 = items
        .iter()
        .filter_map(|c| c.get("result").and_then(|r| r.as_f64()))
        .sum();
    let count = items.len();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    Ok((
        serde_json::json!({
            "summary_type": CALCULATIONS,
            "total_sum": total,
            "operations_count": count,
            "average": average,
        }),
        format!("{} operations, total {}, average {}", count, total, average),
    ))
}

#[async_trait]
impl Tool for DataSummaryTool {
    fn name(&self) -> &str {
        "data_summary"
    }

    fn description(&self) -> &str {
        "Summarize and analyze data from earlier steps (weather comparisons, calculations)."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::optional(
                "data_type",
                ParamKind::Choice(&[WEATHER_COMPARISON, CALCULATIONS]),
                "Kind of data to summarize",
            ),
            ParameterSpec::optional(
                "data",
                ParamKind::Data,
                "Data to summarize; defaults to the previous step's result",
            ),
        ]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let requested = str_param(&params, "data_type");

        let (data_type, data) = match (requested, params.get("data")) {
            (Some(kind), Some(data)) if !data.is_null() => (kind.to_string(), data.clone()),
            _ => previous_data(ctx, requested).ok_or_else(|| {
                ToolError::InvalidParameters("no data to summarize".to_string())
            })?,
        };

        let (result, text) = match data_type.as_str() {
            WEATHER_COMPARISON => summarize_weather(&data)?,
            CALCULATIONS => summarize_calculations(&data)?,
            other => {
                return Err(ToolError::InvalidParameters(format!(
                    "unknown data_type: {}",
                    other
                )));
            }
        };

        Ok(ToolOutput::success(result, text, start.elapsed()))
    }
}
