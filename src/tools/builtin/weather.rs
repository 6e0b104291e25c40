//! Simulated weather lookups.
//!
//! There is no upstream weather API; known cities return fixed readings and
//! anything else gets plausible random values.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Local;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::tools::extract;
use crate::tools::tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput, str_param,
};

const CONDITIONS: &[&str] = &["Sunny", "Cloudy", "Rainy", "Clear"];

/// (lower-case city, temperature °C, condition, humidity %)
const SIMULATED: &[(&str, i32, &str, u32)] = &[
    ("madrid", 22, "Sunny", 45),
    ("barcelona", 24, "Partly cloudy", 65),
    ("mexico", 28, "Rainy", 80),
    ("new york", 18, "Cloudy", 70),
    ("tokyo", 20, "Clear", 55),
];

/// A single weather reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: String,
    pub temperature_c: i32,
    pub condition: String,
    pub humidity: String,
    pub timestamp: String,
}

/// Look up the (simulated) weather for a city.
pub fn lookup(city: &str) -> WeatherReport {
    let lower = city.trim().to_lowercase();
    let (temperature_c, condition, humidity) =
        match SIMULATED.iter().find(|(name, ..)| *name == lower) {
            Some((_, temp, condition, humidity)) => (*temp, condition.to_string(), *humidity),
            None => {
                let mut rng = rand::thread_rng();
                (
                    rng.gen_range(15..=35),
                    CONDITIONS
                        .choose(&mut rng)
                        .copied()
                        .unwrap_or("Clear")
                        .to_string(),
                    rng.gen_range(40..=90),
                )
            }
        };

    WeatherReport {
        city: city.trim().to_string(),
        temperature: format!("{}°C", temperature_c),
        temperature_c,
        condition,
        humidity: format!("{}%", humidity),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Tool for the weather of a single city.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Current weather for ONE city."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required(
            "city",
            ParamKind::Text,
            "Name of the city",
        )]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let city = match str_param(&params, "city") {
            Some(city) => city.to_string(),
            None => extract::city(ctx.message),
        };

        let report = lookup(&city);
        let summary = format!(
            "Weather in {}: {}, {}, humidity {}",
            report.city, report.temperature, report.condition, report.humidity
        );
        let result = serde_json::to_value(&report)
            .map_err(|e| ToolError::ExecutionFailed(format!("failed to encode report: {}", e)))?;

        Ok(ToolOutput::success(result, summary, start.elapsed()))
    }
}
