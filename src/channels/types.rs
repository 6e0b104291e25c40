//! Request and response DTOs for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::context::Turn;
use crate::tools::ToolDescriptor;
use crate::workflow::Mode;

// --- Chat ---

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Defaults to heuristic on `/chat`; ignored on the alias routes.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Prior turns, oldest first. Only the newest are kept.
    #[serde(default)]
    pub history: Vec<Turn>,
}

// --- Tools ---

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters.
    pub parameters: serde_json::Value,
}

impl From<ToolDescriptor> for ToolInfo {
    fn from(descriptor: ToolDescriptor) -> Self {
        Self {
            parameters: descriptor.json_schema(),
            name: descriptor.name,
            description: descriptor.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub tool: String,
    #[serde(default = "empty_object")]
    pub parameters: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub tool: String,
    pub result: serde_json::Value,
    pub response: String,
}

// --- Health ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tools: usize,
}

#[derive(Debug, Serialize)]
pub struct ReasoningHealthResponse {
    pub status: &'static str,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Errors ---

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
