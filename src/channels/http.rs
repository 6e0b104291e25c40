//! HTTP API over the orchestration pipeline.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::channels::types::{
    ChatRequest, ErrorResponse, ExecuteRequest, ExecuteResponse, HealthResponse,
    ReasoningHealthResponse, ToolInfo, ToolListResponse,
};
use crate::context::ConversationContext;
use crate::error::{Error, InputError, RegistryError, WorkflowError};
use crate::workflow::{Mode, Orchestrator};

/// Maximum JSON body size (64 KB).
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    max_turns: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, max_turns: usize) -> Self {
        Self {
            orchestrator,
            max_turns,
        }
    }
}

/// Build the API router with state and middleware applied.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat-llm", post(chat_assisted_handler))
        .route("/chat-compose", post(chat_workflow_handler))
        .route("/tools", get(tools_handler))
        .route("/execute", post(execute_handler))
        .route("/health", get(health_handler))
        .route("/health/reasoning", get(reasoning_health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let mode = req.mode.unwrap_or_default();
    handle_chat(state, req, mode).await
}

async fn chat_assisted_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    handle_chat(state, req, Mode::Assisted).await
}

async fn chat_workflow_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    handle_chat(state, req, Mode::Workflow).await
}

async fn handle_chat(state: AppState, req: ChatRequest, mode: Mode) -> Response {
    let request_id = Uuid::new_v4();
    tracing::debug!(%request_id, mode = %mode, history = req.history.len(), "Chat request");

    let mut context = ConversationContext::from_turns(req.history, state.max_turns);
    match state
        .orchestrator
        .handle(&req.message, mode, &mut context)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            tracing::debug!(%request_id, error = %e, "Rejected chat request");
            let status = match e {
                InputError::TooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                InputError::EmptyMessage | InputError::NullBytes => StatusCode::BAD_REQUEST,
            };
            error_response(status, e.to_string())
        }
    }
}

async fn tools_handler(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state
            .orchestrator
            .registry()
            .describe_all()
            .map(ToolInfo::from)
            .collect(),
    })
}

async fn execute_handler(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Response {
    match state
        .orchestrator
        .execute_tool(&req.tool, req.parameters)
        .await
    {
        Ok(output) => Json(ExecuteResponse {
            tool: req.tool,
            result: output.result,
            response: output.summary,
        })
        .into_response(),
        Err(e @ Error::Registry(RegistryError::UnknownTool { .. })) => {
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e @ Error::Workflow(WorkflowError::ToolExecution { .. })) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => {
            tracing::error!(tool = %req.tool, error = %e, "Direct execution failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        tools: state.orchestrator.registry().len(),
    })
}

async fn reasoning_health_handler(State(state): State<AppState>) -> Response {
    let reasoning = state.orchestrator.reasoning();
    let model = reasoning.model_name().to_string();
    match reasoning.list_models().await {
        Ok(models) => Json(ReasoningHealthResponse {
            status: "available",
            model,
            models: Some(models),
            error: None,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Reasoning service health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReasoningHealthResponse {
                    status: "unavailable",
                    model,
                    models: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::config::WorkflowConfig;
    use crate::error::LlmError;
    use crate::llm::testing::ScriptedReasoning;
    use crate::tools::ToolRegistry;

    fn app(replies: Vec<Result<String, LlmError>>) -> Router {
        let orchestrator = Orchestrator::new(
            Arc::new(ToolRegistry::with_builtins().unwrap()),
            Arc::new(ScriptedReasoning::new(replies)),
            WorkflowConfig::default(),
        );
        routes(AppState::new(Arc::new(orchestrator), 10))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_chat_defaults_to_heuristic() {
        let (status, body) = send(
            app(vec![]),
            "POST",
            "/chat",
            Some(serde_json::json!({ "message": "¿Cuánto es 5 + 3?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_used"], "calculator");
        assert_eq!(body["result"], 8.0);
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let (status, body) =
            send(app(vec![]), "POST", "/chat", Some(serde_json::json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is empty");
    }

    #[tokio::test]
    async fn test_chat_rejects_oversized_message() {
        let message = "a ".repeat(20 * 1024);
        let (status, _) = send(
            app(vec![]),
            "POST",
            "/chat",
            Some(serde_json::json!({ "message": message })),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_chat_compose_forces_workflow_mode() {
        let plan = r#"{"workflow": [{"step": 1, "action": "weather", "params": {"city": "Tokyo"}}], "needs_analysis": false}"#;
        let (status, body) = send(
            app(vec![ScriptedReasoning::reply(plan)]),
            "POST",
            "/chat-compose",
            Some(serde_json::json!({ "message": "what's it like outside?", "mode": "heuristic" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_used"], "weather");
        assert_eq!(body["result"]["city"], "Tokyo");
    }

    #[tokio::test]
    async fn test_tools_lists_schemas() {
        let (status, body) = send(app(vec![]), "GET", "/tools", None).await;

        assert_eq!(status, StatusCode::OK);
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 6);
        assert_eq!(tools[0]["name"], "calculator");
        assert_eq!(tools[0]["parameters"]["required"], serde_json::json!(["operation", "a", "b"]));
    }

    #[tokio::test]
    async fn test_execute_statuses() {
        let (status, body) = send(
            app(vec![]),
            "POST",
            "/execute",
            Some(serde_json::json!({ "tool": "calculator", "parameters": { "operation": "subtract", "a": 10, "b": 4 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool"], "calculator");
        assert_eq!(body["result"], 6.0);

        let (status, _) = send(
            app(vec![]),
            "POST",
            "/execute",
            Some(serde_json::json!({ "tool": "shell" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            app(vec![]),
            "POST",
            "/execute",
            Some(serde_json::json!({ "tool": "calculator", "parameters": { "operation": "divide", "a": 1, "b": 0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("division by zero"));
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (status, body) = send(app(vec![]), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        // The scripted service reports its own model without a round trip.
        let (status, body) = send(app(vec![]), "GET", "/health/reasoning", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"], serde_json::json!(["scripted"]));
    }

    #[tokio::test]
    async fn test_reasoning_health_reports_outage() {
        let config = crate::config::LlmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: std::time::Duration::from_secs(2),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(
            Arc::new(ToolRegistry::with_builtins().unwrap()),
            Arc::new(crate::llm::OllamaClient::new(config).unwrap()),
            WorkflowConfig::default(),
        );
        let app = routes(AppState::new(Arc::new(orchestrator), 10));

        let (status, body) = send(app, "GET", "/health/reasoning", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["model"], "phi");
    }
}
