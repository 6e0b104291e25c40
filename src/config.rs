//! Configuration loaded from the environment.
//!
//! Call `dotenvy::dotenv()` before [`Config::from_env`] to pick up a `.env` file.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Full application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub http: HttpConfig,
    pub workflow: WorkflowConfig,
}

/// Reasoning service (Ollama-compatible) configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Optional bearer token for hosted gateways in front of Ollama.
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "phi".to_string(),
            api_key: None,
            timeout: Duration::from_secs(150),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Limits applied while planning and executing workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Maximum operations a single batch arithmetic step may run.
    pub max_batch_operations: usize,
    /// Maximum targets a single multi-target lookup may fetch.
    pub max_lookup_targets: usize,
    /// Characters of each step result included in the synthesis prompt.
    pub synthesis_block_chars: usize,
    /// Conversation turns retained per caller-owned context.
    pub max_conversation_turns: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_batch_operations: 10,
            max_lookup_targets: 5,
            synthesis_block_chars: 500,
            max_conversation_turns: 10,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_defaults = LlmConfig::default();
        let http_defaults = HttpConfig::default();
        let workflow_defaults = WorkflowConfig::default();

        let llm = LlmConfig {
            base_url: lookup("OLLAMA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(llm_defaults.base_url),
            model: lookup("OLLAMA_MODEL").unwrap_or(llm_defaults.model),
            api_key: lookup("OLLAMA_API_KEY")
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            timeout: parse_optional::<u64>(&lookup, "OLLAMA_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(llm_defaults.timeout),
        };

        let http = HttpConfig {
            host: lookup("HTTP_HOST").unwrap_or(http_defaults.host),
            port: parse_optional(&lookup, "HTTP_PORT")?.unwrap_or(http_defaults.port),
        };

        let workflow = WorkflowConfig {
            max_batch_operations: parse_optional(&lookup, "WORKFLOW_MAX_BATCH_OPERATIONS")?
                .unwrap_or(workflow_defaults.max_batch_operations),
            max_lookup_targets: parse_optional(&lookup, "WORKFLOW_MAX_LOOKUP_TARGETS")?
                .unwrap_or(workflow_defaults.max_lookup_targets),
            synthesis_block_chars: parse_optional(&lookup, "WORKFLOW_SYNTHESIS_BLOCK_CHARS")?
                .unwrap_or(workflow_defaults.synthesis_block_chars),
            max_conversation_turns: parse_optional(&lookup, "CONVERSATION_MAX_TURNS")?
                .unwrap_or(workflow_defaults.max_conversation_turns),
        };

        if workflow.max_batch_operations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WORKFLOW_MAX_BATCH_OPERATIONS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if workflow.max_lookup_targets == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WORKFLOW_MAX_LOOKUP_TARGETS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            llm,
            http,
            workflow,
        })
    }

    /// Effective settings keyed by environment variable, in load order.
    /// Secrets are reported as set or unset, never shown.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("OLLAMA_BASE_URL", self.llm.base_url.clone()),
            ("OLLAMA_MODEL", self.llm.model.clone()),
            (
                "OLLAMA_API_KEY",
                match self.llm.api_key {
                    Some(_) => "[set]".to_string(),
                    None => "[unset]".to_string(),
                },
            ),
            (
                "OLLAMA_TIMEOUT_SECS",
                self.llm.timeout.as_secs().to_string(),
            ),
            ("HTTP_HOST", self.http.host.clone()),
            ("HTTP_PORT", self.http.port.to_string()),
            (
                "WORKFLOW_MAX_BATCH_OPERATIONS",
                self.workflow.max_batch_operations.to_string(),
            ),
            (
                "WORKFLOW_MAX_LOOKUP_TARGETS",
                self.workflow.max_lookup_targets.to_string(),
            ),
            (
                "WORKFLOW_SYNTHESIS_BLOCK_CHARS",
                self.workflow.synthesis_block_chars.to_string(),
            ),
            (
                "CONVERSATION_MAX_TURNS",
                self.workflow.max_conversation_turns.to_string(),
            ),
        ]
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}
