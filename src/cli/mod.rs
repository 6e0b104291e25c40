//! Command-line interface.

mod chat;
mod config;

pub use config::{ConfigCommand, run_config_command};

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::channels::{ApiServer, AppState, routes};
use crate::config::Config;
use crate::context::ConversationContext;
use crate::llm::create_reasoning_service;
use crate::tools::ToolRegistry;
use crate::workflow::{Mode, Orchestrator};

#[derive(Parser, Debug)]
#[command(
    name = "toolflow",
    about = "Natural-language tool orchestration backed by a local reasoning model",
    version
)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Reasoning model name (overrides OLLAMA_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides HTTP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides HTTP_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Handle one message and print the outcome as JSON
    Ask {
        message: String,

        #[arg(short, long, value_enum, default_value_t = Mode::Heuristic)]
        mode: Mode,
    },

    /// Interactive session that keeps conversation context between turns
    Chat {
        #[arg(short, long, value_enum, default_value_t = Mode::Assisted)]
        mode: Mode,
    },

    /// List registered tools
    Tools,

    /// Inspect the effective configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Command::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.http.host = host.clone();
            }
            if let Some(port) = port {
                config.http.port = *port;
            }
        }
    }
}

fn build_orchestrator(config: &Config) -> anyhow::Result<Arc<Orchestrator>> {
    let registry = Arc::new(ToolRegistry::with_builtins()?);
    let reasoning = create_reasoning_service(&config.llm)?;
    Ok(Arc::new(Orchestrator::new(
        registry,
        reasoning,
        config.workflow,
    )))
}

/// Run the parsed command.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve { .. } => serve(&config).await,
        Command::Ask { message, mode } => {
            let orchestrator = build_orchestrator(&config)?;
            let mut context = ConversationContext::new(config.workflow.max_conversation_turns);
            let outcome = orchestrator.handle(&message, mode, &mut context).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Chat { mode } => {
            let orchestrator = build_orchestrator(&config)?;
            chat::run_chat(&orchestrator, mode, config.workflow.max_conversation_turns).await
        }
        Command::Tools => {
            let registry = ToolRegistry::with_builtins()?;
            for tool in registry.describe_all() {
                println!("{}", tool.signature());
                println!("    {}", tool.description);
            }
            Ok(())
        }
        Command::Config(cmd) => run_config_command(cmd, &config),
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let state = AppState::new(orchestrator, config.workflow.max_conversation_turns);
    let mut server = ApiServer::new(&config.http, routes(state));

    server.start().await?;
    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
