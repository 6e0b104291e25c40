use clap::Parser;
use tracing_subscriber::EnvFilter;

use toolflow::cli::{self, Cli};
use toolflow::config::Config;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolflow=info"));
    let json = std::env::var("TOOLFLOW_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }
    init_tracing();

    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);

    cli::run(cli, config).await
}
