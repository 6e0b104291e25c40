//! `toolflow config`: inspect the effective configuration.

use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// List every setting and its effective value
    List {
        /// Show only settings starting with this prefix (e.g., "OLLAMA", "WORKFLOW")
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print one setting's effective value
    Get {
        /// Environment variable name (e.g., "OLLAMA_MODEL")
        key: String,
    },
}

/// Run a config command.
pub fn run_config_command(cmd: ConfigCommand, config: &Config) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::List { filter } => {
            for line in list_settings(config, filter.as_deref()) {
                println!("{}", line);
            }
            Ok(())
        }
        ConfigCommand::Get { key } => {
            println!("{}", get_setting(config, &key)?);
            Ok(())
        }
    }
}

/// Aligned `KEY  value` lines, optionally filtered by prefix.
fn list_settings(config: &Config, filter: Option<&str>) -> Vec<String> {
    let entries: Vec<(&str, String)> = config
        .entries()
        .into_iter()
        .filter(|(key, _)| {
            filter.is_none_or(|f| key.to_uppercase().starts_with(&f.to_uppercase()))
        })
        .collect();

    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    entries
        .into_iter()
        .map(|(key, value)| format!("{:width$}  {}", key, value, width = width))
        .collect()
}

fn get_setting(config: &Config, key: &str) -> anyhow::Result<String> {
    config
        .entries()
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
        .ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", key))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_list_settings_filter() {
        let lines = list_settings(&Config::default(), Some("http"));
        assert_eq!(lines, vec!["HTTP_HOST  127.0.0.1", "HTTP_PORT  5000"]);
    }

    #[test]
    fn test_list_settings_aligns_values() {
        let lines = list_settings(&Config::default(), None);
        assert_eq!(lines.len(), 10);
        let column = lines[0].find("http://").unwrap();
        assert!(lines.iter().all(|l| l.len() > column));
    }

    #[test]
    fn test_get_setting() {
        let config = Config::default();
        assert_eq!(get_setting(&config, "ollama_model").unwrap(), "phi");
        assert!(get_setting(&config, "DATABASE_URL").is_err());
    }
}
