//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config;

/// Kairos - AI goal decomposition and focus mode
#[derive(Parser)]
#[command(
    name = "kairos",
    about = "Break goals into milestones and work through them one subtask at a time",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; focus mode when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new goal and let the AI break it down
    Add {
        /// Goal description; prompted for when omitted
        #[arg(value_name = "GOAL")]
        goal: Vec<String>,

        /// Extra context for the decomposition (experience, constraints)
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Switch the active goal, or delete one
    Switch,

    /// Take a break
    Chill,

    /// Show progress on the active goal
    Status {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

impl Command {
    /// Positional goal words joined into one description
    pub fn goal_text(words: &[String]) -> Option<String> {
        let text = words.join(" ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kairos")
        .join("logs")
        .join("kairos.log")
}

/// Generate the after_help text with file locations
pub fn generate_after_help() -> String {
    let mut help = String::new();
    if let Some(path) = config::user_config_path() {
        help.push_str(&format!("Config file: {}\n", path.display()));
    }
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for the status command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["kairos"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_add_words() {
        let cli = Cli::parse_from(["kairos", "add", "Learn", "Go", "-c", "I know Python"]);
        match cli.command {
            Some(Command::Add { goal, context }) => {
                assert_eq!(Command::goal_text(&goal).as_deref(), Some("Learn Go"));
                assert_eq!(context.as_deref(), Some("I know Python"));
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_add_without_goal() {
        let cli = Cli::parse_from(["kairos", "add"]);
        match cli.command {
            Some(Command::Add { goal, context }) => {
                assert_eq!(Command::goal_text(&goal), None);
                assert!(context.is_none());
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_switch_and_chill() {
        assert!(matches!(Cli::parse_from(["kairos", "switch"]).command, Some(Command::Switch)));
        assert!(matches!(Cli::parse_from(["kairos", "chill"]).command, Some(Command::Chill)));
    }

    #[test]
    fn test_cli_parse_status_format() {
        let cli = Cli::parse_from(["kairos", "status"]);
        assert!(matches!(
            cli.command,
            Some(Command::Status {
                format: OutputFormat::Text
            })
        ));

        let cli = Cli::parse_from(["kairos", "status", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Status {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_cli_parse_global_options() {
        let cli = Cli::parse_from(["kairos", "switch", "--config", "/tmp/k.yml", "-l", "DEBUG"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("DEBUG"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("plain".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_goal_text_trims_and_rejects_blank() {
        let words = vec!["  ".to_string()];
        assert_eq!(Command::goal_text(&words), None);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
