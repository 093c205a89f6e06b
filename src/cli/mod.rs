//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the redactor using clap.

pub mod commands;

use crate::config::{load_config, load_config_from_str, RedactorConfig};
use crate::domain::{RedactorError, Result};
use clap::{Parser, Subcommand};
use std::path::Path;

/// Feedback Redactor - PII redaction for feedback submissions
#[derive(Parser, Debug)]
#[command(name = "feedback-redactor")]
#[command(version, about, long_about = None)]
#[command(author = "Feedback Redactor Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH, env = crate::config::CONFIG_PATH_ENV)]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "REDACTOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP intake server
    Serve(commands::serve::ServeArgs),

    /// Redact one piece of text and print the result
    Redact(commands::redact::RedactArgs),

    /// Redact and store a submission read from a JSON file
    Submit(commands::submit::SubmitArgs),

    /// Report detected PII in a submission without changing or storing it
    Scan(commands::scan::ScanArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Load the configuration file, or defaults plus environment overrides when
/// the file does not exist
///
/// Used by the commands that never touch a record store.
pub fn load_config_or_default(path: &str) -> Result<RedactorConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::info!(config_path = %path, "No configuration file, using defaults");
        load_config_from_str("")
    }
}

/// Print an error and return its exit code
pub fn report_error(err: &RedactorError) -> i32 {
    crate::log_error_with_context!(err, "Command failed");
    eprintln!("❌ {err}");
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["feedback-redactor", "serve"]);
        assert_eq!(cli.config, "redactor.toml");
        assert!(matches!(cli.command, Commands::Serve(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["feedback-redactor", "--config", "custom.toml", "serve"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["feedback-redactor", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_redact() {
        let cli = Cli::parse_from([
            "feedback-redactor",
            "redact",
            "--context",
            "verbatim",
            "see https://x.org",
        ]);
        match cli.command {
            Commands::Redact(args) => {
                assert_eq!(args.context, "verbatim");
                assert_eq!(args.text.as_deref(), Some("see https://x.org"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_submit_and_scan() {
        let cli = Cli::parse_from(["feedback-redactor", "submit", "feedback.json", "--dry-run"]);
        assert!(matches!(cli.command, Commands::Submit(ref a) if a.dry_run));

        let cli = Cli::parse_from(["feedback-redactor", "scan", "feedback.json", "--format", "json"]);
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["feedback-redactor", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config_or_default("/nonexistent/redactor.toml").unwrap();
        assert_eq!(config.recognizer.default_language, "en");
    }
}
