//! Scan command implementation
//!
//! Dry-run detection: reports what would be redacted in a submission without
//! changing or storing anything.

use crate::cli::commands::submit::read_submission;
use crate::cli::{load_config_or_default, report_error};
use crate::core::intake::FeedbackService;
use crate::domain::RedactorError;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Submission JSON file
    pub file: PathBuf,

    /// Output format (console or json)
    #[arg(long, default_value = "console")]
    pub format: String,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_error(&e)),
        };
        // Scanning never writes
        config.application.dry_run = true;

        match self.render(&config).await {
            Ok(output) => {
                println!("{output}");
                Ok(0)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }

    async fn render(&self, config: &crate::config::RedactorConfig) -> Result<String, RedactorError> {
        let submission = read_submission(&self.file)?;
        let service = FeedbackService::from_config(config).await?;
        let report = service.scan(&submission).await;
        service.shutdown();
        let report = report?;

        match self.format.as_str() {
            "json" => Ok(report.format_json()?),
            "console" => Ok(report.format_console()),
            other => Err(RedactorError::Configuration(format!(
                "Unknown output format '{other}' (expected console or json)"
            ))),
        }
    }
}
