//! Submit command implementation
//!
//! Reads a submission JSON file and runs it through the full intake: redact,
//! assemble, store.

use crate::cli::report_error;
use crate::config::{load_config, RedactorConfig};
use crate::core::intake::{FeedbackService, SubmissionOutcome};
use crate::domain::{FeedbackSubmission, RedactorError};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Submission JSON file
    pub file: PathBuf,

    /// Redact but do not store
    #[arg(long)]
    pub dry_run: bool,
}

/// Read and parse a submission file
pub fn read_submission(path: &Path) -> Result<FeedbackSubmission, RedactorError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RedactorError::Io(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&contents).map_err(|e| {
        RedactorError::Validation(format!("Invalid submission in {}: {e}", path.display()))
    })
}

impl SubmitArgs {
    /// Execute the submit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_error(&e)),
        };
        if self.dry_run {
            config.application.dry_run = true;
        }

        match self.run(&config).await {
            Ok(SubmissionOutcome::Stored(id)) => {
                println!("✅ Stored record {id}");
                Ok(0)
            }
            Ok(SubmissionOutcome::Accepted) => {
                println!("✅ Accepted (dry run, not stored)");
                Ok(0)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }

    async fn run(&self, config: &RedactorConfig) -> Result<SubmissionOutcome, RedactorError> {
        let submission = read_submission(&self.file)?;
        let service = FeedbackService::from_config(config).await?;
        let outcome = service.submit(submission).await;
        service.shutdown();
        outcome
    }
}
