//! Redact command implementation
//!
//! Anonymizes a single text under a policy context and prints the result.

use crate::anonymization::AnonymizationEngine;
use crate::cli::{load_config_or_default, report_error};
use crate::domain::{FeedbackField, PolicyContext, RedactorError};
use clap::Args;
use std::io::Read;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Policy context to redact under
    #[arg(long, default_value = PolicyContext::PLAIN)]
    pub context: String,

    /// Text to redact (read from stdin when omitted)
    pub text: Option<String>,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_error(&e)),
        };

        let text = match &self.text {
            Some(t) => t.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        match self.redact(&config, text).await {
            Ok(redacted) => {
                println!("{redacted}");
                Ok(0)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }

    async fn redact(
        &self,
        config: &crate::config::RedactorConfig,
        text: String,
    ) -> Result<String, RedactorError> {
        let engine =
            AnonymizationEngine::initialize(&config.recognizer, &config.policies, &config.audit)?;
        let field = FeedbackField::new("text", text, PolicyContext::new(self.context.clone()));
        let redacted = engine.anonymize(&field).await?;
        engine.shutdown();
        Ok(redacted.text)
    }
}
