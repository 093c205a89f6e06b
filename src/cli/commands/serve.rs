//! Serve command implementation
//!
//! Runs the HTTP intake server until a shutdown signal arrives.

use crate::cli::report_error;
use crate::config::load_config;
use crate::core::intake::FeedbackService;
use crate::domain::RedactorError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listen address (host:port)
    #[arg(long)]
    pub bind: Option<String>,

    /// Redact submissions but never store them
    #[arg(long)]
    pub dry_run: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting serve command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_error(&e)),
        };

        if let Some(bind) = &self.bind {
            tracing::info!(bind = %bind, "Overriding bind address from CLI");
            config.server.bind_address = bind.clone();
            if let Err(e) = config.server.socket_addr() {
                return Ok(report_error(&RedactorError::Configuration(e)));
            }
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let service = match FeedbackService::from_config(&config).await {
            Ok(s) => s,
            Err(e) => return Ok(report_error(&e)),
        };

        match crate::server::serve(&config.server, service, shutdown_signal).await {
            Ok(()) => Ok(0),
            Err(e) => Ok(report_error(&e)),
        }
    }
}
