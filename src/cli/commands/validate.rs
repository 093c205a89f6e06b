//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the redactor configuration file.

use crate::anonymization::AnonymizationEngine;
use crate::config::schema::StorageBackend;
use crate::config::{load_config, redact_connection_string};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded and validated");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // Loading the pattern library and checking replacement tokens
        // against it needs the engine itself.
        let engine = match AnonymizationEngine::initialize(
            &config.recognizer,
            &config.policies,
            &config.audit,
        ) {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Redaction setup failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };
        println!("✅ Recognizer and policies are consistent");

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Recognizer: {}", engine.recognizer_name());
        println!(
            "  Confidence Threshold: {}",
            config.recognizer.confidence_threshold
        );
        println!(
            "  Policy Contexts: {}",
            engine
                .policies()
                .contexts()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Storage Backend: {}", config.storage.backend.as_str());
        if config.storage.backend == StorageBackend::PostgreSQL {
            if let Some(ref pg_config) = config.storage.postgresql {
                println!(
                    "  PostgreSQL Connection: {}",
                    redact_connection_string(pg_config.connection_string.expose_secret().as_str())
                );
                println!("  Max Connections: {}", pg_config.max_connections);
                println!("  SSL Mode: {}", pg_config.ssl_mode);
            }
        }
        println!("  Bind Address: {}", config.server.bind_address);
        println!("  Audit Trail: {}", config.audit.enabled);
        println!();

        engine.shutdown();
        Ok(0)
    }
}
