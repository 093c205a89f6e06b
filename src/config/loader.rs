//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{PostgreSQLConfig, RedactorConfig, StorageBackend};
use crate::config::secret_string;
use crate::domain::errors::RedactorError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`RedactorConfig`]
/// 4. Applies environment variable overrides (REDACTOR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RedactorError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use feedback_redactor::config::load_config;
///
/// let config = load_config("redactor.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RedactorConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RedactorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RedactorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`], for configuration already in memory
pub fn load_config_from_str(contents: &str) -> Result<RedactorConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RedactorConfig = toml::from_str(&contents)
        .map_err(|e| RedactorError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RedactorError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RedactorError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RedactorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RedactorError::Configuration(format!("Invalid {name} value: '{value}'")))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Applies environment variable overrides using REDACTOR_* prefix
///
/// Environment variables follow the pattern: REDACTOR_<SECTION>_<KEY>
/// For example: REDACTOR_SERVER_BIND_ADDRESS, REDACTOR_STORAGE_BACKEND
fn apply_env_overrides(config: &mut RedactorConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("REDACTOR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_var("REDACTOR_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_env("REDACTOR_APPLICATION_DRY_RUN", &val)?;
    }
    if let Some(val) = env_var("REDACTOR_ENVIRONMENT") {
        config.environment = toml::Value::String(val.to_lowercase())
            .try_into()
            .map_err(|_| {
                RedactorError::Configuration(format!("Invalid REDACTOR_ENVIRONMENT value: '{val}'"))
            })?;
    }

    // Recognizer and audit overrides
    config
        .recognizer
        .apply_env_overrides()
        .map_err(|e| RedactorError::Configuration(format!("{e:#}")))?;
    config
        .audit
        .apply_env_overrides()
        .map_err(|e| RedactorError::Configuration(format!("{e:#}")))?;

    // Intake overrides
    if let Some(val) = env_var("REDACTOR_INTAKE_REQUEST_TIMEOUT_MS") {
        config.intake.request_timeout_ms = parse_env("REDACTOR_INTAKE_REQUEST_TIMEOUT_MS", &val)?;
    }

    // Storage overrides
    if let Some(val) = env_var("REDACTOR_STORAGE_BACKEND") {
        config.storage.backend = match val.to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "postgresql" | "postgres" => StorageBackend::PostgreSQL,
            _ => {
                return Err(RedactorError::Configuration(format!(
                    "Invalid REDACTOR_STORAGE_BACKEND value: '{val}'"
                )))
            }
        };
    }
    if let Some(val) = env_var("REDACTOR_STORAGE_POSTGRESQL_CONNECTION_STRING") {
        match config.storage.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => {
                config.storage.postgresql = Some(PostgreSQLConfig {
                    connection_string: secret_string(val),
                    max_connections: 10,
                    connection_timeout_seconds: 30,
                    statement_timeout_seconds: 60,
                    ssl_mode: "prefer".to_string(),
                })
            }
        }
    }
    if let Some(ref mut pg) = config.storage.postgresql {
        if let Some(val) = env_var("REDACTOR_STORAGE_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_env("REDACTOR_STORAGE_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Some(val) = env_var("REDACTOR_STORAGE_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Server overrides
    if let Some(val) = env_var("REDACTOR_SERVER_BIND_ADDRESS") {
        config.server.bind_address = val;
    }

    // Logging overrides
    if let Some(val) = env_var("REDACTOR_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("REDACTOR_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env_var("REDACTOR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
