//! Recognizer and audit configuration

use crate::anonymization::recognizer::regex::DEFAULT_CONFIDENCE_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Entity recognizer settings (`[recognizer]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Path to a pattern library TOML file; the embedded library is used when unset
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Minimum confidence for a match to count as a detection
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Language assumed for every field
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Languages the recognizer accepts
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Upper bound on one recognition call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_language() -> String {
    "en".to_string()
}

fn default_supported_languages() -> Vec<String> {
    vec![default_language()]
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            pattern_library: None,
            confidence_threshold: default_confidence_threshold(),
            default_language: default_language(),
            supported_languages: default_supported_languages(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RecognizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            );
        }

        if self.supported_languages.is_empty() {
            anyhow::bail!("supported_languages cannot be empty");
        }

        if !self
            .supported_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(&self.default_language))
        {
            anyhow::bail!(
                "default_language '{}' is not listed in supported_languages",
                self.default_language
            );
        }

        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }

        Ok(())
    }

    /// Apply `REDACTOR_RECOGNIZER_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = val
                .parse()
                .context("Invalid REDACTOR_RECOGNIZER_CONFIDENCE_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_DEFAULT_LANGUAGE") {
            self.default_language = val;
        }

        if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_SUPPORTED_LANGUAGES") {
            self.supported_languages = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_TIMEOUT_MS") {
            self.timeout_ms = val
                .parse()
                .context("Invalid REDACTOR_RECOGNIZER_TIMEOUT_MS value")?;
        }

        Ok(())
    }
}

/// Audit logging configuration (`[audit]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    false
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/redaction.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path cannot be empty when audit is enabled");
        }
        Ok(())
    }

    /// Apply `REDACTOR_AUDIT_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("REDACTOR_AUDIT_ENABLED") {
            self.enabled = val.parse().context("Invalid REDACTOR_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("REDACTOR_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("REDACTOR_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid REDACTOR_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}
