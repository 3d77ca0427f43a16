//! Core runtime configuration.
//!
//! # Responsibility
//! - Select the merge policy and date-selection mode for a deployment.
//! - Carry storage, summarization and logging knobs with safe defaults.
//!
//! # Invariants
//! - A `CoreConfig` returned by any constructor here has passed `validate()`.
//! - Environment values are trimmed and matched case-insensitively.

use crate::logging::{default_log_level, normalize_level};
use crate::merge::{DateSelectionMode, MergePolicy};
use crate::store::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_MERGE_POLICY: &str = "CHRONICLE_MERGE_POLICY";
pub const ENV_DATE_MODE: &str = "CHRONICLE_DATE_MODE";
pub const ENV_STORAGE_KEY: &str = "CHRONICLE_STORAGE_KEY";
pub const ENV_SUMMARY_TIMEOUT_MS: &str = "CHRONICLE_SUMMARY_TIMEOUT_MS";
pub const ENV_REUSE_SUMMARIES: &str = "CHRONICLE_REUSE_SUMMARIES";
pub const ENV_LOG_LEVEL: &str = "CHRONICLE_LOG_LEVEL";

const DEFAULT_SUMMARY_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
            Self::Parse(message) => write!(f, "invalid config document: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Deployment configuration for the notes core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub merge_policy: MergePolicy,
    pub date_mode: DateSelectionMode,
    /// Persistence key holding the serialized note list.
    pub storage_key: String,
    /// Upper bound for one summarization call. Must be non-zero.
    pub summary_timeout_ms: u64,
    /// Skip re-summarizing dates whose texts did not change.
    pub reuse_unchanged_summaries: bool,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            date_mode: DateSelectionMode::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            summary_timeout_ms: DEFAULT_SUMMARY_TIMEOUT_MS,
            reuse_unchanged_summaries: false,
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document; missing fields fall back to defaults.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults overlaid with `CHRONICLE_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_MERGE_POLICY) {
            self.merge_policy = parse_merge_policy(&value)?;
        }
        if let Some(value) = lookup(ENV_DATE_MODE) {
            self.date_mode = parse_date_mode(&value)?;
        }
        if let Some(value) = lookup(ENV_STORAGE_KEY) {
            self.storage_key = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_SUMMARY_TIMEOUT_MS) {
            self.summary_timeout_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_SUMMARY_TIMEOUT_MS,
                        value: value.clone(),
                        expected: "a positive integer",
                    })?;
        }
        if let Some(value) = lookup(ENV_REUSE_SUMMARIES) {
            self.reuse_unchanged_summaries = parse_flag(&value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks ranges and normalizes the log level in place.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage_key",
                value: self.storage_key.clone(),
                expected: "a non-empty key",
            });
        }
        if self.summary_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "summary_timeout_ms",
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidValue {
                key: "log_level",
                value: self.log_level.clone(),
                expected: "trace|debug|info|warn|error",
            })?
            .to_string();
        Ok(())
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_millis(self.summary_timeout_ms)
    }
}

fn parse_merge_policy(value: &str) -> Result<MergePolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "accumulate" => Ok(MergePolicy::Accumulate),
        "per_submission" | "per-submission" => Ok(MergePolicy::PerSubmission),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_MERGE_POLICY,
            value: value.to_string(),
            expected: "accumulate|per_submission",
        }),
    }
}

fn parse_date_mode(value: &str) -> Result<DateSelectionMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "explicit" => Ok(DateSelectionMode::Explicit),
        "today" => Ok(DateSelectionMode::Today),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_DATE_MODE,
            value: value.to_string(),
            expected: "explicit|today",
        }),
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_REUSE_SUMMARIES,
            value: value.to_string(),
            expected: "true|false",
        }),
    }
}
