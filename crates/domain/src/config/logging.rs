use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// `stdout`, `stderr`, or a file path to append to.
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-module level overrides, e.g. `hyper = "warn"`.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: default_output(),
            filters: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Canonical level name understood by the tracing filter.
    pub fn level_directive(&self) -> Result<&'static str, ConfigError> {
        normalize_level(&self.level)
    }

    /// Full filter directive: base level followed by per-module overrides.
    pub fn filter_directive(&self) -> Result<String, ConfigError> {
        let mut directive = self.level_directive()?.to_string();
        for (module, level) in &self.filters {
            directive.push(',');
            directive.push_str(module);
            directive.push('=');
            directive.push_str(normalize_level(level)?);
        }
        Ok(directive)
    }
}

fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> String {
    "stdout".to_string()
}
