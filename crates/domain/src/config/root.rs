use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::listen::{ListenConfig, ListenKind};
use super::logging::LoggingConfig;
use super::upstream::{UpstreamConfig, UpstreamKind, BUILTIN_UPSTREAMS};
use crate::dns_protocol::DnsEndpoint;
use crate::rule::Rule;

const LOCAL_CONFIG_PATH: &str = "dohproxy.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/dohproxy/config.toml";

/// Main configuration structure for dohproxy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Routing rules, evaluated in order
    #[serde(default)]
    pub rules: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Listening endpoints
    #[serde(default)]
    pub listen: Vec<ListenConfig>,

    /// Named upstreams, referenced by rules
    #[serde(default)]
    pub upstreams: BTreeMap<String, UpstreamConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut upstreams = BTreeMap::new();
        upstreams.insert(
            "default".to_string(),
            UpstreamConfig {
                kind: UpstreamKind::Dns,
                address: "8.8.8.8:53".to_string(),
                proxy: None,
                timeout_ms: None,
            },
        );

        Self {
            rules: vec!["wildcard:* default".to_string()],
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            listen: vec![
                ListenConfig::new(ListenKind::Udp, "127.0.0.1:5353"),
                ListenConfig::new(ListenKind::Tcp, "127.0.0.1:5353"),
            ],
            upstreams,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dohproxy.toml in current directory
    /// 3. /etc/dohproxy/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    ///
    /// Checks everything that can be checked without touching the network,
    /// including that every rule parses and points at a known target.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.is_empty() {
            return Err(ConfigError::Validation(
                "No listen addresses configured".to_string(),
            ));
        }

        for listener in &self.listen {
            listener.socket_addr()?;
        }

        for (name, upstream) in &self.upstreams {
            if BUILTIN_UPSTREAMS.contains(&name.as_str()) {
                return Err(ConfigError::ReservedUpstreamName(name.clone()));
            }

            match upstream.kind {
                UpstreamKind::Dns => {
                    upstream.address.parse::<DnsEndpoint>().map_err(|reason| {
                        ConfigError::InvalidUpstreamAddress {
                            name: name.clone(),
                            reason,
                        }
                    })?;
                }
                UpstreamKind::DohGet | UpstreamKind::DohPost => {
                    if !upstream.address.starts_with("https://")
                        && !upstream.address.starts_with("http://")
                    {
                        return Err(ConfigError::InvalidUpstreamAddress {
                            name: name.clone(),
                            reason: format!("'{}' is not an http(s) URL", upstream.address),
                        });
                    }
                }
            }
        }

        self.logging.filter_directive()?;
        self.build_rules()?;

        Ok(())
    }

    /// Whether `name` refers to a configured or built-in upstream.
    pub fn has_upstream(&self, name: &str) -> bool {
        self.upstreams.contains_key(name) || BUILTIN_UPSTREAMS.contains(&name)
    }

    /// Parse every rule line, in order.
    pub fn build_rules(&self) -> Result<Vec<Rule>, ConfigError> {
        self.rules
            .iter()
            .map(|line| Rule::parse(line, |name| self.has_upstream(name)))
            .collect()
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
}
