/// Fatal configuration problems. Any one of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Unknown rule kind '{0}'")]
    UnknownRuleKind(String),

    #[error("Unknown upstream '{0}' (not a declared upstream, built-in or IPv4 address)")]
    UnknownUpstream(String),

    #[error("Invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Upstream name '{0}' is reserved for a built-in upstream")]
    ReservedUpstreamName(String),

    #[error("Invalid address for upstream '{name}': {reason}")]
    InvalidUpstreamAddress { name: String, reason: String },

    #[error("Invalid proxy for upstream '{name}': {reason}")]
    InvalidProxy { name: String, reason: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Unknown log level '{0}'")]
    InvalidLogLevel(String),
}
