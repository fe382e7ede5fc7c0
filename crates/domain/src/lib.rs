//! dohproxy domain layer
pub mod config;
pub mod dns_protocol;
pub mod errors;
pub mod question;
pub mod rule;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_protocol::{DnsEndpoint, TransportAddr, TransportProtocol, UpstreamAddr};
pub use errors::DomainError;
pub use question::normalize_name;
pub use rule::{Rule, RuleKind, RuleTarget};
