pub mod cache;
pub mod errors;
pub mod listen;
pub mod logging;
pub mod root;
pub mod upstream;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use listen::{ListenConfig, ListenKind};
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use upstream::{UpstreamConfig, UpstreamKind, BUILTIN_UPSTREAMS};
