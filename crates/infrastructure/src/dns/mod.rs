pub mod cache;
pub mod server;
pub mod transport;
pub mod upstream;

pub use cache::{CacheKey, CacheMetrics, DnsCache};
pub use server::DnsServerHandler;
pub use upstream::{build_upstreams, Upstream};
