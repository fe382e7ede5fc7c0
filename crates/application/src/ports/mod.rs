mod cache_maintenance_port;
mod dns_cache_port;
mod dns_upstream;
mod response_writer;

pub use cache_maintenance_port::{CacheCompactionOutcome, CacheMaintenancePort};
pub use dns_cache_port::{CacheMetricsSnapshot, DnsCachePort};
pub use dns_upstream::DnsUpstream;
pub use response_writer::ResponseWriter;
