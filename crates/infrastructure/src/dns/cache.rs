//! TTL-aware response cache.
//!
//! Entries live for the smallest answer TTL of the stored message. Reads age
//! every answer TTL by the same offset and rewrite the transaction id, leaving
//! the stored message untouched.

mod compaction;
mod key;
mod metrics;
mod port;
mod storage;

pub use key::CacheKey;
pub use metrics::CacheMetrics;
pub use storage::DnsCache;
