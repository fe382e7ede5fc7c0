use hickory_proto::op::{Message, Query};

/// Snapshot of DNS cache metrics.
#[derive(Debug, Clone, Default)]
pub struct CacheMetricsSnapshot {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub expirations: u64,
    pub compactions: u64,
    pub hit_rate: f64,
}

/// TTL-aware store of resolved messages, keyed by question.
pub trait DnsCachePort: Send + Sync {
    /// Returns a copy of the cached reply with answer TTLs aged by the time
    /// spent in the cache and the transaction id set to `id`.
    fn get(&self, query: &Query, id: u16) -> Option<Message>;

    /// Stores `message` until its smallest answer TTL runs out. Messages
    /// without answers are ignored.
    fn set(&self, query: &Query, message: &Message);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot;
}
