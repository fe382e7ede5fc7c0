use super::storage::DnsCache;
use std::sync::atomic::Ordering as AtomicOrdering;
use tokio::time::Instant;
use tracing::debug;

impl DnsCache {
    /// Drop every expired entry. Returns how many were removed.
    pub fn compact(&self) -> usize {
        let now = Instant::now();
        let before = self.cache.len();
        self.cache.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.cache.len());

        self.metrics
            .compactions
            .fetch_add(1, AtomicOrdering::Relaxed);

        if removed > 0 {
            debug!(
                removed,
                cache_size = self.cache.len(),
                "Cache compaction completed"
            );
        }

        removed
    }
}
