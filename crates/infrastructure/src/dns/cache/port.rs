use super::storage::DnsCache;
use async_trait::async_trait;
use dohproxy_application::ports::{
    CacheCompactionOutcome, CacheMaintenancePort, CacheMetricsSnapshot, DnsCachePort,
};
use dohproxy_domain::DomainError;
use hickory_proto::op::{Message, Query};

impl DnsCachePort for DnsCache {
    fn get(&self, query: &Query, id: u16) -> Option<Message> {
        self.lookup(query, id)
    }

    fn set(&self, query: &Query, message: &Message) {
        self.insert(query, message);
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.cache.len())
    }
}

#[async_trait]
impl CacheMaintenancePort for DnsCache {
    async fn run_compaction_cycle(&self) -> Result<CacheCompactionOutcome, DomainError> {
        let entries_removed = self.compact();
        let cache_size = self.cache.len();
        Ok(CacheCompactionOutcome {
            entries_removed,
            cache_size,
            metrics: self.metrics.snapshot(cache_size),
        })
    }
}
