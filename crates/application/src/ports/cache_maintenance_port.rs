use super::CacheMetricsSnapshot;
use async_trait::async_trait;
use dohproxy_domain::DomainError;

/// Outcome of a cache compaction cycle.
#[derive(Debug, Default, Clone)]
pub struct CacheCompactionOutcome {
    pub entries_removed: usize,
    pub cache_size: usize,
    /// Counters as they stood after the cycle.
    pub metrics: CacheMetricsSnapshot,
}

/// Port for periodic cache upkeep.
#[async_trait]
pub trait CacheMaintenancePort: Send + Sync {
    /// Remove expired entries to reclaim memory.
    async fn run_compaction_cycle(&self) -> Result<CacheCompactionOutcome, DomainError>;
}
