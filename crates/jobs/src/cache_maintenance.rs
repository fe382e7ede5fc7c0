use dohproxy_application::ports::CacheMaintenancePort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const DEFAULT_COMPACTION_INTERVAL_SECS: u64 = 600;

/// Periodically sweeps expired cache entries and reports cache counters.
pub struct CacheMaintenanceJob {
    maintenance: Arc<dyn CacheMaintenancePort>,
    compaction_interval_secs: u64,
    shutdown: CancellationToken,
}

impl CacheMaintenanceJob {
    pub fn new(maintenance: Arc<dyn CacheMaintenancePort>) -> Self {
        Self {
            maintenance,
            compaction_interval_secs: DEFAULT_COMPACTION_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    /// A zero interval is raised to one second.
    pub fn with_interval(mut self, compaction_secs: u64) -> Self {
        self.compaction_interval_secs = compaction_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!(
            interval_secs = self.compaction_interval_secs,
            "Starting cache maintenance background job"
        );

        let job = Arc::clone(&self);
        tokio::spawn(async move {
            let period = Duration::from_secs(job.compaction_interval_secs);
            // The first tick of a plain interval fires immediately; skip it.
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = job.shutdown.cancelled() => {
                        info!("CacheMaintenanceJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match job.maintenance.run_compaction_cycle().await {
                            Ok(outcome) => {
                                if outcome.entries_removed > 0 {
                                    info!(
                                        entries_removed = outcome.entries_removed,
                                        cache_size = outcome.cache_size,
                                        "Cache compaction cycle completed"
                                    );
                                }
                                debug!(
                                    hits = outcome.metrics.hits,
                                    misses = outcome.metrics.misses,
                                    insertions = outcome.metrics.insertions,
                                    expirations = outcome.metrics.expirations,
                                    hit_rate = outcome.metrics.hit_rate,
                                    "Cache metrics"
                                );
                            }
                            Err(e) => {
                                error!(error = %e, "Cache compaction cycle failed");
                            }
                        }
                    }
                }
            }
        })
    }
}
