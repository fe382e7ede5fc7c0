use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between sweeps of expired entries.
    #[serde(default = "default_compaction_interval")]
    pub compaction_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            compaction_interval: default_compaction_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_compaction_interval() -> u64 {
    600
}
