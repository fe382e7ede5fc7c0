use super::key::CacheKey;
use super::CacheMetrics;
use dashmap::DashMap;
use hickory_proto::op::{Message, Query};
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub(super) struct CacheEntry {
    pub(super) message: Message,
    pub(super) min_ttl: u32,
    pub(super) expires_at: Instant,
}

impl CacheEntry {
    #[inline]
    pub(super) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct DnsCache {
    pub(super) cache: DashMap<CacheKey, CacheEntry>,
    pub(super) metrics: Arc<CacheMetrics>,
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsCache {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Store `message` under `query` for its smallest answer TTL.
    ///
    /// Messages without answers, or whose smallest TTL is zero, are not stored.
    pub fn insert(&self, query: &Query, message: &Message) {
        let Some(min_ttl) = message.answers().iter().map(|r| r.ttl()).min() else {
            return;
        };
        if min_ttl == 0 {
            return;
        }

        let key = CacheKey::from_query(query);
        debug!(domain = %key.domain, record_type = %key.record_type, min_ttl, "Caching response");

        self.cache.insert(
            key,
            CacheEntry {
                message: message.clone(),
                min_ttl,
                expires_at: Instant::now() + Duration::from_secs(u64::from(min_ttl)),
            },
        );
        self.metrics
            .insertions
            .fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Copy of the cached reply for `query`, aged and carrying transaction id `id`.
    ///
    /// Every answer TTL is reduced by the whole seconds elapsed since insertion.
    /// Expired entries are removed and reported as a miss.
    pub fn lookup(&self, query: &Query, id: u16) -> Option<Message> {
        let key = CacheKey::from_query(query);
        let now = Instant::now();

        let Some(entry) = self.cache.get(&key) else {
            self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
            return None;
        };

        if entry.is_expired(now) {
            drop(entry);
            self.cache.remove_if(&key, |_, e| e.is_expired(now));
            self.metrics
                .expirations
                .fetch_add(1, AtomicOrdering::Relaxed);
            self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
            return None;
        }

        let remaining = ceil_secs(entry.expires_at - now);
        let offset = entry.min_ttl.saturating_sub(remaining);
        let mut message = entry.message.clone();
        drop(entry);

        let answers = message
            .take_answers()
            .into_iter()
            .map(|mut record| {
                let ttl = record.ttl().saturating_sub(offset);
                record.set_ttl(ttl);
                record
            })
            .collect();
        message.insert_answers(answers);
        message.set_id(id);

        self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
        Some(message)
    }
}

/// Whole seconds, rounded up, saturating at `u32::MAX`.
fn ceil_secs(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
