use crate::ports::{DnsCachePort, ResponseWriter};
use dohproxy_domain::{DomainError, TransportAddr};
use hickory_proto::op::{Message, Query};
use tracing::debug;

/// Forwards the reply to the inner writer and records it in the cache.
///
/// Truncated replies are forwarded but not stored: the cache key ignores the
/// transport, so a partial UDP answer would otherwise be served to the TCP retry.
pub(super) struct CachingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    cache: &'a dyn DnsCachePort,
    query: &'a Query,
}

impl<'a> CachingWriter<'a> {
    pub(super) fn new(
        inner: &'a mut dyn ResponseWriter,
        cache: &'a dyn DnsCachePort,
        query: &'a Query,
    ) -> Self {
        Self {
            inner,
            cache,
            query,
        }
    }
}

impl CachingWriter<'_> {
    fn record(&self, message: &Message) {
        if message.truncated() {
            debug!(id = message.id(), "Truncated reply, not caching");
            return;
        }
        self.cache.set(self.query, message);
    }
}

impl ResponseWriter for CachingWriter<'_> {
    fn local_addr(&self) -> TransportAddr {
        self.inner.local_addr()
    }

    fn remote_addr(&self) -> TransportAddr {
        self.inner.remote_addr()
    }

    fn write_bytes(&mut self, bytes: Vec<u8>) -> Result<(), DomainError> {
        match Message::from_vec(&bytes) {
            Ok(message) => self.record(&message),
            Err(e) => debug!(error = %e, "Reply not cacheable, forwarding as is"),
        }
        self.inner.write_bytes(bytes)
    }

    fn write_message(&mut self, message: &Message) -> Result<(), DomainError> {
        let bytes = message
            .to_vec()
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;
        self.record(message);
        self.inner.write_bytes(bytes)
    }
}
