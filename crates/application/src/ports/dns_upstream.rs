use super::ResponseWriter;
use async_trait::async_trait;
use dohproxy_domain::DomainError;
use hickory_proto::op::Message;

/// A named resolution backend.
#[async_trait]
pub trait DnsUpstream: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve `request`, writing at most one reply to `writer`.
    ///
    /// Returning `Ok(())` without writing is a deliberate silent drop. An
    /// error means the exchange failed and nothing was written.
    async fn query(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError>;
}
