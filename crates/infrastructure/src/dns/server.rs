use dohproxy_application::services::ReplyBuffer;
use dohproxy_application::use_cases::HandleDnsQueryUseCase;
use dohproxy_domain::TransportAddr;
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::debug;

/// Bridges raw packets from a listener to the query use case.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// Handle one wire-format query and return the encoded reply, if any.
    ///
    /// Undecodable packets are dropped.
    pub async fn handle_raw(
        &self,
        packet: &[u8],
        local: TransportAddr,
        remote: TransportAddr,
    ) -> Option<Vec<u8>> {
        let request = match Message::from_vec(packet) {
            Ok(message) => message,
            Err(e) => {
                debug!(from = %remote, error = %e, "Dropping undecodable packet");
                return None;
            }
        };

        let mut reply = ReplyBuffer::new(local, remote);
        if let Err(e) = self.use_case.execute(&mut reply, &request).await {
            debug!(from = %remote, id = request.id(), error = %e, "Query produced no reply");
        }
        reply.into_reply()
    }
}
