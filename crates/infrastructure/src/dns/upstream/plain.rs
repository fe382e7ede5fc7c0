use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use dohproxy_application::ports::ResponseWriter;
use dohproxy_domain::{DnsEndpoint, DomainError, TransportProtocol};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// Classic DNS upstream over UDP or TCP.
///
/// Without an explicit `udp://`/`tcp://` prefix the exchange uses the transport
/// the query arrived on.
pub struct PlainDnsUpstream {
    name: Arc<str>,
    endpoint: DnsEndpoint,
    timeout: Duration,
    udp: UdpTransport,
    tcp: TcpTransport,
}

impl PlainDnsUpstream {
    pub fn new(name: &str, endpoint: DnsEndpoint, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            udp: UdpTransport::new(endpoint.addr.clone()),
            tcp: TcpTransport::new(endpoint.addr.clone()),
            endpoint,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn transport_for(&self, inbound: TransportProtocol) -> &dyn DnsTransport {
        match self.endpoint.transport.unwrap_or(inbound) {
            TransportProtocol::Udp => &self.udp,
            TransportProtocol::Tcp => &self.tcp,
        }
    }

    pub async fn query(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError> {
        let transport = self.transport_for(writer.local_addr().protocol);
        let query_bytes = request
            .to_vec()
            .map_err(|e| DomainError::MalformedQuery(e.to_string()))?;

        let response = transport.send(&query_bytes, self.timeout).await?;

        let reply = Message::from_vec(&response.bytes)
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;
        if reply.id() != request.id() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "transaction id mismatch: sent {}, got {}",
                request.id(),
                reply.id()
            )));
        }

        debug!(
            upstream = %self.name,
            protocol = response.protocol_used,
            answers = reply.answers().len(),
            "Plain DNS exchange completed"
        );

        writer.write_bytes(response.bytes)
    }
}
