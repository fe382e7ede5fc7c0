pub mod https;
pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dohproxy_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;
use std::time::Duration;

pub use https::{DohMethod, HttpsTransport, DOH_TIMEOUT};
pub use tcp::{read_with_length_prefix, send_with_length_prefix, TcpTransport};
pub use udp::UdpTransport;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// One request/response exchange of DNS wire bytes with an upstream.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Resolve an upstream address to the first socket address it names.
pub(crate) async fn resolve_addr(
    addr: &UpstreamAddr,
    timeout: Duration,
) -> Result<SocketAddr, DomainError> {
    match addr {
        UpstreamAddr::Resolved(socket_addr) => Ok(*socket_addr),
        UpstreamAddr::Unresolved { hostname, port } => {
            let addrs = resolver::resolve_all(hostname, *port, timeout).await?;
            addrs
                .into_iter()
                .next()
                .ok_or_else(|| DomainError::TransportError {
                    server: addr.to_string(),
                    reason: "hostname resolved to no address".to_string(),
                })
        }
    }
}
