//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Standard DNS transport. Messages are sent as-is (no framing).
//! Replies larger than 4096 bytes are truncated by the receive buffer.

use super::{resolve_addr, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dohproxy_domain::{DomainError, UpstreamAddr};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    upstream_addr: UpstreamAddr,
}

impl UdpTransport {
    pub fn new(upstream_addr: UpstreamAddr) -> Self {
        Self { upstream_addr }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let server_addr = resolve_addr(&self.upstream_addr, timeout).await?;
        let server = server_addr.to_string();

        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        // Connected socket: the kernel drops datagrams from other sources.
        socket
            .connect(server_addr)
            .await
            .map_err(|e| DomainError::TransportError {
                server: server.clone(),
                reason: e.to_string(),
            })?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|e| DomainError::TransportError {
                server: server.clone(),
                reason: e.to_string(),
            })?;

        debug!(server = %server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::ConnectionRefused {
                    DomainError::TransportConnectionRefused {
                        server: server.clone(),
                    }
                } else {
                    DomainError::TransportError {
                        server: server.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if bytes_received == MAX_UDP_RESPONSE_SIZE {
            warn!(server = %server_addr, "UDP response filled the receive buffer");
        }

        recv_buf.truncate(bytes_received);

        debug!(server = %server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
