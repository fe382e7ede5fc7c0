//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Every message is framed with a two-byte big-endian length prefix. Idle
//! connections are kept per upstream and reused by later queries.
//!
//! A pooled connection the server has already closed is replaced once by a
//! fresh one. That only happens when the query could not be written or the
//! connection ended before any reply byte arrived; a slow reply is never
//! re-sent. The whole exchange runs under a single deadline.

use super::{resolve_addr, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use dohproxy_domain::{DomainError, UpstreamAddr};
use std::io;
use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_IDLE_TCP_PER_HOST: usize = 2;

type TcpConnectionPool = DashMap<SocketAddr, Vec<TcpStream>>;

static TCP_POOL: LazyLock<TcpConnectionPool> = LazyLock::new(TcpConnectionPool::new);

pub struct TcpTransport {
    upstream_addr: UpstreamAddr,
}

impl TcpTransport {
    pub fn new(upstream_addr: UpstreamAddr) -> Self {
        Self { upstream_addr }
    }

    fn take_pooled(server_addr: SocketAddr) -> Option<TcpStream> {
        TCP_POOL.get_mut(&server_addr)?.pop()
    }

    fn return_to_pool(server_addr: SocketAddr, stream: TcpStream) {
        let mut entry = TCP_POOL.entry(server_addr).or_default();
        if entry.len() < MAX_IDLE_TCP_PER_HOST {
            entry.push(stream);
        }
    }

    async fn connect_new(server_addr: SocketAddr) -> Result<TcpStream, DomainError> {
        let stream = TcpStream::connect(server_addr).await.map_err(|e| {
            if e.kind() == io::ErrorKind::ConnectionRefused {
                DomainError::TransportConnectionRefused {
                    server: server_addr.to_string(),
                }
            } else {
                transport_error(server_addr, e)
            }
        })?;

        stream
            .set_nodelay(true)
            .map_err(|e| DomainError::TransportError {
                server: server_addr.to_string(),
                reason: format!("Failed to set TCP_NODELAY: {}", e),
            })?;

        Ok(stream)
    }

    /// Exchange on a pooled connection. `Ok(None)` means the connection was
    /// stale and the query never reached a live peer.
    async fn exchange_pooled(
        stream: &mut TcpStream,
        server_addr: SocketAddr,
        message_bytes: &[u8],
    ) -> Result<Option<Vec<u8>>, DomainError> {
        if let Err(e) = send_with_length_prefix(stream, message_bytes).await {
            debug!(server = %server_addr, error = %e, "Pooled TCP connection unusable on write");
            return Ok(None);
        }

        let first = match stream.read_u8().await {
            Ok(byte) => byte,
            Err(e) if is_closed_by_peer(&e) => {
                debug!(server = %server_addr, error = %e, "Pooled TCP connection closed by server");
                return Ok(None);
            }
            Err(e) => return Err(transport_error(server_addr, e)),
        };
        let second = stream
            .read_u8()
            .await
            .map_err(|e| transport_error(server_addr, e))?;

        read_message_body(stream, u16::from_be_bytes([first, second]))
            .await
            .map(Some)
    }

    async fn exchange(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<(SocketAddr, Vec<u8>), DomainError> {
        let server_addr = resolve_addr(&self.upstream_addr, timeout).await?;

        if let Some(mut stream) = Self::take_pooled(server_addr) {
            if let Some(bytes) = Self::exchange_pooled(&mut stream, server_addr, message_bytes).await? {
                Self::return_to_pool(server_addr, stream);
                return Ok((server_addr, bytes));
            }
        }

        let mut stream = Self::connect_new(server_addr).await?;
        send_with_length_prefix(&mut stream, message_bytes).await?;
        let bytes = read_with_length_prefix(&mut stream).await?;
        Self::return_to_pool(server_addr, stream);
        Ok((server_addr, bytes))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let (server_addr, response_bytes) =
            tokio::time::timeout(timeout, self.exchange(message_bytes, timeout))
                .await
                .map_err(|_| DomainError::TransportTimeout {
                    server: self.upstream_addr.to_string(),
                })??;

        debug!(
            server = %server_addr,
            message_len = message_bytes.len(),
            response_len = response_bytes.len(),
            "TCP exchange completed"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

fn is_closed_by_peer(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

fn transport_error(server_addr: SocketAddr, e: io::Error) -> DomainError {
    DomainError::TransportError {
        server: server_addr.to_string(),
        reason: e.to_string(),
    }
}

/// Write one length-prefixed DNS message.
pub async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::IoError(format!(
            "DNS message of {} bytes exceeds the TCP frame limit",
            message_bytes.len()
        ))
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream
        .write_all(&frame)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

/// Read one length-prefixed DNS message.
pub async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message length: {}", e)))?;

    read_message_body(stream, u16::from_be_bytes(len_buf)).await
}

async fn read_message_body<S>(stream: &mut S, message_len: u16) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut message = vec![0u8; usize::from(message_len)];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message body: {}", e)))?;

    Ok(message)
}
