use dohproxy_domain::config::{ListenConfig, ListenKind};
use dohproxy_domain::{TransportAddr, TransportProtocol};
use dohproxy_infrastructure::dns::transport::{read_with_length_prefix, send_with_length_prefix};
use dohproxy_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const UDP_RECV_BUFFER: usize = 4096;

/// Bind one configured listener and spawn its serving loop.
///
/// Binding happens before this returns, so an unusable address fails startup.
pub async fn bind_listener(
    listener: &ListenConfig,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let socket_addr = listener.socket_addr()?;
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let task = match listener.kind {
        ListenKind::Udp => {
            let socket = Arc::new(create_udp_socket(domain, socket_addr)?);
            let local = TransportAddr::new(TransportProtocol::Udp, socket.local_addr()?);
            info!(listen = %local, "DNS listener ready");
            tokio::spawn(run_udp_listener(socket, local, handler, shutdown))
        }
        ListenKind::Tcp => {
            let tcp_listener = create_tcp_listener(domain, socket_addr)?;
            let local = TransportAddr::new(TransportProtocol::Tcp, tcp_listener.local_addr()?);
            info!(listen = %local, "DNS listener ready");
            tokio::spawn(run_tcp_listener(tcp_listener, local, handler, shutdown))
        }
    };

    Ok(task)
}

async fn run_udp_listener(
    socket: Arc<UdpSocket>,
    local: TransportAddr,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) {
    let mut recv_buf = [0u8; UDP_RECV_BUFFER];

    loop {
        let (n, from) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    // ICMP port-unreachable from an earlier reply surfaces here on some platforms.
                    debug!(listen = %local, error = %e, "UDP recv error");
                    continue;
                }
            },
        };

        let packet: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        let socket = socket.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let remote = TransportAddr::new(TransportProtocol::Udp, from);
            if let Some(reply) = handler.handle_raw(&packet, local, remote).await {
                if let Err(e) = socket.send_to(&reply, from).await {
                    debug!(to = %remote, error = %e, "Failed to send UDP reply");
                }
            }
        });
    }

    info!(listen = %local, "DNS listener stopped");
}

async fn run_tcp_listener(
    listener: TcpListener,
    local: TransportAddr,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) {
    loop {
        let (stream, from) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(listen = %local, error = %e, "TCP accept error");
                    continue;
                }
            },
        };

        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let remote = TransportAddr::new(TransportProtocol::Tcp, from);
            serve_tcp_connection(stream, local, remote, handler, shutdown).await;
        });
    }

    info!(listen = %local, "DNS listener stopped");
}

/// Serve length-prefixed queries on one connection until it idles out or closes.
async fn serve_tcp_connection(
    mut stream: TcpStream,
    local: TransportAddr,
    remote: TransportAddr,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) {
    loop {
        let packet = tokio::select! {
            _ = shutdown.cancelled() => return,
            read = tokio::time::timeout(TCP_IDLE_TIMEOUT, read_with_length_prefix(&mut stream)) => {
                match read {
                    Ok(Ok(packet)) => packet,
                    Ok(Err(e)) => {
                        debug!(from = %remote, error = %e, "TCP connection closed");
                        return;
                    }
                    Err(_) => {
                        debug!(from = %remote, "TCP connection idle, closing");
                        return;
                    }
                }
            }
        };

        if let Some(reply) = handler.handle_raw(&packet, local, remote).await {
            if let Err(e) = send_with_length_prefix(&mut stream, &reply).await {
                debug!(to = %remote, error = %e, "Failed to send TCP reply");
                return;
            }
        }
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
