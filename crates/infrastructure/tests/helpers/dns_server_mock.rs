use super::make_answer;
use dohproxy_infrastructure::dns::transport::{read_with_length_prefix, send_with_length_prefix};
use hickory_proto::op::Message;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

pub const MOCK_ANSWER_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const MOCK_ANSWER_TTL: u32 = 60;

/// Plain DNS server answering every query with one A record, on UDP and TCP
/// at the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start() -> Result<Self, std::io::Error> {
        let tcp = TcpListener::bind("127.0.0.1:0").await?;
        let addr = tcp.local_addr()?;
        let udp = UdpSocket::bind(addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = udp_queries.clone();
        let tcp_count = tcp_queries.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = udp.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::build_mock_response(&buf[..len]) {
                                let _ = udp.send_to(&response, peer).await;
                            }
                        }
                    }
                    result = tcp.accept() => {
                        if let Ok((mut stream, _)) = result {
                            let tcp_count = tcp_count.clone();
                            tokio::spawn(async move {
                                while let Ok(query) = read_with_length_prefix(&mut stream).await {
                                    tcp_count.fetch_add(1, Ordering::SeqCst);
                                    let Some(response) = Self::build_mock_response(&query) else {
                                        break;
                                    };
                                    if send_with_length_prefix(&mut stream, &response).await.is_err() {
                                        break;
                                    }
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    fn build_mock_response(query: &[u8]) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;
        request.queries().first()?;
        make_answer(&request, &[(MOCK_ANSWER_IP, MOCK_ANSWER_TTL)])
            .to_vec()
            .ok()
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
