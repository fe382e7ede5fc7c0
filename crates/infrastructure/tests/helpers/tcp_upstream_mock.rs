use super::{make_answer, MOCK_ANSWER_IP, MOCK_ANSWER_TTL};
use dohproxy_infrastructure::dns::transport::{read_with_length_prefix, send_with_length_prefix};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// What a connection does once its first query has been answered.
#[derive(Debug, Clone, Copy)]
pub enum AfterFirstReply {
    /// Keep reading queries but never answer them.
    Silent,
    /// Close the connection.
    Close,
}

/// TCP DNS server that answers exactly one query per connection.
pub struct OneReplyTcpServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl OneReplyTcpServer {
    pub async fn start(after: AfterFirstReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let queries = Arc::new(AtomicUsize::new(0));

        let counter = queries.clone();
        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    let Ok(query) = read_with_length_prefix(&mut stream).await else {
                        return;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);

                    let Ok(request) = Message::from_vec(&query) else {
                        return;
                    };
                    let reply = make_answer(&request, &[(MOCK_ANSWER_IP, MOCK_ANSWER_TTL)]);
                    if send_with_length_prefix(&mut stream, &reply.to_vec().unwrap())
                        .await
                        .is_err()
                    {
                        return;
                    }

                    match after {
                        AfterFirstReply::Silent => {
                            while read_with_length_prefix(&mut stream).await.is_ok() {
                                counter.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                        AfterFirstReply::Close => drop(stream),
                    }
                });
            }
        });

        Self {
            addr,
            queries,
            task,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for OneReplyTcpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
