use async_trait::async_trait;
use dohproxy_application::ports::{
    CacheMetricsSnapshot, DnsCachePort, DnsUpstream, ResponseWriter,
};
use dohproxy_application::services::{build_reply, ReplyBuffer};
use dohproxy_domain::{DomainError, TransportAddr, TransportProtocol};
use hickory_proto::op::{Message, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn make_request(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut msg = Message::new();
    msg.set_id(id).set_recursion_desired(true);
    msg.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    msg
}

pub fn reply_buffer() -> ReplyBuffer {
    ReplyBuffer::new(
        TransportAddr::new(TransportProtocol::Udp, "127.0.0.1:5353".parse().unwrap()),
        TransportAddr::new(TransportProtocol::Udp, "127.0.0.1:40000".parse().unwrap()),
    )
}

pub fn decode_reply(buffer: ReplyBuffer) -> Option<Message> {
    buffer
        .into_reply()
        .map(|bytes| Message::from_vec(&bytes).unwrap())
}

pub fn first_a(message: &Message) -> Option<Ipv4Addr> {
    message.answers().iter().find_map(|r| match r.data() {
        Some(RData::A(A(ip))) => Some(*ip),
        _ => None,
    })
}

/// Upstream that answers every query with one A record, or fails on demand.
pub struct MockUpstream {
    name: String,
    answer: Option<Ipv4Addr>,
    ttl: u32,
    fail: bool,
    truncated: bool,
    calls: AtomicUsize,
}

impl MockUpstream {
    pub fn answering(name: &str, ip: Ipv4Addr) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            answer: Some(ip),
            ttl: 300,
            fail: false,
            truncated: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn silent(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            answer: None,
            ttl: 0,
            fail: false,
            truncated: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            answer: None,
            ttl: 0,
            fail: true,
            truncated: false,
            calls: AtomicUsize::new(0),
        })
    }

    /// Answers like [`MockUpstream::answering`] with the TC bit set.
    pub fn truncated(name: &str, ip: Ipv4Addr) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            answer: Some(ip),
            ttl: 300,
            fail: false,
            truncated: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsUpstream for MockUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(DomainError::TransportTimeout {
                server: self.name.clone(),
            });
        }

        let Some(ip) = self.answer else {
            return Ok(());
        };

        let mut reply = build_reply(request);
        let name = request.queries()[0].name().clone();
        reply.add_answer(Record::from_rdata(name, self.ttl, RData::A(A(ip))));
        reply.set_truncated(self.truncated);
        writer.write_message(&reply)
    }
}

/// Cache that stores messages verbatim and never expires them.
#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<(String, RecordType), Message>>,
}

impl MockCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl DnsCachePort for MockCache {
    fn get(&self, query: &Query, id: u16) -> Option<Message> {
        let entries = self.entries.lock().unwrap();
        let mut message = entries
            .get(&(query.name().to_ascii(), query.query_type()))?
            .clone();
        message.set_id(id);
        Some(message)
    }

    fn set(&self, query: &Query, message: &Message) {
        if message.answers().is_empty() {
            return;
        }
        self.entries.lock().unwrap().insert(
            (query.name().to_ascii(), query.query_type()),
            message.clone(),
        );
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            total_entries: self.len(),
            ..Default::default()
        }
    }
}
