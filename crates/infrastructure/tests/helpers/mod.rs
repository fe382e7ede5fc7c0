#![allow(dead_code)]

mod dns_server_mock;
mod doh_server_mock;
mod tcp_upstream_mock;

pub use dns_server_mock::{MockDnsServer, MOCK_ANSWER_IP, MOCK_ANSWER_TTL};
pub use doh_server_mock::{MockDohServer, SeenRequest};
pub use tcp_upstream_mock::{AfterFirstReply, OneReplyTcpServer};

use dohproxy_application::services::{build_reply, ReplyBuffer};
use dohproxy_domain::{TransportAddr, TransportProtocol};
use hickory_proto::op::{Message, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub fn make_request(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut msg = Message::new();
    msg.set_id(id).set_recursion_desired(true);
    msg.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    msg
}

pub fn make_query(domain: &str, record_type: RecordType) -> Query {
    Query::query(Name::from_str(domain).unwrap(), record_type)
}

/// Reply to `request` carrying one A record per `(ip, ttl)` pair.
pub fn make_answer(request: &Message, answers: &[(Ipv4Addr, u32)]) -> Message {
    let mut reply = build_reply(request);
    let name = request.queries()[0].name().clone();
    for (ip, ttl) in answers {
        reply.add_answer(Record::from_rdata(name.clone(), *ttl, RData::A(A(*ip))));
    }
    reply
}

pub fn reply_buffer(protocol: TransportProtocol) -> ReplyBuffer {
    ReplyBuffer::new(
        TransportAddr::new(protocol, "127.0.0.1:5353".parse().unwrap()),
        TransportAddr::new(protocol, "127.0.0.1:40000".parse().unwrap()),
    )
}

pub fn first_a(message: &Message) -> Option<Ipv4Addr> {
    message.answers().iter().find_map(|r| match r.data() {
        Some(RData::A(A(ip))) => Some(*ip),
        _ => None,
    })
}
