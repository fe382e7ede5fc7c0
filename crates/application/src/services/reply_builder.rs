use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::Ipv4Addr;

/// TTL of answers synthesized for static rules.
pub const STATIC_ANSWER_TTL: u32 = 60;

/// Empty NOERROR response echoing the first question and transaction id of `request`.
pub fn build_reply(request: &Message) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_checking_disabled(request.checking_disabled())
        .set_response_code(ResponseCode::NoError);

    if let Some(query) = request.queries().first() {
        reply.add_query(query.clone());
    }
    reply
}

/// Authoritative reply carrying a single A record for the first question.
///
/// Callers check the query type; this does not.
pub fn build_static_answer(request: &Message, ip: Ipv4Addr) -> Message {
    let mut reply = build_reply(request);
    reply.set_authoritative(true);

    if let Some(query) = request.queries().first() {
        let record = Record::from_rdata(query.name().clone(), STATIC_ANSWER_TTL, RData::A(A(ip)));
        reply.add_answer(record);
    }
    reply
}
