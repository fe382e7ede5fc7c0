//! Closed set of resolution backends.

mod doh;
mod plain;
mod registry;

pub use doh::DohUpstream;
pub use plain::{PlainDnsUpstream, DEFAULT_DNS_TIMEOUT};
pub use registry::build_upstreams;

use async_trait::async_trait;
use dohproxy_application::ports::{DnsUpstream, ResponseWriter};
use dohproxy_application::services::build_reply;
use dohproxy_domain::DomainError;
use hickory_proto::op::Message;

pub const BLACKHOLE: &str = "blackhole";
pub const REJECT: &str = "reject";

pub enum Upstream {
    Dns(PlainDnsUpstream),
    Doh(DohUpstream),
    /// Never replies.
    BlackHole,
    /// Replies immediately with no answers.
    Reject,
}

impl Upstream {
    pub fn kind(&self) -> &'static str {
        match self {
            Upstream::Dns(_) => "dns",
            Upstream::Doh(doh) => doh.kind(),
            Upstream::BlackHole => BLACKHOLE,
            Upstream::Reject => REJECT,
        }
    }
}

#[async_trait]
impl DnsUpstream for Upstream {
    fn name(&self) -> &str {
        match self {
            Upstream::Dns(dns) => dns.name(),
            Upstream::Doh(doh) => doh.name(),
            Upstream::BlackHole => BLACKHOLE,
            Upstream::Reject => REJECT,
        }
    }

    async fn query(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError> {
        match self {
            Upstream::Dns(dns) => dns.query(writer, request).await,
            Upstream::Doh(doh) => doh.query(writer, request).await,
            Upstream::BlackHole => Ok(()),
            Upstream::Reject => writer.write_message(&build_reply(request)),
        }
    }
}
