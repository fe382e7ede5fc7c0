use crate::dns::transport::{DnsTransport, DohMethod, HttpsTransport, DOH_TIMEOUT};
use dohproxy_application::ports::ResponseWriter;
use dohproxy_domain::{ConfigError, DomainError};
use hickory_proto::op::Message;
use std::sync::Arc;

/// DNS-over-HTTPS upstream. A 200 body is written to the client verbatim.
pub struct DohUpstream {
    name: Arc<str>,
    transport: HttpsTransport,
}

impl DohUpstream {
    pub fn new(
        name: &str,
        url: &str,
        method: DohMethod,
        proxy: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            transport: HttpsTransport::new(name, url, method, proxy)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &'static str {
        match self.transport.method() {
            DohMethod::Get => "doh-get",
            DohMethod::Post => "doh-post",
        }
    }

    pub async fn query(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError> {
        let query_bytes = request
            .to_vec()
            .map_err(|e| DomainError::MalformedQuery(e.to_string()))?;

        let response = self.transport.send(&query_bytes, DOH_TIMEOUT).await?;
        writer.write_bytes(response.bytes)
    }
}
