//! HTTPS Transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Both request forms carry the raw DNS wire message with the
//! `application/dns-message` content type:
//! ```text
//! GET /dns-query?dns=<base64url, unpadded> HTTP/2
//!
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//!
//! <raw DNS message bytes>
//! ```
//!
//! The TLS server name is taken from the URL host. HTTP/2 is negotiated
//! through ALPN when the server offers it.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dohproxy_domain::{ConfigError, DomainError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Upper bound for a whole DoH exchange.
pub const DOH_TIMEOUT: Duration = Duration::from_secs(5);

/// Content type for DNS-over-HTTPS requests and responses (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DohMethod {
    Get,
    Post,
}

impl fmt::Display for DohMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DohMethod::Get => f.write_str("GET"),
            DohMethod::Post => f.write_str("POST"),
        }
    }
}

/// DNS-over-HTTPS transport (RFC 8484)
pub struct HttpsTransport {
    url: Url,
    method: DohMethod,
    client: reqwest::Client,
}

impl HttpsTransport {
    /// Builds a transport with its own HTTP client, optionally routed through
    /// a forward proxy.
    pub fn new(
        name: &str,
        url: &str,
        method: DohMethod,
        proxy: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUpstreamAddress {
            name: name.to_string(),
            reason: format!("'{}': {}", url, e),
        })?;

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(DOH_TIMEOUT)
            .pool_max_idle_per_host(4);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ConfigError::InvalidProxy {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::Validation(format!("upstream '{}': {}", name, e)))?;

        Ok(Self {
            url,
            method,
            client,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> DohMethod {
        self.method
    }

    /// URL of a GET request for `message_bytes`.
    pub fn get_url(&self, message_bytes: &[u8]) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("dns", &URL_SAFE_NO_PAD.encode(message_bytes));
        url
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        debug!(
            url = %self.url,
            method = %self.method,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let request = match self.method {
            DohMethod::Get => self.client.get(self.get_url(message_bytes)),
            DohMethod::Post => self
                .client
                .post(self.url.clone())
                .body(message_bytes.to_vec()),
        };

        let exchange = async move {
            let response = request
                .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
                .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
                .send()
                .await
                .map_err(|e| DomainError::DohRequest(e.to_string()))?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(DomainError::DohStatus {
                    status: status.as_u16(),
                    cause: status_cause(status),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| DomainError::DohRequest(format!("reading body: {}", e)))
        };

        let body = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.url.to_string(),
            })??;

        debug!(url = %self.url, response_len = body.len(), "DoH response received");

        Ok(TransportResponse {
            bytes: body.to_vec(),
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}

/// Human-readable cause for a non-200 DoH status.
pub fn status_cause(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "DNS query not specified or too small",
        StatusCode::PAYLOAD_TOO_LARGE => "DNS query is larger than the maximum DNS message size",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported content type",
        StatusCode::GATEWAY_TIMEOUT => "Resolver timed out waiting for the query response",
        _ => "Unknown http status code",
    }
}
