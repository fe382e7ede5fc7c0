use super::{DohUpstream, PlainDnsUpstream, Upstream, DEFAULT_DNS_TIMEOUT};
use crate::dns::transport::DohMethod;
use dohproxy_application::ports::DnsUpstream;
use dohproxy_domain::config::{UpstreamConfig, UpstreamKind};
use dohproxy_domain::{Config, ConfigError, DnsEndpoint};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

impl Upstream {
    pub fn from_config(name: &str, config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let proxy = config.proxy.as_deref();
        match config.kind {
            UpstreamKind::Dns => {
                let endpoint: DnsEndpoint = config.address.parse().map_err(|reason| {
                    ConfigError::InvalidUpstreamAddress {
                        name: name.to_string(),
                        reason,
                    }
                })?;
                let timeout = config
                    .timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_DNS_TIMEOUT);
                Ok(Upstream::Dns(PlainDnsUpstream::new(name, endpoint, timeout)))
            }
            UpstreamKind::DohGet => Ok(Upstream::Doh(DohUpstream::new(
                name,
                &config.address,
                DohMethod::Get,
                proxy,
            )?)),
            UpstreamKind::DohPost => Ok(Upstream::Doh(DohUpstream::new(
                name,
                &config.address,
                DohMethod::Post,
                proxy,
            )?)),
        }
    }
}

/// Every configured upstream plus the built-in `blackhole` and `reject`.
pub fn build_upstreams(config: &Config) -> Result<Vec<Arc<dyn DnsUpstream>>, ConfigError> {
    let mut upstreams: Vec<Arc<dyn DnsUpstream>> =
        vec![Arc::new(Upstream::BlackHole), Arc::new(Upstream::Reject)];

    for (name, upstream_config) in &config.upstreams {
        let upstream = Upstream::from_config(name, upstream_config)?;
        debug!(
            name = %name,
            kind = upstream.kind(),
            address = %upstream_config.address,
            "Upstream configured"
        );
        upstreams.push(Arc::new(upstream));
    }

    Ok(upstreams)
}
