use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Transport family of a DNS exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Udp,
    Tcp,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Udp => "udp",
            TransportProtocol::Tcp => "tcp",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of an inbound exchange, rendered as `udp://1.2.3.4:53`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportAddr {
    pub protocol: TransportProtocol,
    pub addr: SocketAddr,
}

impl TransportAddr {
    pub fn new(protocol: TransportProtocol, addr: SocketAddr) -> Self {
        Self { protocol, addr }
    }
}

impl fmt::Display for TransportAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.addr)
    }
}

/// Represents an upstream server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

impl FromStr for UpstreamAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(UpstreamAddr::Resolved(addr));
        }
        match parse_host_port(s) {
            Some((host, port)) if !host.is_empty() => Ok(UpstreamAddr::Unresolved {
                hostname: host.into(),
                port,
            }),
            _ => Err(format!("Invalid address '{}'. Expected IP:PORT or HOST:PORT", s)),
        }
    }
}

/// Endpoint of a plain-DNS upstream.
///
/// `transport` is `None` when the address carried no `udp://`/`tcp://` prefix, in
/// which case the exchange follows the transport the query arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsEndpoint {
    pub addr: UpstreamAddr,
    pub transport: Option<TransportProtocol>,
}

impl FromStr for DnsEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (transport, rest) = if let Some(rest) = s.strip_prefix("udp://") {
            (Some(TransportProtocol::Udp), rest)
        } else if let Some(rest) = s.strip_prefix("tcp://") {
            (Some(TransportProtocol::Tcp), rest)
        } else {
            (None, s)
        };

        let addr = rest.parse::<UpstreamAddr>()?;
        Ok(DnsEndpoint { addr, transport })
    }
}

impl fmt::Display for DnsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport {
            Some(protocol) => write!(f, "{}://{}", protocol, self.addr),
            None => write!(f, "{}", self.addr),
        }
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}
