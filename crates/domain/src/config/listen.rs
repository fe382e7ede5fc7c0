use super::errors::ConfigError;
use crate::dns_protocol::TransportProtocol;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListenKind {
    Udp,
    Tcp,
}

impl ListenKind {
    pub fn protocol(&self) -> TransportProtocol {
        match self {
            Self::Udp => TransportProtocol::Udp,
            Self::Tcp => TransportProtocol::Tcp,
        }
    }
}

/// One listening endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(rename = "type")]
    pub kind: ListenKind,

    pub address: String,
}

impl ListenConfig {
    pub fn new(kind: ListenKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidListenAddress {
                address: self.address.clone(),
                reason: e.to_string(),
            })
    }
}
