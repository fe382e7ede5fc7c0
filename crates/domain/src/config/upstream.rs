use serde::{Deserialize, Serialize};

/// Names that always resolve to the built-in upstreams.
pub const BUILTIN_UPSTREAMS: [&str; 2] = ["blackhole", "reject"];

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamKind {
    Dns,
    #[serde(alias = "doh")]
    DohGet,
    DohPost,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(rename = "type")]
    pub kind: UpstreamKind,

    /// `host:port` for plain DNS, a URL for DoH.
    pub address: String,

    /// Forward HTTP proxy for DoH upstreams.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Exchange timeout for plain DNS upstreams.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}
