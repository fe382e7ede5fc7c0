//! dohproxy infrastructure: transports, upstreams, cache and the packet handler.

pub mod dns;
