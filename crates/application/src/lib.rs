//! dohproxy application layer: ports and the per-query use case.

pub mod ports;
pub mod services;
pub mod use_cases;
