use thiserror::Error;

/// Errors raised while resolving a single query.
///
/// None of these are fatal: the query that hit one gets no reply and the
/// service keeps serving.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Malformed DNS query: {0}")]
    MalformedQuery(String),

    #[error("Unsupported query type {0} for static result")]
    UnsupportedQueryType(String),

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport error with {server}: {reason}")]
    TransportError { server: String, reason: String },

    #[error("DoH request failed: {0}")]
    DohRequest(String),

    #[error("DoH server returned HTTP {status}: {cause}")]
    DohStatus { status: u16, cause: &'static str },

    #[error("Unknown upstream: {0}")]
    UnknownUpstream(String),

    #[error("A reply was already written for this query")]
    ReplyAlreadyWritten,

    #[error("I/O error: {0}")]
    IoError(String),
}
