use dohproxy_domain::{DomainError, TransportAddr};
use hickory_proto::op::Message;

/// Sink for the single reply to an inbound query.
///
/// Implementations accept at most one reply; a second write fails with
/// [`DomainError::ReplyAlreadyWritten`].
pub trait ResponseWriter: Send {
    fn local_addr(&self) -> TransportAddr;

    fn remote_addr(&self) -> TransportAddr;

    /// Write an already encoded DNS message.
    fn write_bytes(&mut self, bytes: Vec<u8>) -> Result<(), DomainError>;

    fn write_message(&mut self, message: &Message) -> Result<(), DomainError> {
        let bytes = message
            .to_vec()
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;
        self.write_bytes(bytes)
    }
}
