use crate::ports::ResponseWriter;
use dohproxy_domain::{DomainError, TransportAddr};

/// In-memory [`ResponseWriter`] that holds the reply until the listener sends it.
#[derive(Debug)]
pub struct ReplyBuffer {
    local: TransportAddr,
    remote: TransportAddr,
    reply: Option<Vec<u8>>,
}

impl ReplyBuffer {
    pub fn new(local: TransportAddr, remote: TransportAddr) -> Self {
        Self {
            local,
            remote,
            reply: None,
        }
    }

    pub fn has_reply(&self) -> bool {
        self.reply.is_some()
    }

    pub fn into_reply(self) -> Option<Vec<u8>> {
        self.reply
    }
}

impl ResponseWriter for ReplyBuffer {
    fn local_addr(&self) -> TransportAddr {
        self.local
    }

    fn remote_addr(&self) -> TransportAddr {
        self.remote
    }

    fn write_bytes(&mut self, bytes: Vec<u8>) -> Result<(), DomainError> {
        if self.reply.is_some() {
            return Err(DomainError::ReplyAlreadyWritten);
        }
        self.reply = Some(bytes);
        Ok(())
    }
}
