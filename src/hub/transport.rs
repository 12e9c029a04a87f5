//! Transport seam
//!
//! A connection only needs to read one message and write one message at a
//! time. Handshakes and framing belong to whoever implements these traits.

use async_trait::async_trait;

use super::error::TransportError;
use super::message::Message;

/// Read side of a client transport
#[async_trait]
pub trait TransportReader: Send {
    /// Read the next message
    ///
    /// `Ok(None)` means the peer closed the transport cleanly.
    async fn read_message(&mut self) -> Result<Option<Message>, TransportError>;
}

/// Write side of a client transport
#[async_trait]
pub trait TransportWriter: Send {
    /// Write one message
    async fn write_message(&mut self, message: Message) -> Result<(), TransportError>;

    /// Close the write side
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
