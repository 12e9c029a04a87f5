//! Opaque message payload
//!
//! The hub never looks inside a message. Payloads are reference-counted so
//! fanning one message out to many connections does not copy it.

use bytes::Bytes;
use std::fmt;

/// An opaque byte payload routed through the hub
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(Bytes);

impl Message {
    /// Create a message from anything convertible into bytes
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Borrow the raw payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the message, returning the payload
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Bytes> for Message {
    fn from(payload: Bytes) -> Self {
        Self(payload)
    }
}

impl From<Vec<u8>> for Message {
    fn from(payload: Vec<u8>) -> Self {
        Self(Bytes::from(payload))
    }
}

impl From<String> for Message {
    fn from(payload: String) -> Self {
        Self(Bytes::from(payload))
    }
}

impl From<&'static str> for Message {
    fn from(payload: &'static str) -> Self {
        Self(Bytes::from_static(payload.as_bytes()))
    }
}

/// Lossy UTF-8 rendering, used by diagnostics only
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
