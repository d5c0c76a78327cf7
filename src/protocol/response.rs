//! Response definitions
//!
//! Bytes written back for one request frame. An empty response means
//! nothing is sent.

use bytes::{BufMut, Bytes, BytesMut};

/// NexStar/LX200 terminator
pub const TERMINATOR: u8 = b'#';

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    bytes: Bytes,
}

impl Response {
    /// Nothing to send
    pub fn none() -> Self {
        Self::default()
    }

    /// A bare `#` acknowledgement
    pub fn end() -> Self {
        Self {
            bytes: Bytes::from_static(b"#"),
        }
    }

    /// `payload` followed by `#`
    pub fn terminated(payload: impl AsRef<[u8]>) -> Self {
        let payload = payload.as_ref();
        let mut buf = BytesMut::with_capacity(payload.len() + 1);
        buf.put_slice(payload);
        buf.put_u8(TERMINATOR);
        Self {
            bytes: buf.freeze(),
        }
    }

    /// `payload` as is
    pub fn raw(payload: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(payload.as_ref()),
        }
    }

    /// Responses to several commands of one frame, in order
    pub fn concat(responses: impl IntoIterator<Item = Response>) -> Self {
        let mut buf = BytesMut::new();
        for response in responses {
            buf.put_slice(&response.bytes);
        }
        Self {
            bytes: buf.freeze(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
