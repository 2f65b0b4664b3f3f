//! Message bodies as opaque byte buffers.
//!
//! The binding layer never inspects a body beyond its size, its string form and
//! closing it. Bodies are created through a [`BodyFactory`] so callers can swap
//! in their own buffer implementation.

use bytes::{Bytes, BytesMut};
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error("Body is closed")]
    Closed,
    #[error("Body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Readable/writable message body
pub trait Body: Send + Sync + fmt::Debug {
    /// Size in bytes, `None` once closed
    fn size(&self) -> Option<usize>;

    /// Full contents as a string, regardless of the read position
    fn as_string(&self) -> Result<String, BodyError>;

    /// Full contents as bytes
    fn contents(&self) -> Result<Bytes, BodyError>;

    /// Write at the current position
    fn write(&mut self, content: &[u8]) -> Result<usize, BodyError>;

    /// Move the position back to the start
    fn rewind(&mut self);

    /// Release the underlying buffer
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

pub type BoxBody = Box<dyn Body>;

/// Wire-level HTTP request carrying a closable body
pub type WireRequest = http::Request<BoxBody>;

/// Wire-level HTTP response carrying a closable body
pub type WireResponse = http::Response<BoxBody>;

/// In-memory body with a write cursor
#[derive(Debug, Default)]
pub struct BufferBody {
    data: BytesMut,
    position: usize,
    closed: bool,
}

impl BufferBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(content: impl AsRef<[u8]>) -> Self {
        Self {
            data: BytesMut::from(content.as_ref()),
            position: 0,
            closed: false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Body for BufferBody {
    fn size(&self) -> Option<usize> {
        if self.closed {
            None
        } else {
            Some(self.data.len())
        }
    }

    fn as_string(&self) -> Result<String, BodyError> {
        if self.closed {
            return Err(BodyError::Closed);
        }
        Ok(std::str::from_utf8(&self.data)?.to_string())
    }

    fn contents(&self) -> Result<Bytes, BodyError> {
        if self.closed {
            return Err(BodyError::Closed);
        }
        Ok(Bytes::copy_from_slice(&self.data))
    }

    /// Overwrites from the current position, then extends the buffer
    fn write(&mut self, content: &[u8]) -> Result<usize, BodyError> {
        if self.closed {
            return Err(BodyError::Closed);
        }
        let overlap = (self.data.len() - self.position).min(content.len());
        self.data[self.position..self.position + overlap].copy_from_slice(&content[..overlap]);
        self.data.extend_from_slice(&content[overlap..]);
        self.position += content.len();
        Ok(content.len())
    }

    fn rewind(&mut self) {
        self.position = 0;
    }

    fn close(&mut self) {
        self.data = BytesMut::new();
        self.position = 0;
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Creates bodies for requests and scratch buffers
pub trait BodyFactory: Send + Sync + fmt::Debug {
    fn create_body(&self, content: Bytes) -> BoxBody;

    fn create_empty(&self) -> BoxBody {
        self.create_body(Bytes::new())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BufferBodyFactory;

impl BodyFactory for BufferBodyFactory {
    fn create_body(&self, content: Bytes) -> BoxBody {
        Box::new(BufferBody::from_bytes(content))
    }
}

/// Anything owning a body that must be closed
pub trait CloseBody {
    fn close_body(&mut self);
}

impl CloseBody for BoxBody {
    fn close_body(&mut self) {
        self.close();
    }
}

impl CloseBody for BufferBody {
    fn close_body(&mut self) {
        self.close();
    }
}

impl CloseBody for WireRequest {
    fn close_body(&mut self) {
        self.body_mut().close();
    }
}

impl CloseBody for WireResponse {
    fn close_body(&mut self) {
        self.body_mut().close();
    }
}

/// Closes the guarded body exactly once when dropped
pub struct BodyGuard<T: CloseBody> {
    inner: T,
}

impl<T: CloseBody> BodyGuard<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: CloseBody> Deref for BodyGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: CloseBody> DerefMut for BodyGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: CloseBody> Drop for BodyGuard<T> {
    fn drop(&mut self) {
        self.inner.close_body();
    }
}

impl<T: CloseBody + fmt::Debug> fmt::Debug for BodyGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyGuard").field("inner", &self.inner).finish()
    }
}
