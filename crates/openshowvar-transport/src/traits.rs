use bytes::Bytes;

use crate::error::Result;

/// A connected, half-duplex byte transport.
///
/// The protocol is strictly one request followed by one response, so the
/// contract is just "write these bytes" and "give me the next chunk".
pub trait Transport {
    /// Write exactly `bytes` to the stream.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until at least one chunk of data is available and return up to
    /// `max_bytes` of it.
    ///
    /// Returns `Err(TransportError::ConnectionClosed)` if the peer closed the
    /// stream before sending anything.
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        (**self).receive(max_bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        (**self).receive(max_bytes)
    }
}
