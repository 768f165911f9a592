//! Byte sink and source for a single plugin message.
//!
//! All multi-byte integers are big-endian. Strings are a 4-byte signed length
//! followed by that many UTF-8 bytes.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Append-only byte sink for one outgoing message.
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    /// Write a collection size or byte length as a 4-byte count.
    ///
    /// # Panics
    /// Panics if `len` does not fit in an `i32`. Such a value can never be
    /// read back by a peer, so producing it is a programming error.
    #[inline]
    pub fn write_len(&mut self, len: usize) {
        let len = match i32::try_from(len) {
            Ok(len) => len,
            Err(_) => panic!("length {len} exceeds the 32-bit wire limit"),
        };
        self.write_i32(len);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_len(value.len());
        self.write_bytes(value.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish the message and hand out its bytes.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Cursor over the bytes of one incoming message.
///
/// Every read checks the remaining length first; a short read fails with
/// [`ProtocolError::UnexpectedEof`] and never panics.
#[derive(Debug, Clone)]
pub struct Reader {
    buf: Bytes,
}

impl Reader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow everything that has not been read yet.
    pub fn remaining_slice(&self) -> &[u8] {
        self.buf.chunk()
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(ProtocolError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    /// Skip `count` bytes that were consumed by an external decoder.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.buf.advance(count);
        Ok(())
    }

    /// Read exactly `len` bytes, failing if fewer are available.
    pub fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    /// Read a 4-byte count, rejecting negative values.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| ProtocolError::NegativeLength(len))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.read_exact(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }
}
