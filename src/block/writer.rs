use super::constants::*;
use crate::error::{Error, Result};

/// Writes block records (and the frame pieces around them) into a
/// caller-provided buffer.
///
/// Every write is bounds-checked against the buffer; running out of room is
/// reported as [`Error::DestinationTooSmall`] and leaves the position
/// unchanged.
pub struct BlockWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> BlockWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Write raw bytes
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(Error::DestinationTooSmall { needed: end, available: self.buf.len() });
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Write a stored record: mode, raw length, raw bytes
    pub fn write_stored(&mut self, raw: &[u8]) -> Result<()> {
        self.reserve(STORED_OVERHEAD + raw.len())?;
        self.write_all(&[MODE_STORED])?;
        self.write_all(&(raw.len() as u32).to_le_bytes())?;
        self.write_all(raw)
    }

    /// Write a compressed record: mode, raw length, payload length, payload
    pub fn write_compressed(&mut self, raw_len: usize, payload: &[u8]) -> Result<()> {
        self.reserve(COMPRESSED_OVERHEAD + payload.len())?;
        self.write_all(&[MODE_COMPRESSED])?;
        self.write_all(&(raw_len as u32).to_le_bytes())?;
        self.write_all(&(payload.len() as u32).to_le_bytes())?;
        self.write_all(payload)
    }

    /// Records are written whole or not at all
    fn reserve(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::DestinationTooSmall {
                needed: self.pos + len,
                available: self.buf.len(),
            });
        }
        Ok(())
    }
}
