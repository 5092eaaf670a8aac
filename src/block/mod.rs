//! Block records: one independently decodable slice of the input.
//!
//! ```text
//! stored:     [0][raw_len: u32][raw bytes]
//! compressed: [1][raw_len: u32][payload_len: u32][payload]
//! ```

pub mod compressed;
pub mod constants;
pub mod writer;

pub use constants::*;
pub use writer::BlockWriter;

use crate::error::{Error, Result};
use crate::matcher::SearchPolicy;
use crate::simd::Dispatcher;

/// How a block record stores its bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockMode {
    Stored = MODE_STORED,
    Compressed = MODE_COMPRESSED,
}

impl BlockMode {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            MODE_STORED => Ok(Self::Stored),
            MODE_COMPRESSED => Ok(Self::Compressed),
            other => Err(Error::InvalidBlockMode(other)),
        }
    }

    /// Size of the record header for this mode
    pub fn overhead(&self) -> usize {
        match self {
            Self::Stored => STORED_OVERHEAD,
            Self::Compressed => COMPRESSED_OVERHEAD,
        }
    }
}

/// Parsed block record header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub mode: BlockMode,
    /// Original length of the block
    pub raw_len: usize,
    /// Bytes following the header (raw bytes or payload)
    pub body_len: usize,
}

impl RecordHeader {
    /// Parse a record header from the start of `src`.
    ///
    /// Checks only that the header itself and the body it announces fit in
    /// `src`; the body is not examined.
    pub fn parse(src: &[u8]) -> Result<Self> {
        let mode = BlockMode::from_byte(*src.first().ok_or(Error::UnexpectedEof)?)?;
        let header = src.get(..mode.overhead()).ok_or(Error::UnexpectedEof)?;
        let raw_len = read_u32_le(header, 1) as usize;
        let body_len = match mode {
            BlockMode::Stored => raw_len,
            BlockMode::Compressed => read_u32_le(header, 5) as usize,
        };

        let header = Self { mode, raw_len, body_len };
        if src.len() < header.record_len() {
            return Err(Error::UnexpectedEof);
        }
        Ok(header)
    }

    /// Total record length, header included
    pub fn record_len(&self) -> usize {
        self.mode.overhead() + self.body_len
    }
}

fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Encodes blocks, choosing stored or compressed per block
pub struct BlockEncoder {
    policy: SearchPolicy,
    dispatcher: Dispatcher,
}

impl BlockEncoder {
    pub fn new(policy: SearchPolicy, dispatcher: Dispatcher) -> Self {
        Self { policy, dispatcher }
    }

    /// Encode one block into `out`, returning the mode used.
    ///
    /// The compressed record is kept only if it is strictly smaller than the
    /// stored one.
    pub fn encode_block(&self, block: &[u8], out: &mut BlockWriter<'_>) -> Result<BlockMode> {
        let stored_len = STORED_OVERHEAD + block.len();

        let payload = if block.len() > COMPRESSED_OVERHEAD - STORED_OVERHEAD {
            Some(compressed::encode_payload(block, self.policy, self.dispatcher)?)
        } else {
            None
        };

        match payload {
            Some(payload) if COMPRESSED_OVERHEAD + payload.len() < stored_len => {
                log::debug!(
                    "block: {} bytes compressed to {} (payload {})",
                    block.len(),
                    COMPRESSED_OVERHEAD + payload.len(),
                    payload.len()
                );
                out.write_compressed(block.len(), &payload)?;
                Ok(BlockMode::Compressed)
            }
            payload => {
                log::debug!(
                    "block: {} bytes stored (compressed payload would be {})",
                    block.len(),
                    payload.map_or(0, |p| p.len())
                );
                out.write_stored(block)?;
                Ok(BlockMode::Stored)
            }
        }
    }
}

/// Decode one record from the start of `record` into `dst`.
///
/// `dst` must hold at least the record's raw length; exactly that many bytes
/// are written. Returns the parsed header, whose [`RecordHeader::record_len`]
/// is the number of bytes consumed from `record`.
pub fn decode_block(record: &[u8], dst: &mut [u8]) -> Result<RecordHeader> {
    let header = RecordHeader::parse(record)?;
    if header.raw_len > dst.len() {
        return Err(Error::DestinationTooSmall { needed: header.raw_len, available: dst.len() });
    }

    let body = &record[header.mode.overhead()..header.record_len()];
    let dst = &mut dst[..header.raw_len];
    match header.mode {
        BlockMode::Stored => dst.copy_from_slice(body),
        BlockMode::Compressed => compressed::decode_payload(body, dst)?,
    }
    Ok(header)
}
