//! Frame orchestration: header, block records, optional content checksum.
//!
//! ```text
//! [header: 20 bytes][block record]*[CRC32: 4 bytes, if flagged]
//! ```
//!
//! Blocks are independent, so [`scan_blocks`] plus [`crate::block::decode_block`]
//! is enough to decode any subset of blocks in any order.

pub mod header;

pub use header::{FrameHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC, TRAILER_SIZE};

use crate::block::{decode_block, BlockEncoder, BlockMode, BlockWriter, RecordHeader};
use crate::error::{Error, Result};
use crate::simd::Dispatcher;
use crate::{CompressionLevel, Params};

/// Statistics from a compression operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub blocks_stored: u64,
    pub blocks_compressed: u64,
}

impl CompressStats {
    /// Output size as a fraction of input size
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }
}

/// Compresses whole buffers into frames
pub struct Compressor {
    params: Params,
    dispatcher: Dispatcher,
}

impl Compressor {
    /// Validate `params` and probe the CPU for the matching primitives
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, dispatcher: Dispatcher::new() })
    }

    /// Use a specific set of vector primitives
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Compress `src` into `dst`.
    ///
    /// Never writes past `dst`; a buffer of [`Params::frame_bound`] bytes is
    /// always large enough.
    pub fn compress(&self, src: &[u8], dst: &mut [u8]) -> Result<CompressStats> {
        let level = CompressionLevel::from_level(self.params.level as u8);
        let encoder = BlockEncoder::new(level.search_policy(), self.dispatcher);
        let header = FrameHeader::new(&self.params, src.len() as u64);

        let mut writer = BlockWriter::new(dst);
        writer.write_all(&header.to_bytes())?;

        let mut stats = CompressStats { input_bytes: src.len() as u64, ..Default::default() };
        let mut hasher = crc32fast::Hasher::new();

        for block in src.chunks(self.params.block_size as usize) {
            match encoder.encode_block(block, &mut writer)? {
                BlockMode::Stored => stats.blocks_stored += 1,
                BlockMode::Compressed => stats.blocks_compressed += 1,
            }
            if header.checksum {
                hasher.update(block);
            }
        }

        if header.checksum {
            writer.write_all(&hasher.finalize().to_le_bytes())?;
        }

        stats.output_bytes = writer.position() as u64;
        log::debug!(
            "frame: {} -> {} bytes, {} blocks compressed, {} stored",
            stats.input_bytes,
            stats.output_bytes,
            stats.blocks_compressed,
            stats.blocks_stored
        );

        Ok(stats)
    }
}

/// Location and shape of one block record within a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of the record within the frame
    pub record_offset: usize,
    /// Record length, header included
    pub record_len: usize,
    pub mode: BlockMode,
    /// Decoded length of the block
    pub raw_len: usize,
    /// Byte offset of the block within the decoded content
    pub output_offset: u64,
}

/// Walk a frame's block records without decoding them.
///
/// Checks the header, that every record but the last holds exactly
/// `block_size` bytes, that the records add up to the declared content size,
/// and that nothing but the optional trailer follows.
pub fn scan_blocks(src: &[u8]) -> Result<Vec<BlockInfo>> {
    let header = FrameHeader::parse(src)?;
    let block_size = header.block_size as usize;

    let mut blocks = Vec::new();
    let mut offset = HEADER_SIZE;
    let mut produced = 0u64;

    while produced < header.content_size {
        let record = RecordHeader::parse(&src[offset..])?;

        if record.raw_len > block_size {
            return Err(Error::BlockTooLarge { size: record.raw_len, max: block_size });
        }
        let remaining = header.content_size - produced;
        if record.raw_len as u64 > remaining {
            return Err(Error::ContentSizeMismatch {
                expected: header.content_size,
                found: produced + record.raw_len as u64,
            });
        }
        let expected = remaining.min(block_size as u64) as usize;
        if record.raw_len != expected {
            return Err(Error::BlockLengthMismatch { expected, found: record.raw_len });
        }

        blocks.push(BlockInfo {
            record_offset: offset,
            record_len: record.record_len(),
            mode: record.mode,
            raw_len: record.raw_len,
            output_offset: produced,
        });
        offset += record.record_len();
        produced += record.raw_len as u64;
    }

    let end = offset + header.trailer_len();
    if src.len() < end {
        return Err(Error::UnexpectedEof);
    }
    if src.len() > end {
        return Err(Error::TrailingData(src.len() - end));
    }

    Ok(blocks)
}

/// Decompress a whole frame into `dst`, returning the content length
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let header = FrameHeader::parse(src)?;
    let content_size = usize::try_from(header.content_size).unwrap_or(usize::MAX);
    if content_size > dst.len() {
        return Err(Error::DestinationTooSmall { needed: content_size, available: dst.len() });
    }

    let blocks = scan_blocks(src)?;
    let (mut stored, mut compressed) = (0usize, 0usize);
    for block in &blocks {
        let out = &mut dst[block.output_offset as usize..];
        decode_block(&src[block.record_offset..block.record_offset + block.record_len], out)?;
        match block.mode {
            BlockMode::Stored => stored += 1,
            BlockMode::Compressed => compressed += 1,
        }
    }

    if header.checksum {
        let at = src.len() - TRAILER_SIZE;
        let expected = u32::from_le_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]]);
        let found = crc32fast::hash(&dst[..content_size]);
        if expected != found {
            return Err(Error::ChecksumMismatch { expected, found });
        }
    }

    log::debug!(
        "frame: {} -> {} bytes, {} blocks compressed, {} stored",
        src.len(),
        content_size,
        compressed,
        stored
    );
    Ok(content_size)
}
