use crate::error::{Error, Result};
use crate::{Params, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

/// Frame magic, "YFYX" little-endian
pub const MAGIC: u32 = 0x5859_4659;

/// The only format version this crate reads and writes
pub const FORMAT_VERSION: u8 = 1;

/// Frame header size: magic (4) + descriptor (4) + content size (8) + CRC32 (4)
pub const HEADER_SIZE: usize = 20;

/// Content checksum trailer size (CRC32)
pub const TRAILER_SIZE: usize = 4;

/// Descriptor layout
const BLOCK_SIZE_MASK: u32 = 0x00FF_FFFF;
const LEVEL_SHIFT: u32 = 24;
const LEVEL_MASK: u32 = 0xF;
const CHECKSUM_FLAG: u32 = 1 << 28;
const VERSION_SHIFT: u32 = 29;

/// Parsed frame header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub block_size: u32,
    /// Level the frame was written at (informational)
    pub level: u32,
    /// A CRC32 of the content follows the last block
    pub checksum: bool,
    /// Total original length
    pub content_size: u64,
}

impl FrameHeader {
    pub fn new(params: &Params, content_size: u64) -> Self {
        Self {
            block_size: params.block_size,
            level: params.level,
            checksum: params.checksum != 0,
            content_size,
        }
    }

    fn descriptor(&self) -> u32 {
        let checksum = if self.checksum { CHECKSUM_FLAG } else { 0 };
        (self.block_size & BLOCK_SIZE_MASK)
            | ((self.level & LEVEL_MASK) << LEVEL_SHIFT)
            | checksum
            | ((FORMAT_VERSION as u32) << VERSION_SHIFT)
    }

    /// Serialize the header (20 bytes)
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.descriptor().to_le_bytes());
        out[8..16].copy_from_slice(&self.content_size.to_le_bytes());
        let crc = crc32fast::hash(&out[..16]);
        out[16..20].copy_from_slice(&crc.to_le_bytes());
        out
    }

    /// Parse and validate a header from the start of `src`
    pub fn parse(src: &[u8]) -> Result<Self> {
        let buf = src.get(..HEADER_SIZE).ok_or(Error::UnexpectedEof)?;

        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != MAGIC {
            return Err(Error::InvalidMagic { expected: MAGIC, found: magic });
        }

        let expected_crc = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        let actual_crc = crc32fast::hash(&buf[..16]);
        if expected_crc != actual_crc {
            return Err(Error::HeaderCrcMismatch { expected: expected_crc, found: actual_crc });
        }

        let descriptor = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let version = (descriptor >> VERSION_SHIFT) as u8;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let block_size = descriptor & BLOCK_SIZE_MASK;
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(Error::InvalidBlockSize(block_size));
        }

        let level = (descriptor >> LEVEL_SHIFT) & LEVEL_MASK;
        if !(1..=9).contains(&level) {
            return Err(Error::InvalidLevel(level));
        }

        let mut content_size = [0u8; 8];
        content_size.copy_from_slice(&buf[8..16]);

        Ok(Self {
            block_size,
            level,
            checksum: descriptor & CHECKSUM_FLAG != 0,
            content_size: u64::from_le_bytes(content_size),
        })
    }

    /// Number of block records the frame holds
    pub fn num_blocks(&self) -> u64 {
        let block_size = self.block_size.max(1) as u64;
        self.content_size / block_size + (self.content_size % block_size != 0) as u64
    }

    /// Trailer length implied by the checksum flag
    pub fn trailer_len(&self) -> usize {
        if self.checksum {
            TRAILER_SIZE
        } else {
            0
        }
    }
}
