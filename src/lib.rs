//! Lossless block compressor.
//!
//! Input is split into fixed-size blocks. Each block is parsed into LZ77
//! tokens with a hash-chain match finder, mapped onto small symbol alphabets
//! and entropy coded with per-block canonical Huffman tables, or stored raw
//! when that is smaller. Blocks never reference each other.
//!
//! ```
//! let data = b"to be or not to be, that is the question".repeat(10);
//! let frame = zyphrax::compress_to_vec(&data, &zyphrax::Params::default()).unwrap();
//! assert!(frame.len() < data.len());
//! assert_eq!(zyphrax::decompress_to_vec(&frame).unwrap(), data);
//! ```

pub mod bits;
pub mod block;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod matcher;
pub mod sequence;
pub mod simd;

pub use block::{decode_block, BlockMode};
pub use error::{Error, Result};
pub use frame::{scan_blocks, BlockInfo, CompressStats, Compressor, FrameHeader};
pub use matcher::SearchPolicy;

use block::STORED_OVERHEAD;
use frame::{HEADER_SIZE, TRAILER_SIZE};

/// Smallest accepted block size
pub const MIN_BLOCK_SIZE: u32 = 64;

/// Largest accepted block size (the frame header stores it in 24 bits)
pub const MAX_BLOCK_SIZE: u32 = 0x00FF_FFFF;

/// Default block size (64 KiB)
pub const DEFAULT_BLOCK_SIZE: u32 = 64 * 1024;

/// Default compression level
pub const DEFAULT_LEVEL: u32 = 3;

/// Compression level (1-9)
///
/// - Levels 1-3: greedy parsing with short hash chains (fastest)
/// - Levels 4-9: lazy parsing with progressively deeper chain walks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionLevel {
    Level1 = 1,
    Level2 = 2,
    #[default]
    Level3 = 3,
    Level4 = 4,
    Level5 = 5,
    Level6 = 6,
    Level7 = 7,
    Level8 = 8,
    Level9 = 9,
}

impl CompressionLevel {
    /// Create from numeric level (1-9), clamped to valid range
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Level1,
            2 => Self::Level2,
            3 => Self::Level3,
            4 => Self::Level4,
            5 => Self::Level5,
            6 => Self::Level6,
            7 => Self::Level7,
            8 => Self::Level8,
            _ => Self::Level9,
        }
    }

    /// Get numeric level (1-9)
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Whether this level uses lazy matching (levels 4-9)
    pub fn use_lazy_matching(&self) -> bool {
        !matches!(self, Self::Level1 | Self::Level2 | Self::Level3)
    }

    /// Match search limits for this level
    pub fn search_policy(&self) -> SearchPolicy {
        SearchPolicy::for_level(self.level() as u32)
    }
}

/// Compression parameters
///
/// Three `u32` fields with no padding, 12 bytes, in this order. `checksum`
/// is a flag: any non-zero value appends a CRC32 of the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Params {
    pub level: u32,
    pub block_size: u32,
    pub checksum: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL, block_size: DEFAULT_BLOCK_SIZE, checksum: 0 }
    }
}

impl Params {
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum as u32;
        self
    }

    /// Check level and block size ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.level) {
            return Err(Error::InvalidLevel(self.level));
        }
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&self.block_size) {
            return Err(Error::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }

    /// Worst-case frame size for `src_size` bytes under these params
    pub fn frame_bound(&self, src_size: usize) -> usize {
        let trailer = if self.checksum != 0 { TRAILER_SIZE } else { 0 };
        worst_case(src_size, self.block_size.max(1) as usize, trailer)
    }
}

/// Every block stored, plus header and trailer
fn worst_case(src_size: usize, block_size: usize, trailer: usize) -> usize {
    let blocks = src_size / block_size + (src_size % block_size != 0) as usize;
    HEADER_SIZE
        .saturating_add(src_size)
        .saturating_add(blocks.saturating_mul(STORED_OVERHEAD))
        .saturating_add(trailer)
}

/// Upper bound on the frame size for any input of `src_size` bytes under any
/// valid [`Params`]
pub fn compress_bound(src_size: usize) -> usize {
    worst_case(src_size, MIN_BLOCK_SIZE as usize, TRAILER_SIZE)
}

/// Compress `src` into `dst`, returning the number of bytes written
pub fn compress(src: &[u8], dst: &mut [u8], params: &Params) -> Result<usize> {
    let stats = Compressor::new(*params)?.compress(src, dst)?;
    Ok(stats.output_bytes as usize)
}

/// Decompress a frame into `dst`, returning the number of bytes written
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    frame::decompress(src, dst)
}

/// Compress into a freshly allocated buffer
pub fn compress_to_vec(src: &[u8], params: &Params) -> Result<Vec<u8>> {
    params.validate()?;
    let mut dst = vec![0u8; params.frame_bound(src.len())];
    let written = compress(src, &mut dst, params)?;
    dst.truncate(written);
    Ok(dst)
}

/// Decompress into a freshly allocated buffer.
///
/// The declared content size is checked against what the frame could
/// possibly hold before anything is allocated.
pub fn decompress_to_vec(src: &[u8]) -> Result<Vec<u8>> {
    let header = FrameHeader::parse(src)?;
    let max_records = (src.len() - HEADER_SIZE) / STORED_OVERHEAD;
    let reachable = (max_records as u64).saturating_mul(header.block_size as u64);
    if header.content_size > reachable {
        return Err(Error::ImplausibleContentSize(header.content_size));
    }

    let mut dst = vec![0u8; header.content_size as usize];
    let written = decompress(src, &mut dst)?;
    dst.truncate(written);
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<Params>(), 12);
        assert_eq!(std::mem::align_of::<Params>(), 4);
    }

    #[test]
    fn test_params_validate() {
        assert!(Params::default().validate().is_ok());
        assert_eq!(Params::default().with_level(0).validate(), Err(Error::InvalidLevel(0)));
        assert_eq!(Params::default().with_level(10).validate(), Err(Error::InvalidLevel(10)));
        assert_eq!(
            Params::default().with_block_size(0).validate(),
            Err(Error::InvalidBlockSize(0))
        );
        assert_eq!(
            Params::default().with_block_size(MAX_BLOCK_SIZE + 1).validate(),
            Err(Error::InvalidBlockSize(MAX_BLOCK_SIZE + 1))
        );
        assert!(Params::default().with_block_size(MIN_BLOCK_SIZE).validate().is_ok());
    }

    #[test]
    fn test_compression_level() {
        assert_eq!(CompressionLevel::from_level(0), CompressionLevel::Level1);
        assert_eq!(CompressionLevel::from_level(200), CompressionLevel::Level9);
        assert_eq!(CompressionLevel::default().level(), DEFAULT_LEVEL as u8);
        assert!(!CompressionLevel::Level3.use_lazy_matching());
        assert!(CompressionLevel::Level4.use_lazy_matching());
        assert_eq!(CompressionLevel::Level4.search_policy(), SearchPolicy::for_level(4));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(compress_bound(0), HEADER_SIZE + TRAILER_SIZE);
        assert_eq!(compress_bound(64), HEADER_SIZE + 64 + 5 + TRAILER_SIZE);
        assert_eq!(compress_bound(65), HEADER_SIZE + 65 + 10 + TRAILER_SIZE);
        let params = Params::default();
        for n in [0usize, 1, 100, 65536, 65537, 1 << 20] {
            assert!(params.frame_bound(n) <= compress_bound(n));
            assert!(compress_bound(n) <= compress_bound(n + 1));
        }
    }

    #[test]
    fn test_invalid_params_rejected_by_compress() {
        let mut dst = vec![0u8; 128];
        let params = Params::default().with_level(12);
        assert_eq!(compress(b"abc", &mut dst, &params), Err(Error::InvalidLevel(12)));
    }

    #[test]
    fn test_implausible_content_size() {
        let params = Params::default().with_block_size(64);
        let header = FrameHeader::new(&params, 1 << 40);
        let mut framed = header.to_bytes().to_vec();
        framed.extend_from_slice(&[0u8; 10]);
        assert_eq!(decompress_to_vec(&framed), Err(Error::ImplausibleContentSize(1 << 40)));
    }
}
