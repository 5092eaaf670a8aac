use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Capacity errors
    #[error("Destination buffer too small: need {needed} bytes, have {available}")]
    DestinationTooSmall { needed: usize, available: usize },

    // Parameter errors
    #[error("Invalid compression level: {0} (expected 1-9)")]
    InvalidLevel(u32),

    #[error("Invalid block size: {0} (expected {min}-{max})", min = crate::MIN_BLOCK_SIZE, max = crate::MAX_BLOCK_SIZE)]
    InvalidBlockSize(u32),

    // Frame header errors
    #[error("Invalid frame magic: expected 0x{expected:08x}, got 0x{found:08x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("Unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("Frame header CRC mismatch: expected 0x{expected:08x}, got 0x{found:08x}")]
    HeaderCrcMismatch { expected: u32, found: u32 },

    // Block record errors
    #[error("Invalid block mode: {0}")]
    InvalidBlockMode(u8),

    #[error("Block length mismatch: expected {expected} bytes, got {found}")]
    BlockLengthMismatch { expected: usize, found: usize },

    #[error("Block too large: {size} bytes exceeds maximum {max}")]
    BlockTooLarge { size: usize, max: usize },

    #[error("Declared content size {0} is not reachable from the frame")]
    ImplausibleContentSize(u64),

    #[error("Content size mismatch: header declares {expected} bytes, frame holds {found}")]
    ContentSizeMismatch { expected: u64, found: u64 },

    #[error("{0} trailing bytes after end of frame")]
    TrailingData(usize),

    // Huffman errors
    #[error("Invalid Huffman code length: {0} (max 15)")]
    InvalidCodeLength(u8),

    #[error("Huffman code oversubscribed: more codes than possible for bit length")]
    HuffmanOversubscribed,

    #[error("Huffman code incomplete: table has no symbols")]
    HuffmanIncomplete,

    #[error("Invalid Huffman code: 0x{0:x} resolves to no symbol")]
    InvalidHuffmanCode(u32),

    #[error("Invalid table count: {count} exceeds alphabet size {max}")]
    InvalidTableCount { count: usize, max: usize },

    // Sequence errors
    #[error("Invalid length code: {0}")]
    InvalidLengthCode(u16),

    #[error("Invalid offset code: {0}")]
    InvalidOffsetCode(u16),

    #[error("Back-reference offset {offset} exceeds available output {available}")]
    InvalidBackReference { offset: usize, available: usize },

    // Integrity errors
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{found:08x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
