pub mod decoder;
pub mod encoder;
pub mod tables;

pub use decoder::HuffmanDecoder;
pub use encoder::{HuffmanEncoder, HuffmanTable, MAX_CODE_LENGTH};
pub use tables::TableSet;
