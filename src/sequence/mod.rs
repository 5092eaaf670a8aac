//! Token streams and their mapping onto fixed symbol alphabets.
//!
//! Match lengths and offsets are bucketed into small code alphabets plus
//! verbatim extra bits. The bucket tables are part of the format.

pub mod encoder;
pub mod tables;
pub mod tokens;

pub use encoder::{ExtraBits, Frequencies, SequenceEncoder, SymbolStreams};
pub use tokens::{Token, MIN_MATCH};
