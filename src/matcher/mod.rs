//! LZ77 match finding over a single block.
//!
//! A hash-chain index over 4-byte windows feeds either a greedy parse
//! (levels 1-3) or a parse with one-step lazy lookahead (levels 4-9).

pub mod hash_chain;
pub mod policy;

pub use hash_chain::{Match, MatchFinder, MatchStats, HASH_LOG};
pub use policy::SearchPolicy;
