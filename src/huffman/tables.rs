//! Serialized code-length tables for one compressed block.
//!
//! Layout (LSB-first):
//! - used symbol count per alphabet: literals 9 bits, literal lengths 6,
//!   match lengths 6, offsets 5
//! - HCLEN - 4 (4 bits), then HCLEN code-length code lengths, 3 bits each,
//!   in [`CODE_LENGTH_ORDER`]
//! - the concatenated code lengths, RLE-coded with symbols 16/17/18 and
//!   Huffman coded with the code-length code

use super::decoder::{check_lengths, HuffmanDecoder};
use super::encoder::{build_codes_from_lengths, compute_code_lengths};
use crate::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::sequence::tables::{LENGTH_CODES, LITERAL_SYMBOLS, OFFSET_CODES};

/// Maximum code length for the code length alphabet
const MAX_CL_CODE_LENGTH: u8 = 7;

/// Number of symbols in the code length alphabet
const CL_SYMBOLS: usize = 19;

/// Order of code length alphabet in the serialized table set
pub const CODE_LENGTH_ORDER: [usize; CL_SYMBOLS] =
    [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

/// Alphabet sizes, in serialization order
const ALPHABET_SIZES: [usize; 4] = [LITERAL_SYMBOLS, LENGTH_CODES, LENGTH_CODES, OFFSET_CODES];

/// Width of each alphabet's used-count field, in serialization order
const COUNT_BITS: [u8; 4] = [9, 6, 6, 5];

/// Code lengths for the four alphabets of a compressed block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSet {
    pub literals: Vec<u8>,
    pub lit_lens: Vec<u8>,
    pub match_lens: Vec<u8>,
    pub offsets: Vec<u8>,
}

impl TableSet {
    fn alphabets(&self) -> [&[u8]; 4] {
        [&self.literals, &self.lit_lens, &self.match_lens, &self.offsets]
    }

    /// Write the table set
    pub fn serialize(&self, writer: &mut BitWriter) {
        let alphabets = self.alphabets();
        let counts: Vec<usize> = alphabets.iter().map(|lengths| used_count(lengths)).collect();

        for (&count, &bits) in counts.iter().zip(COUNT_BITS.iter()) {
            writer.write_bits(count as u32, bits);
        }

        let combined: Vec<u8> = alphabets
            .iter()
            .zip(&counts)
            .flat_map(|(lengths, &count)| lengths[..count].iter().copied())
            .collect();
        let rle_encoded = rle_encode_lengths(&combined);

        // Count frequencies of code length symbols (0-18)
        let mut cl_freq = [0u32; CL_SYMBOLS];
        for &(sym, _) in &rle_encoded {
            cl_freq[sym as usize] += 1;
        }

        let cl_lengths = compute_code_lengths(&cl_freq, MAX_CL_CODE_LENGTH);
        let cl_codes = build_codes_from_lengths(&cl_lengths);

        // Code lengths are sent in special order, find last non-zero
        let hclen = (0..CL_SYMBOLS)
            .rev()
            .find(|&i| cl_lengths[CODE_LENGTH_ORDER[i]] > 0)
            .map_or(4, |i| i + 1)
            .max(4);

        writer.write_bits((hclen - 4) as u32, 4);
        for &sym in CODE_LENGTH_ORDER.iter().take(hclen) {
            writer.write_bits(cl_lengths[sym] as u32, 3);
        }

        for &(sym, extra) in &rle_encoded {
            let (code, len) = cl_codes[sym as usize];
            writer.write_bits_reversed(code, len);

            match sym {
                16 => writer.write_bits(extra as u32, 2), // 3-6 repeats
                17 => writer.write_bits(extra as u32, 3), // 3-10 zeros
                18 => writer.write_bits(extra as u32, 7), // 11-138 zeros
                _ => {}
            }
        }
    }

    /// Read and validate a table set.
    ///
    /// Each alphabet must form a complete or under-full prefix code; unused
    /// trailing symbols come back as zero lengths.
    pub fn deserialize(reader: &mut BitReader<'_>) -> Result<Self> {
        let mut counts = [0usize; 4];
        for i in 0..4 {
            let count = reader.read_bits(COUNT_BITS[i])? as usize;
            if count > ALPHABET_SIZES[i] {
                return Err(Error::InvalidTableCount { count, max: ALPHABET_SIZES[i] });
            }
            counts[i] = count;
        }

        let hclen = reader.read_bits(4)? as usize + 4;
        let mut cl_lengths = [0u8; CL_SYMBOLS];
        for &sym in CODE_LENGTH_ORDER.iter().take(hclen) {
            cl_lengths[sym] = reader.read_bits(3)? as u8;
        }

        let total: usize = counts.iter().sum();
        let mut combined: Vec<u8> = Vec::with_capacity(total);

        if total > 0 {
            let cl_decoder = HuffmanDecoder::from_code_lengths(&cl_lengths)?;

            while combined.len() < total {
                let sym = cl_decoder.decode(reader)?;
                let (value, repeat) = match sym {
                    0..=15 => (sym as u8, 1),
                    16 => {
                        let prev = *combined.last().ok_or(Error::HuffmanIncomplete)?;
                        (prev, reader.read_bits(2)? as usize + 3)
                    }
                    17 => (0, reader.read_bits(3)? as usize + 3),
                    18 => (0, reader.read_bits(7)? as usize + 11),
                    _ => return Err(Error::InvalidCodeLength(sym as u8)),
                };

                if combined.len() + repeat > total {
                    return Err(Error::InvalidTableCount { count: combined.len() + repeat, max: total });
                }
                combined.resize(combined.len() + repeat, value);
            }
        }

        let mut start = 0;
        let mut take = |i: usize| {
            let mut lengths = combined[start..start + counts[i]].to_vec();
            start += counts[i];
            lengths.resize(ALPHABET_SIZES[i], 0);
            lengths
        };

        let table_set =
            TableSet { literals: take(0), lit_lens: take(1), match_lens: take(2), offsets: take(3) };

        for lengths in table_set.alphabets() {
            check_lengths(lengths)?;
        }

        Ok(table_set)
    }
}

/// Number of symbols up to and including the last one with a code
fn used_count(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l > 0).map_or(0, |i| i + 1)
}

/// RLE encode code lengths using symbols 16, 17, 18
fn rle_encode_lengths(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];

        // Count consecutive same values
        let mut run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        if len == 0 {
            // Encode runs of zeros with symbols 17 or 18
            while run > 0 {
                if run >= 11 {
                    let count = run.min(138);
                    result.push((18, (count - 11) as u8));
                    run -= count;
                } else if run >= 3 {
                    let count = run.min(10);
                    result.push((17, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push((0, 0));
                    run -= 1;
                }
            }
        } else {
            // Output the first length, repeat with symbol 16
            result.push((len, 0));
            run -= 1;

            while run > 0 {
                if run >= 3 {
                    let count = run.min(6);
                    result.push((16, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push((len, 0));
                    run -= 1;
                }
            }
        }
    }

    result
}
