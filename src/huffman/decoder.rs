use super::encoder::build_codes_from_lengths;
use crate::bits::{reverse_bits, BitReader};
use crate::error::{Error, Result};

/// Longest code the format allows in any alphabet
const MAX_BITS: u8 = 15;

/// Check that code lengths form a complete or under-full prefix code
pub fn check_lengths(lengths: &[u8]) -> Result<()> {
    let mut bl_count = [0i64; MAX_BITS as usize + 1];
    for &len in lengths {
        if len > MAX_BITS {
            return Err(Error::InvalidCodeLength(len));
        }
        bl_count[len as usize] += 1;
    }

    // Codes still available at each length
    let mut left = 1i64;
    for &count in &bl_count[1..] {
        left = (left << 1) - count;
        if left < 0 {
            return Err(Error::HuffmanOversubscribed);
        }
    }
    Ok(())
}

/// Canonical Huffman decoder
///
/// Single-level lookup table indexed by the next `max_bits` bits of the
/// stream (LSB-first). Each entry packs `(symbol << 8) | length`; zero marks
/// a bit pattern that no code in an under-full table resolves to.
pub struct HuffmanDecoder {
    table: Vec<u32>,
    max_bits: u8,
    num_symbols: usize,
}

impl HuffmanDecoder {
    /// Build from code lengths, rejecting oversubscribed codes
    pub fn from_code_lengths(lengths: &[u8]) -> Result<Self> {
        if lengths.is_empty() {
            return Err(Error::HuffmanIncomplete);
        }
        check_lengths(lengths)?;

        let max_bits = *lengths.iter().max().unwrap_or(&0);
        if max_bits == 0 {
            // All zero-length codes = empty table
            return Ok(Self { table: Vec::new(), max_bits: 0, num_symbols: 0 });
        }

        let codes = build_codes_from_lengths(lengths);
        let size = 1usize << max_bits;
        let mut table = vec![0u32; size];
        let mut num_symbols = 0;

        for (sym, &(code, len)) in codes.iter().enumerate() {
            if len == 0 {
                continue;
            }
            num_symbols += 1;

            // Every index whose low `len` bits spell the reversed code
            let entry = ((sym as u32) << 8) | len as u32;
            let step = 1usize << len;
            let mut idx = reverse_bits(code, len) as usize;
            while idx < size {
                table[idx] = entry;
                idx += step;
            }
        }

        Ok(Self { table, max_bits, num_symbols })
    }

    /// Decode next symbol from bitstream
    #[inline]
    pub fn decode(&self, bits: &mut BitReader<'_>) -> Result<u16> {
        if self.max_bits == 0 {
            return Err(Error::HuffmanIncomplete);
        }

        let peeked = bits.peek_bits(self.max_bits);
        let entry = self.table[peeked as usize];
        if entry == 0 {
            return Err(Error::InvalidHuffmanCode(peeked));
        }

        bits.consume_bits((entry & 0xFF) as u8)?;
        Ok((entry >> 8) as u16)
    }

    /// Decode `count` symbols
    pub fn unpack(&self, bits: &mut BitReader<'_>, count: usize) -> Result<Vec<u16>> {
        (0..count).map(|_| self.decode(bits)).collect()
    }

    /// Check if this decoder is empty (no symbols)
    pub fn is_empty(&self) -> bool {
        self.num_symbols == 0
    }

    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }
}
