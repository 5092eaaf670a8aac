use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::tables::TableSet;
use crate::bits::BitWriter;
use crate::error::{Error, Result};
use crate::sequence::tables::decode_length;
use crate::sequence::SymbolStreams;

/// Maximum code length for the four block alphabets
pub const MAX_CODE_LENGTH: u8 = 15;

/// Compute Huffman code lengths for given frequencies with a maximum length limit.
///
/// Returns a vector of code lengths (0 for unused symbols).
pub fn compute_code_lengths(frequencies: &[u32], max_bits: u8) -> Vec<u8> {
    let n = frequencies.len();
    let symbols: Vec<(usize, u32)> =
        frequencies.iter().enumerate().filter(|(_, &f)| f > 0).map(|(i, &f)| (i, f)).collect();

    let mut lengths = vec![0u8; n];
    match symbols.len() {
        0 => return lengths,
        1 => {
            lengths[symbols[0].0] = 1;
            return lengths;
        }
        _ => {}
    }

    let depths = build_tree_depths(&symbols);
    for (&(sym, _), &depth) in symbols.iter().zip(&depths) {
        lengths[sym] = depth.min(u8::MAX as usize) as u8;
    }

    limit_code_lengths(&mut lengths, frequencies, max_bits);
    lengths
}

/// Leaf depths of an unconstrained Huffman tree, in `symbols` order.
///
/// Nodes live in an index arena: leaves first, then internal nodes in
/// creation order, so every parent has a higher index than its children.
fn build_tree_depths(symbols: &[(usize, u32)]) -> Vec<usize> {
    let leaves = symbols.len();
    let mut parent = vec![usize::MAX; 2 * leaves - 1];

    // (freq, node) ordering keeps equal-frequency merges deterministic
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> =
        symbols.iter().enumerate().map(|(node, &(_, freq))| Reverse((freq as u64, node))).collect();

    let mut next = leaves;
    while let (Some(Reverse((fa, a))), Some(Reverse((fb, b)))) = (heap.pop(), heap.pop()) {
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((fa + fb, next)));
        next += 1;
    }

    let root = next - 1;
    let mut depth = vec![0usize; next];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    depth.truncate(leaves);
    depth
}

/// Clamp lengths to `max_bits`, then lengthen codes until the Kraft sum fits.
///
/// Each step lengthens the longest code still below the cap, picking the
/// least frequent symbol among equals.
fn limit_code_lengths(lengths: &mut [u8], frequencies: &[u32], max_bits: u8) {
    if lengths.iter().all(|&l| l <= max_bits) {
        return;
    }

    let capacity = 1u64 << max_bits;
    let mut kraft = 0u64;
    for len in lengths.iter_mut().filter(|l| **l > 0) {
        *len = (*len).min(max_bits);
        kraft += 1 << (max_bits - *len);
    }

    while kraft > capacity {
        let victim = lengths
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > 0 && l < max_bits)
            .max_by_key(|&(sym, &l)| (l, Reverse(frequencies[sym]), Reverse(sym)))
            .map(|(sym, _)| sym);

        match victim {
            Some(sym) => {
                kraft -= 1 << (max_bits - lengths[sym] - 1);
                lengths[sym] += 1;
            }
            // Only reachable with more symbols than 2^max_bits
            None => break,
        }
    }
}

/// Build canonical Huffman codes from code lengths
pub(crate) fn build_codes_from_lengths(lengths: &[u8]) -> Vec<(u32, u8)> {
    let max_bits = *lengths.iter().max().unwrap_or(&0);

    // Count codes of each length
    let mut bl_count = vec![0u32; max_bits as usize + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    // Compute first code for each bit length
    let mut next_code = vec![0u32; max_bits as usize + 1];
    let mut code = 0u32;
    for bits in 1..=max_bits as usize {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    // Assign codes to symbols
    let mut codes = vec![(0u32, 0u8); lengths.len()];
    for (sym, &len) in lengths.iter().enumerate() {
        if len > 0 {
            codes[sym] = (next_code[len as usize], len);
            next_code[len as usize] += 1;
        }
    }

    codes
}

/// Canonical code for one alphabet
#[derive(Clone, Debug)]
pub struct HuffmanTable {
    lengths: Vec<u8>,
    codes: Vec<(u32, u8)>,
}

impl HuffmanTable {
    /// Build a length-limited table from symbol frequencies
    pub fn from_frequencies(frequencies: &[u32], max_bits: u8) -> Self {
        Self::from_lengths(compute_code_lengths(frequencies, max_bits))
    }

    pub fn from_lengths(lengths: Vec<u8>) -> Self {
        let codes = build_codes_from_lengths(&lengths);
        Self { lengths, codes }
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// `(code, length)` for `symbol`; length 0 means the symbol has no code
    pub fn code(&self, symbol: usize) -> (u32, u8) {
        self.codes.get(symbol).copied().unwrap_or((0, 0))
    }

    /// Write one symbol
    #[inline]
    pub fn write_symbol(&self, writer: &mut BitWriter, symbol: usize) -> Result<()> {
        let (code, len) = self.code(symbol);
        if len == 0 {
            return Err(Error::Internal(format!("symbol {symbol} has no code")));
        }
        writer.write_bits_reversed(code, len);
        Ok(())
    }

    /// Bit-pack a symbol sequence
    pub fn pack(&self, writer: &mut BitWriter, symbols: &[u16]) -> Result<()> {
        for &sym in symbols {
            self.write_symbol(writer, sym as usize)?;
        }
        Ok(())
    }

    /// Bits needed to encode symbols with these frequencies
    pub fn cost(&self, frequencies: &[u32]) -> u64 {
        frequencies.iter().zip(&self.lengths).map(|(&f, &l)| f as u64 * l as u64).sum()
    }
}

/// Entropy-codes a block's symbol streams into a compressed payload
pub struct HuffmanEncoder {
    max_code_length: u8,
}

impl HuffmanEncoder {
    pub fn new() -> Self {
        Self { max_code_length: MAX_CODE_LENGTH }
    }

    /// Build the four tables, write the table set, then the interleaved
    /// sequences. The result is byte-aligned.
    pub fn encode(&self, streams: &SymbolStreams) -> Result<Vec<u8>> {
        let freq = streams.frequencies();
        let literals = HuffmanTable::from_frequencies(&freq.literals, self.max_code_length);
        let lit_lens = HuffmanTable::from_frequencies(&freq.lit_lens, self.max_code_length);
        let match_lens = HuffmanTable::from_frequencies(&freq.match_lens, self.max_code_length);
        let offsets = HuffmanTable::from_frequencies(&freq.offsets, self.max_code_length);

        let mut writer = BitWriter::with_capacity(streams.literals.len() + 64);

        let table_set = TableSet {
            literals: literals.lengths().to_vec(),
            lit_lens: lit_lens.lengths().to_vec(),
            match_lens: match_lens.lengths().to_vec(),
            offsets: offsets.lengths().to_vec(),
        };
        table_set.serialize(&mut writer);
        let table_bytes = writer.len();

        let matches = streams.match_len_codes.len();
        let mut extra = streams.extra.iter();
        let mut next_extra =
            || extra.next().ok_or_else(|| Error::Internal("extra bits stream exhausted".into()));
        let mut literal_pos = 0usize;

        for (i, &ll_code) in streams.lit_len_codes.iter().enumerate() {
            lit_lens.write_symbol(&mut writer, ll_code as usize)?;
            let ll_extra = next_extra()?;
            writer.write_bits(ll_extra.value, ll_extra.bits);

            let run = decode_length(ll_code as u16, ll_extra.value)
                .ok_or(Error::InvalidLengthCode(ll_code as u16))? as usize;
            let run_bytes = streams
                .literals
                .get(literal_pos..literal_pos + run)
                .ok_or_else(|| Error::Internal("literal stream shorter than runs".into()))?;
            for &byte in run_bytes {
                literals.write_symbol(&mut writer, byte as usize)?;
            }
            literal_pos += run;

            if i < matches {
                match_lens.write_symbol(&mut writer, streams.match_len_codes[i] as usize)?;
                let ml_extra = next_extra()?;
                writer.write_bits(ml_extra.value, ml_extra.bits);

                offsets.write_symbol(&mut writer, streams.offset_codes[i] as usize)?;
                let of_extra = next_extra()?;
                writer.write_bits(of_extra.value, of_extra.bits);
            }
        }

        let payload = writer.finish();
        log::trace!(
            "entropy coded {} sequences, {} literals: table set {} bytes, payload {} bytes",
            streams.num_sequences(),
            streams.literals.len(),
            table_bytes,
            payload.len()
        );
        Ok(payload)
    }
}

impl Default for HuffmanEncoder {
    fn default() -> Self {
        Self::new()
    }
}
