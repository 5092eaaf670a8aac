use super::tables::{
    decode_length, decode_offset, encode_length, encode_offset, LENGTH_CODES, LITERAL_SYMBOLS,
    OFFSET_CODES,
};
use super::tokens::{Token, MIN_MATCH};
use crate::error::{Error, Result};

/// Extra bits written verbatim after a length or offset code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtraBits {
    pub value: u32,
    pub bits: u8,
}

/// A block's tokens split into parallel alphabets.
///
/// Sequence `i` is `lit_len_codes[i]` followed, for every sequence that has a
/// match, by `match_len_codes[i]` and `offset_codes[i]`. Only the final
/// sequence may lack a match, so `match_len_codes` is either as long as
/// `lit_len_codes` or one shorter. `extra` holds one entry per code in
/// emission order: LL, then ML and OF when present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolStreams {
    pub literals: Vec<u8>,
    pub lit_len_codes: Vec<u8>,
    pub match_len_codes: Vec<u8>,
    pub offset_codes: Vec<u8>,
    pub extra: Vec<ExtraBits>,
}

/// Per-alphabet symbol histograms for one block
#[derive(Clone, Debug)]
pub struct Frequencies {
    pub literals: [u32; LITERAL_SYMBOLS],
    pub lit_lens: [u32; LENGTH_CODES],
    pub match_lens: [u32; LENGTH_CODES],
    pub offsets: [u32; OFFSET_CODES],
}

impl Frequencies {
    pub fn new() -> Self {
        Self {
            literals: [0; LITERAL_SYMBOLS],
            lit_lens: [0; LENGTH_CODES],
            match_lens: [0; LENGTH_CODES],
            offsets: [0; OFFSET_CODES],
        }
    }
}

impl Default for Frequencies {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps token streams to [`SymbolStreams`]
pub struct SequenceEncoder;

impl SequenceEncoder {
    /// Encode `tokens`, which must cover `block` exactly.
    ///
    /// Adjacent literal runs are coalesced into one sequence. A token stream
    /// that does not describe `block` is an encoder bug and reported as
    /// [`Error::Internal`].
    pub fn encode(tokens: &[Token], block: &[u8]) -> Result<SymbolStreams> {
        let mut streams = SymbolStreams {
            literals: Vec::with_capacity(block.len()),
            lit_len_codes: Vec::with_capacity(tokens.len() / 2 + 1),
            match_len_codes: Vec::with_capacity(tokens.len() / 2),
            offset_codes: Vec::with_capacity(tokens.len() / 2),
            extra: Vec::with_capacity(tokens.len() * 2),
        };

        let mut pos = 0usize;
        let mut run = 0u32;

        for token in tokens {
            match *token {
                Token::Literals { len } => {
                    let end = pos + len as usize;
                    let bytes = block
                        .get(pos..end)
                        .ok_or_else(|| Error::Internal(format!("literal run past block end at {pos}")))?;
                    streams.literals.extend_from_slice(bytes);
                    run += len;
                    pos = end;
                }
                Token::Match { offset, length } => {
                    if offset == 0 || offset as usize > pos {
                        return Err(Error::Internal(format!(
                            "match offset {offset} at position {pos} reaches before the block"
                        )));
                    }
                    if (length as usize) < MIN_MATCH || pos + length as usize > block.len() {
                        return Err(Error::Internal(format!(
                            "match length {length} at position {pos} is out of range"
                        )));
                    }

                    streams.push_lit_len(run)?;
                    streams.push_match(offset, length)?;
                    run = 0;
                    pos += length as usize;
                }
            }
        }

        if pos != block.len() {
            return Err(Error::Internal(format!(
                "tokens cover {pos} bytes of a {} byte block",
                block.len()
            )));
        }

        // Trailing literals form a final sequence without a match
        if run > 0 {
            streams.push_lit_len(run)?;
        }

        Ok(streams)
    }
}

impl SymbolStreams {
    fn push_lit_len(&mut self, run: u32) -> Result<()> {
        let (code, value, bits) = encode_length(run)
            .ok_or_else(|| Error::Internal(format!("literal run {run} not encodable")))?;
        self.lit_len_codes.push(code);
        self.extra.push(ExtraBits { value, bits });
        Ok(())
    }

    fn push_match(&mut self, offset: u32, length: u32) -> Result<()> {
        let (code, value, bits) = encode_length(length - MIN_MATCH as u32)
            .ok_or_else(|| Error::Internal(format!("match length {length} not encodable")))?;
        self.match_len_codes.push(code);
        self.extra.push(ExtraBits { value, bits });

        let (code, value, bits) = encode_offset(offset)
            .ok_or_else(|| Error::Internal(format!("offset {offset} not encodable")))?;
        self.offset_codes.push(code);
        self.extra.push(ExtraBits { value, bits });
        Ok(())
    }

    /// Number of sequences
    pub fn num_sequences(&self) -> usize {
        self.lit_len_codes.len()
    }

    /// Count symbol frequencies for each alphabet
    pub fn frequencies(&self) -> Frequencies {
        let mut freq = Frequencies::new();
        for &byte in &self.literals {
            freq.literals[byte as usize] += 1;
        }
        for &code in &self.lit_len_codes {
            freq.lit_lens[code as usize] += 1;
        }
        for &code in &self.match_len_codes {
            freq.match_lens[code as usize] += 1;
        }
        for &code in &self.offset_codes {
            freq.offsets[code as usize] += 1;
        }
        freq
    }

    /// Rebuild the token stream and its literal bytes.
    ///
    /// Inverse of [`SequenceEncoder::encode`]: literal runs come back
    /// coalesced, zero-length runs are dropped.
    pub fn decode(&self) -> Result<(Vec<Token>, Vec<u8>)> {
        let sequences = self.lit_len_codes.len();
        let matches = self.match_len_codes.len();
        if matches != self.offset_codes.len() || !(matches == sequences || matches + 1 == sequences)
        {
            return Err(Error::Internal(format!(
                "{sequences} sequences with {matches} match lengths and {} offsets",
                self.offset_codes.len()
            )));
        }

        let mut tokens = Vec::with_capacity(sequences + matches);
        let mut extra = self.extra.iter();
        let mut next_extra = || extra.next().map(|e| e.value).ok_or(Error::UnexpectedEof);
        let mut literal_total = 0usize;

        for i in 0..sequences {
            let code = self.lit_len_codes[i] as u16;
            let run = decode_length(code, next_extra()?).ok_or(Error::InvalidLengthCode(code))?;
            if run > 0 {
                tokens.push(Token::Literals { len: run });
                literal_total += run as usize;
            }

            if i < matches {
                let code = self.match_len_codes[i] as u16;
                let length =
                    decode_length(code, next_extra()?).ok_or(Error::InvalidLengthCode(code))?;
                let code = self.offset_codes[i] as u16;
                let offset =
                    decode_offset(code, next_extra()?).ok_or(Error::InvalidOffsetCode(code))?;
                tokens.push(Token::Match { offset, length: length + MIN_MATCH as u32 });
            }
        }

        if literal_total != self.literals.len() {
            return Err(Error::BlockLengthMismatch {
                expected: literal_total,
                found: self.literals.len(),
            });
        }

        Ok((tokens, self.literals.clone()))
    }
}
