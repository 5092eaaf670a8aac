use crate::bits::BitReader;
use crate::error::{Error, Result};
use crate::huffman::{HuffmanDecoder, HuffmanEncoder, TableSet};
use crate::matcher::{MatchFinder, SearchPolicy};
use crate::sequence::tables::{LENGTH_TABLE, OFFSET_TABLE};
use crate::sequence::{SequenceEncoder, MIN_MATCH};
use crate::simd::{copy_match, Dispatcher};

/// Run match finding, sequence mapping and entropy coding over one block
pub fn encode_payload(block: &[u8], policy: SearchPolicy, dispatcher: Dispatcher) -> Result<Vec<u8>> {
    let mut finder = MatchFinder::new(policy, dispatcher);
    let tokens = finder.find_tokens(block);
    let streams = SequenceEncoder::encode(&tokens, block)?;
    HuffmanEncoder::new().encode(&streams)
}

/// The four per-block decoders
struct BlockDecoders {
    literals: HuffmanDecoder,
    lit_lens: HuffmanDecoder,
    match_lens: HuffmanDecoder,
    offsets: HuffmanDecoder,
}

impl BlockDecoders {
    fn read(reader: &mut BitReader<'_>) -> Result<Self> {
        let tables = TableSet::deserialize(reader)?;
        Ok(Self {
            literals: HuffmanDecoder::from_code_lengths(&tables.literals)?,
            lit_lens: HuffmanDecoder::from_code_lengths(&tables.lit_lens)?,
            match_lens: HuffmanDecoder::from_code_lengths(&tables.match_lens)?,
            offsets: HuffmanDecoder::from_code_lengths(&tables.offsets)?,
        })
    }
}

/// Read a length code and its extra bits
#[inline]
fn read_length(reader: &mut BitReader<'_>, decoder: &HuffmanDecoder) -> Result<usize> {
    let code = decoder.decode(reader)?;
    let &(base, extra_bits) =
        LENGTH_TABLE.get(code as usize).ok_or(Error::InvalidLengthCode(code))?;
    Ok((base + reader.read_bits(extra_bits)?) as usize)
}

/// Read an offset code and its extra bits
#[inline]
fn read_offset(reader: &mut BitReader<'_>, decoder: &HuffmanDecoder) -> Result<usize> {
    let code = decoder.decode(reader)?;
    let &(base, extra_bits) =
        OFFSET_TABLE.get(code as usize).ok_or(Error::InvalidOffsetCode(code))?;
    Ok((base + reader.read_bits(extra_bits)?) as usize)
}

/// Decode a compressed payload into `dst`, which is exactly the block's raw length.
///
/// Sequences are replayed until `dst` is full; the payload must then be
/// exhausted apart from padding in its final byte.
pub fn decode_payload(payload: &[u8], dst: &mut [u8]) -> Result<()> {
    let mut reader = BitReader::new(payload);
    let decoders = BlockDecoders::read(&mut reader)?;
    let raw_len = dst.len();
    let mut out = 0usize;

    while out < raw_len {
        let run = read_length(&mut reader, &decoders.lit_lens)?;
        if run > raw_len - out {
            return Err(Error::BlockLengthMismatch { expected: raw_len, found: out + run });
        }
        for byte in &mut dst[out..out + run] {
            *byte = decoders.literals.decode(&mut reader)? as u8;
        }
        out += run;

        if out == raw_len {
            break;
        }

        let length = read_length(&mut reader, &decoders.match_lens)? + MIN_MATCH;
        let offset = read_offset(&mut reader, &decoders.offsets)?;
        if offset > out {
            return Err(Error::InvalidBackReference { offset, available: out });
        }
        if length > raw_len - out {
            return Err(Error::BlockLengthMismatch { expected: raw_len, found: out + length });
        }
        copy_match(dst, out, offset, length);
        out += length;
    }

    reader.align_to_byte();
    let leftover = reader.bits_remaining() / 8;
    if leftover != 0 {
        return Err(Error::TrailingData(leftover));
    }
    Ok(())
}
