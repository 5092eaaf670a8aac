use crate::error::{Error, Result};

/// Shortest match the match finder emits and the sequence format can carry
pub const MIN_MATCH: usize = 4;

/// One unit of the match finder's output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Copy the next `len` bytes of the block verbatim
    Literals { len: u32 },
    /// A back-reference: copy `length` bytes from `offset` bytes back
    Match { offset: u32, length: u32 },
}

impl Token {
    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Token::Literals { len } => *len as usize,
            Token::Match { length, .. } => *length as usize,
        }
    }
}

/// Total uncompressed size of a token stream
pub fn uncompressed_size(tokens: &[Token]) -> usize {
    tokens.iter().map(Token::uncompressed_size).sum()
}

/// Replay tokens against their literal bytes, rebuilding the block.
///
/// Used to check token streams independently of the entropy-coded path.
pub fn reconstruct(tokens: &[Token], literals: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(uncompressed_size(tokens));
    let mut lit_pos = 0;

    for token in tokens {
        match *token {
            Token::Literals { len } => {
                let end = lit_pos + len as usize;
                let run = literals.get(lit_pos..end).ok_or(Error::UnexpectedEof)?;
                out.extend_from_slice(run);
                lit_pos = end;
            }
            Token::Match { offset, length } => {
                let offset = offset as usize;
                if offset == 0 || offset > out.len() {
                    return Err(Error::InvalidBackReference { offset, available: out.len() });
                }
                let pos = out.len();
                out.resize(pos + length as usize, 0);
                crate::simd::copy_match(&mut out, pos, offset, length as usize);
            }
        }
    }

    if lit_pos != literals.len() {
        return Err(Error::BlockLengthMismatch { expected: lit_pos, found: literals.len() });
    }
    Ok(out)
}
