use crate::error::{Error, Result};

/// Bit-level reader over a compressed payload slice
///
/// Bits are read LSB-first within each byte, matching [`super::BitWriter`].
/// Reading never goes past the end of the slice: running out of input is
/// reported as [`Error::UnexpectedEof`].
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Next byte of `data` to load into the buffer
    pos: usize,
    /// Buffer holding up to 64 bits
    buffer: u64,
    /// Number of valid bits in buffer (0-64)
    bits_available: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, buffer: 0, bits_available: 0 }
    }

    /// Top up the buffer from the slice, up to 64 bits.
    ///
    /// Missing bits past the end of input stay zero, so peeks near the end
    /// of the stream see zero padding rather than failing.
    #[inline]
    fn refill(&mut self) {
        // Fast path: a whole little-endian word is available
        if self.bits_available <= 56 && self.pos + 8 <= self.data.len() {
            let mut word = [0u8; 8];
            word.copy_from_slice(&self.data[self.pos..self.pos + 8]);
            let word = u64::from_le_bytes(word);
            let take = (63 - self.bits_available) / 8;
            let bits = take * 8;
            self.buffer |= (word & ((1u64 << bits) - 1)) << self.bits_available;
            self.bits_available += bits;
            self.pos += take as usize;
            return;
        }

        while self.bits_available <= 56 {
            match self.data.get(self.pos) {
                Some(&byte) => {
                    self.buffer |= (byte as u64) << self.bits_available;
                    self.bits_available += 8;
                    self.pos += 1;
                }
                None => break,
            }
        }
    }

    /// Read `n` bits (0-32) in LSB-first order
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32, "Cannot read more than 32 bits at once");

        if n == 0 {
            return Ok(0);
        }

        if self.bits_available < n {
            self.refill();
            if self.bits_available < n {
                return Err(Error::UnexpectedEof);
            }
        }

        let mask = (1u64 << n) - 1;
        let result = (self.buffer & mask) as u32;
        self.buffer >>= n;
        self.bits_available -= n;

        Ok(result)
    }

    /// Peek at `n` bits without consuming them (for table-based Huffman decoding)
    ///
    /// Bits beyond the end of input read as zero; the subsequent
    /// [`consume_bits`](Self::consume_bits) detects if they were actually needed.
    #[inline]
    pub fn peek_bits(&mut self, n: u8) -> u32 {
        debug_assert!(n <= 32, "Cannot peek more than 32 bits at once");

        if n == 0 {
            return 0;
        }
        if self.bits_available < n {
            self.refill();
        }

        let mask = (1u64 << n) - 1;
        (self.buffer & mask) as u32
    }

    /// Consume `n` bits that were previously peeked
    #[inline]
    pub fn consume_bits(&mut self, n: u8) -> Result<()> {
        if n > self.bits_available {
            return Err(Error::UnexpectedEof);
        }
        self.buffer >>= n;
        self.bits_available -= n;
        Ok(())
    }

    /// Read a single bit
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discard remaining bits in current byte, align to next byte boundary
    pub fn align_to_byte(&mut self) {
        let discard = self.bits_available % 8;
        if discard > 0 {
            self.buffer >>= discard;
            self.bits_available -= discard;
        }
    }

    /// Number of whole bytes consumed so far, counting a partially read byte
    pub fn bytes_consumed(&self) -> usize {
        self.pos - (self.bits_available / 8) as usize
    }

    /// Number of unread bits, buffered or still in the slice
    pub fn bits_remaining(&self) -> usize {
        (self.data.len() - self.pos) * 8 + self.bits_available as usize
    }
}
