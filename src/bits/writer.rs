use super::reverse_bits;

/// Bit-level writer for compressed block payloads
///
/// Writes bits LSB-first, the order [`super::BitReader`] consumes them.
pub struct BitWriter {
    /// Accumulated output bytes
    output: Vec<u8>,
    /// Pending bits not yet flushed to `output`
    accumulator: u64,
    /// Number of valid bits in the accumulator (0-7 between calls)
    bits_pending: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(65536)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { output: Vec::with_capacity(capacity), accumulator: 0, bits_pending: 0 }
    }

    /// Write `n` bits (0-32) from value in LSB-first order
    #[inline]
    pub fn write_bits(&mut self, value: u32, n: u8) {
        debug_assert!(n <= 32);

        if n == 0 {
            return;
        }

        let mask = (1u64 << n) - 1;
        self.accumulator |= (value as u64 & mask) << self.bits_pending;
        self.bits_pending += n;

        while self.bits_pending >= 8 {
            self.output.push(self.accumulator as u8);
            self.accumulator >>= 8;
            self.bits_pending -= 8;
        }
    }

    /// Write a single bit
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Write a Huffman code stored MSB-first
    /// The code is `length` bits, with MSB first
    #[inline]
    pub fn write_bits_reversed(&mut self, code: u32, length: u8) {
        self.write_bits(reverse_bits(code, length), length);
    }

    /// Pad to byte boundary with zero bits
    pub fn align_to_byte(&mut self) {
        if self.bits_pending > 0 {
            self.output.push(self.accumulator as u8);
            self.accumulator = 0;
            self.bits_pending = 0;
        }
    }

    /// Finish and return the output bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.output
    }

    /// Get current output length in bytes (including partial byte)
    pub fn len(&self) -> usize {
        self.output.len() + if self.bits_pending > 0 { 1 } else { 0 }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.bits_pending == 0
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
