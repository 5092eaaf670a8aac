/// Number of symbols in the literal alphabet
pub const LITERAL_SYMBOLS: usize = 256;

/// Number of length codes (literal runs and match lengths share the table)
pub const LENGTH_CODES: usize = 36;

/// Number of offset codes
pub const OFFSET_CODES: usize = 24;

/// Largest value representable by the length table
pub const MAX_LENGTH_VALUE: u32 = (1 << 24) - 1;

/// Largest value representable by the offset table
pub const MAX_OFFSET_VALUE: u32 = (1 << 24) - 1;

/// Length codes 0-35: base value and extra bits
///
/// Codes 0-15 are exact; code `c >= 16` covers `1 << (c - 12)` values.
pub const LENGTH_TABLE: [(u32, u8); LENGTH_CODES] = [
    // (base, extra_bits)
    (0, 0),         // 0
    (1, 0),         // 1
    (2, 0),         // 2
    (3, 0),         // 3
    (4, 0),         // 4
    (5, 0),         // 5
    (6, 0),         // 6
    (7, 0),         // 7
    (8, 0),         // 8
    (9, 0),         // 9
    (10, 0),        // 10
    (11, 0),        // 11
    (12, 0),        // 12
    (13, 0),        // 13
    (14, 0),        // 14
    (15, 0),        // 15
    (16, 4),        // 16
    (32, 5),        // 17
    (64, 6),        // 18
    (128, 7),       // 19
    (256, 8),       // 20
    (512, 9),       // 21
    (1024, 10),     // 22
    (2048, 11),     // 23
    (4096, 12),     // 24
    (8192, 13),     // 25
    (16384, 14),    // 26
    (32768, 15),    // 27
    (65536, 16),    // 28
    (131072, 17),   // 29
    (262144, 18),   // 30
    (524288, 19),   // 31
    (1048576, 20),  // 32
    (2097152, 21),  // 33
    (4194304, 22),  // 34
    (8388608, 23),  // 35
];

/// Offset codes 0-23: code `c` has base `1 << c` and `c` extra bits
pub const OFFSET_TABLE: [(u32, u8); OFFSET_CODES] = [
    // (base, extra_bits)
    (1, 0),        // 0
    (2, 1),        // 1
    (4, 2),        // 2
    (8, 3),        // 3
    (16, 4),       // 4
    (32, 5),       // 5
    (64, 6),       // 6
    (128, 7),      // 7
    (256, 8),      // 8
    (512, 9),      // 9
    (1024, 10),    // 10
    (2048, 11),    // 11
    (4096, 12),    // 12
    (8192, 13),    // 13
    (16384, 14),   // 14
    (32768, 15),   // 15
    (65536, 16),   // 16
    (131072, 17),  // 17
    (262144, 18),  // 18
    (524288, 19),  // 19
    (1048576, 20), // 20
    (2097152, 21), // 21
    (4194304, 22), // 22
    (8388608, 23), // 23
];

/// Decode a length value from a length code (0-35) and extra bits
pub fn decode_length(code: u16, extra: u32) -> Option<u32> {
    let &(base, extra_bits) = LENGTH_TABLE.get(code as usize)?;
    if extra >> extra_bits != 0 {
        return None;
    }
    Some(base + extra)
}

/// Decode an offset from an offset code (0-23) and extra bits
pub fn decode_offset(code: u16, extra: u32) -> Option<u32> {
    let &(base, extra_bits) = OFFSET_TABLE.get(code as usize)?;
    if extra >> extra_bits != 0 {
        return None;
    }
    Some(base + extra)
}

/// Find the length code for a value
/// Returns (code, extra_value, extra_bits)
pub fn encode_length(value: u32) -> Option<(u8, u32, u8)> {
    if value > MAX_LENGTH_VALUE {
        return None;
    }
    if value < 16 {
        return Some((value as u8, 0, 0));
    }

    let log2 = 31 - value.leading_zeros();
    let code = (log2 + 12) as u8;
    let (base, extra_bits) = LENGTH_TABLE[code as usize];
    Some((code, value - base, extra_bits))
}

/// Find the offset code for an offset
/// Returns (code, extra_value, extra_bits)
pub fn encode_offset(offset: u32) -> Option<(u8, u32, u8)> {
    if !(1..=MAX_OFFSET_VALUE).contains(&offset) {
        return None;
    }

    let code = (31 - offset.leading_zeros()) as u8;
    let (base, extra_bits) = OFFSET_TABLE[code as usize];
    Some((code, offset - base, extra_bits))
}
