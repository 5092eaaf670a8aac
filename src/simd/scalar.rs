//! Portable reference implementations.

/// Byte-at-a-time common prefix length.
pub fn match_len(a: &[u8], b: &[u8], max_len: usize) -> usize {
    let mut i = 0;
    while i < max_len && a[i] == b[i] {
        i += 1;
    }
    i
}

/// Common prefix length comparing 8 bytes per step.
pub fn match_len_words(a: &[u8], b: &[u8], max_len: usize) -> usize {
    let mut i = 0;
    while i + 8 <= max_len {
        let mut wa = [0u8; 8];
        let mut wb = [0u8; 8];
        wa.copy_from_slice(&a[i..i + 8]);
        wb.copy_from_slice(&b[i..i + 8]);
        let diff = u64::from_le_bytes(wa) ^ u64::from_le_bytes(wb);
        if diff != 0 {
            return i + (diff.trailing_zeros() / 8) as usize;
        }
        i += 8;
    }
    i + match_len(&a[i..], &b[i..], max_len - i)
}

/// Naive forward copy of a back-reference, one byte at a time.
pub fn copy_match(buf: &mut [u8], pos: usize, offset: usize, length: usize) {
    for i in pos..pos + length {
        buf[i] = buf[i - offset];
    }
}
