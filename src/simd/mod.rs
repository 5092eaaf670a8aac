//! Vector primitives used by match finding and block decoding.
//!
//! Three operations sit behind one interface each:
//!
//! - **hash4**: hash of a 4-byte window for the hash-chain index.
//! - **match_len**: length of the common prefix of two windows, the inner
//!   loop of match extension. Dispatched to SSE2/AVX2 on x86_64 and NEON on
//!   aarch64, with a portable word-at-a-time path and a byte-loop reference.
//! - **copy_match**: replay of a back-reference into the output, including
//!   the self-overlapping case where `length > offset`.
//!
//! Every path returns the same result for the same input; only speed differs.
//! A [`Dispatcher`] is created per compression call. There is no global
//! state.

pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86;

#[cfg(target_arch = "aarch64")]
mod neon;

/// Multiplier for the 4-byte window hash (golden ratio, 32-bit)
const HASH_MULTIPLIER: u32 = 0x9E37_79B1;

/// SIMD capability level selected for `match_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    /// Byte-at-a-time reference loop.
    Scalar,
    /// 8 bytes per step using `u64` XOR and trailing-zero count.
    Word,
    /// x86_64 SSE2 (always available on x86_64).
    #[cfg(target_arch = "x86_64")]
    Sse2,
    /// x86_64 AVX2 (256-bit registers).
    #[cfg(target_arch = "x86_64")]
    Avx2,
    /// aarch64 NEON (always available on aarch64).
    #[cfg(target_arch = "aarch64")]
    Neon,
}

/// Signature: `(a, b, max_len) -> common prefix length`
///
/// # Safety
/// Implementations require their SIMD feature to be available and
/// `max_len` bytes to be readable from both pointers.
type MatchLenFn = unsafe fn(*const u8, *const u8, usize) -> usize;

/// Resolved primitive table for one compression or decompression call.
#[derive(Clone, Copy)]
pub struct Dispatcher {
    level: SimdLevel,
    match_len_fn: MatchLenFn,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("level", &self.level).finish()
    }
}

impl Dispatcher {
    /// Probe the CPU and pick the fastest available path.
    pub fn new() -> Self {
        Self::with_level(detect_level())
    }

    /// Force the byte-loop reference implementation.
    pub fn scalar() -> Self {
        Self::with_level(SimdLevel::Scalar)
    }

    /// Use a specific level. Callers must only pass levels reported by
    /// [`Dispatcher::available_levels`].
    fn with_level(level: SimdLevel) -> Self {
        Self { level, match_len_fn: resolve_match_len(level) }
    }

    /// Every level the current CPU can run, reference first.
    pub fn available_levels() -> Vec<SimdLevel> {
        let mut levels = vec![SimdLevel::Scalar, SimdLevel::Word];

        #[cfg(target_arch = "x86_64")]
        {
            levels.push(SimdLevel::Sse2);
            if is_x86_feature_detected!("avx2") {
                levels.push(SimdLevel::Avx2);
            }
        }

        #[cfg(target_arch = "aarch64")]
        levels.push(SimdLevel::Neon);

        levels
    }

    /// Dispatcher for `level` if the CPU supports it.
    pub fn for_level(level: SimdLevel) -> Option<Self> {
        Self::available_levels().contains(&level).then(|| Self::with_level(level))
    }

    /// The level this dispatcher resolved to.
    pub fn level(&self) -> SimdLevel {
        self.level
    }

    /// Length of the common prefix of `a` and `b`, capped at `max_len` and at
    /// the shorter slice.
    #[inline]
    pub fn match_len(&self, a: &[u8], b: &[u8], max_len: usize) -> usize {
        let max_len = max_len.min(a.len()).min(b.len());
        if max_len == 0 {
            return 0;
        }
        // SAFETY: match_len_fn was resolved for a level the CPU supports, and
        // max_len is bounded by both slice lengths.
        unsafe { (self.match_len_fn)(a.as_ptr(), b.as_ptr(), max_len) }
    }

    /// Hash of the first four bytes of `window` into `hash_log` bits.
    #[inline]
    pub fn hash4(&self, window: &[u8], hash_log: u32) -> u32 {
        hash4(window, hash_log)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the highest SIMD level supported by the current CPU.
fn detect_level() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
        return SimdLevel::Sse2;
    }

    #[cfg(target_arch = "aarch64")]
    {
        return SimdLevel::Neon;
    }

    #[allow(unreachable_code)]
    SimdLevel::Word
}

fn resolve_match_len(level: SimdLevel) -> MatchLenFn {
    match level {
        SimdLevel::Scalar => match_len_scalar,
        SimdLevel::Word => match_len_word,
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Sse2 => x86::match_len_sse2,
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => x86::match_len_avx2,
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => neon::match_len_neon,
    }
}

/// # Safety
/// `max_len` bytes must be readable from both `a` and `b`.
unsafe fn match_len_scalar(a: *const u8, b: *const u8, max_len: usize) -> usize {
    let a = std::slice::from_raw_parts(a, max_len);
    let b = std::slice::from_raw_parts(b, max_len);
    scalar::match_len(a, b, max_len)
}

/// # Safety
/// `max_len` bytes must be readable from both `a` and `b`.
unsafe fn match_len_word(a: *const u8, b: *const u8, max_len: usize) -> usize {
    let a = std::slice::from_raw_parts(a, max_len);
    let b = std::slice::from_raw_parts(b, max_len);
    scalar::match_len_words(a, b, max_len)
}

/// Hash of the first four bytes of `window` into `hash_log` bits.
///
/// Requires `window.len() >= 4` and `1 <= hash_log <= 32`.
#[inline]
pub fn hash4(window: &[u8], hash_log: u32) -> u32 {
    let v = u32::from_le_bytes([window[0], window[1], window[2], window[3]]);
    v.wrapping_mul(HASH_MULTIPLIER) >> (32 - hash_log)
}

/// Copy `length` bytes from `pos - offset` to `pos` within `buf`, with
/// forward byte-by-byte semantics when the ranges overlap.
///
/// Requires `1 <= offset <= pos` and `pos + length <= buf.len()`; the block
/// decoder validates both before calling.
#[inline]
pub fn copy_match(buf: &mut [u8], pos: usize, offset: usize, length: usize) {
    debug_assert!(offset >= 1 && offset <= pos);
    debug_assert!(pos + length <= buf.len());

    let src = pos - offset;
    if offset >= length {
        buf.copy_within(src..src + length, pos);
        return;
    }

    // Overlapping: the output is periodic with period `offset`. Each pass
    // copies everything produced so far, doubling the chunk while keeping the
    // distance between source and destination a multiple of the period.
    let mut copied = 0;
    while copied < length {
        let chunk = (pos + copied - src).min(length - copied);
        buf.copy_within(src..src + chunk, pos + copied);
        copied += chunk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// xorshift64 stream for randomized checks
    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    #[test]
    fn test_match_len_all_levels() {
        let a: Vec<u8> = (0..100u8).collect();
        let mut b = a.clone();

        for level in Dispatcher::available_levels() {
            let d = Dispatcher::for_level(level).unwrap();
            assert_eq!(d.match_len(&a, &b, 100), 100, "{:?}", level);
        }

        b[50] = 0xFF;
        for level in Dispatcher::available_levels() {
            let d = Dispatcher::for_level(level).unwrap();
            assert_eq!(d.match_len(&a, &b, 100), 50, "{:?}", level);
            assert_eq!(d.match_len(&a, &b, 20), 20, "{:?}", level);
        }

        b[0] = 0xFF;
        for level in Dispatcher::available_levels() {
            let d = Dispatcher::for_level(level).unwrap();
            assert_eq!(d.match_len(&a, &b, 100), 0, "{:?}", level);
        }
    }

    #[test]
    fn test_match_len_caps_at_shorter_slice() {
        let d = Dispatcher::new();
        assert_eq!(d.match_len(b"abcdef", b"abc", 100), 3);
        assert_eq!(d.match_len(b"", b"abc", 100), 0);
    }

    #[test]
    fn test_hash4_uses_only_four_bytes() {
        assert_eq!(hash4(b"abcdXYZ", 16), hash4(b"abcd", 16));
        assert!(hash4(b"abcd", 16) < (1 << 16));
        assert_ne!(hash4(b"abcd", 16), hash4(b"abce", 16));
    }

    #[test]
    fn test_copy_match_disjoint() {
        let mut buf = *b"abcdef______";
        copy_match(&mut buf, 6, 6, 6);
        assert_eq!(&buf, b"abcdefabcdef");
    }

    #[test]
    fn test_copy_match_run() {
        // offset 1: run-length expansion
        let mut buf = *b"A_______";
        copy_match(&mut buf, 1, 1, 7);
        assert_eq!(&buf, b"AAAAAAAA");
    }

    #[test]
    fn test_copy_match_pattern() {
        let mut buf = *b"AB________";
        copy_match(&mut buf, 2, 2, 8);
        assert_eq!(&buf, b"ABABABABAB");
    }

    #[test]
    fn test_copy_match_equals_byte_loop() {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        for _ in 0..500 {
            let prefix_len = (next(&mut state) % 63 + 1) as usize;
            let offset = (next(&mut state) as usize) % prefix_len + 1;
            let length = (next(&mut state) % 300) as usize;
            let mut fast: Vec<u8> = (0..prefix_len).map(|_| next(&mut state) as u8).collect();
            fast.resize(prefix_len + length, 0);
            let mut reference = fast.clone();

            copy_match(&mut fast, prefix_len, offset, length);
            scalar::copy_match(&mut reference, prefix_len, offset, length);
            assert_eq!(fast, reference, "offset {} length {}", offset, length);
        }
    }

    #[test]
    fn test_match_len_paths_agree() {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        for _ in 0..500 {
            // Small alphabet so long common prefixes are frequent
            let a: Vec<u8> = (0..next(&mut state) % 200).map(|_| (next(&mut state) % 2) as u8).collect();
            let mut b = a.clone();
            if !b.is_empty() {
                let at = (next(&mut state) as usize) % b.len();
                b[at] ^= (next(&mut state) % 2) as u8;
            }
            let max_len = (next(&mut state) % 256) as usize;

            let reference = Dispatcher::scalar().match_len(&a, &b, max_len);
            for level in Dispatcher::available_levels() {
                let d = Dispatcher::for_level(level).unwrap();
                assert_eq!(d.match_len(&a, &b, max_len), reference, "{:?}", level);
            }
        }
    }
}
