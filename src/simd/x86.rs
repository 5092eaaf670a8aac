//! x86_64 SSE2 / AVX2 match extension.

use std::arch::x86_64::*;

/// # Safety
/// Requires SSE2 (always available on x86_64) and `max_len` readable bytes
/// behind both pointers.
#[target_feature(enable = "sse2")]
pub(super) unsafe fn match_len_sse2(a: *const u8, b: *const u8, max_len: usize) -> usize {
    let mut i = 0;

    while i + 16 <= max_len {
        let va = _mm_loadu_si128(a.add(i) as *const __m128i);
        let vb = _mm_loadu_si128(b.add(i) as *const __m128i);
        let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32;
        if mask != 0xFFFF {
            return i + (!mask).trailing_zeros() as usize;
        }
        i += 16;
    }

    while i < max_len && *a.add(i) == *b.add(i) {
        i += 1;
    }
    i
}

/// # Safety
/// Requires AVX2 and `max_len` readable bytes behind both pointers.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn match_len_avx2(a: *const u8, b: *const u8, max_len: usize) -> usize {
    let mut i = 0;

    while i + 32 <= max_len {
        let va = _mm256_loadu_si256(a.add(i) as *const __m256i);
        let vb = _mm256_loadu_si256(b.add(i) as *const __m256i);
        let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32;
        if mask != 0xFFFF_FFFF {
            return i + (!mask).trailing_zeros() as usize;
        }
        i += 32;
    }

    // 16-byte tail
    while i + 16 <= max_len {
        let va = _mm_loadu_si128(a.add(i) as *const __m128i);
        let vb = _mm_loadu_si128(b.add(i) as *const __m128i);
        let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32;
        if mask != 0xFFFF {
            return i + (!mask).trailing_zeros() as usize;
        }
        i += 16;
    }

    while i < max_len && *a.add(i) == *b.add(i) {
        i += 1;
    }
    i
}
