//! aarch64 NEON match extension.

use std::arch::aarch64::*;

/// # Safety
/// Requires NEON (always available on aarch64) and `max_len` readable bytes
/// behind both pointers.
#[target_feature(enable = "neon")]
pub(super) unsafe fn match_len_neon(a: *const u8, b: *const u8, max_len: usize) -> usize {
    let mut i = 0;

    while i + 16 <= max_len {
        let va = vld1q_u8(a.add(i));
        let vb = vld1q_u8(b.add(i));
        // 0xFF in every lane that differs
        let diff = vreinterpretq_u64_u8(vmvnq_u8(vceqq_u8(va, vb)));
        let lo = vgetq_lane_u64(diff, 0);
        if lo != 0 {
            return i + (lo.trailing_zeros() / 8) as usize;
        }
        let hi = vgetq_lane_u64(diff, 1);
        if hi != 0 {
            return i + 8 + (hi.trailing_zeros() / 8) as usize;
        }
        i += 16;
    }

    while i < max_len && *a.add(i) == *b.add(i) {
        i += 1;
    }
    i
}
