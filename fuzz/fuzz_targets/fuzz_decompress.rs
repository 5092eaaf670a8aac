#![no_main]

use libfuzzer_sys::fuzz_target;
use zyphrax::{decompress, decompress_to_vec, scan_blocks};

fuzz_target!(|data: &[u8]| {
    // Decoding may fail on invalid input - that's OK
    // We're looking for panics/crashes, not errors
    let _ = scan_blocks(data);
    let _ = decompress_to_vec(data);

    // Fixed-size destination exercises the capacity checks
    let mut out = vec![0u8; 4096];
    let _ = decompress(data, &mut out);
});
