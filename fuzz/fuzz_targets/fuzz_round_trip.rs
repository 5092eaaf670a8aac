#![no_main]

use libfuzzer_sys::fuzz_target;
use zyphrax::{compress_bound, compress_to_vec, decompress_to_vec, Params};

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the params, the rest is the content
    let (level, block_size, content) = match data {
        [a, b, rest @ ..] => (*a as u32 % 9 + 1, 64 + (*b as u32) * 37, rest),
        _ => return,
    };
    let params = Params::default()
        .with_level(level)
        .with_block_size(block_size)
        .with_checksum(level % 2 == 0);

    let frame = compress_to_vec(content, &params).expect("compress failed");
    assert!(frame.len() <= compress_bound(content.len()));
    let decoded = decompress_to_vec(&frame).expect("decompress failed");
    assert_eq!(decoded, content);
});
