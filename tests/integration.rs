//! End-to-end integration tests for zyphrax.
//!
//! Exercises the public API with synthetic data across levels, block sizes
//! and checksum settings.

use std::io::Write;

use zyphrax::bits::BitWriter;
use zyphrax::block::{MODE_COMPRESSED, STORED_OVERHEAD};
use zyphrax::frame::HEADER_SIZE;
use zyphrax::huffman::TableSet;
use zyphrax::simd::Dispatcher;
use zyphrax::{
    compress, compress_bound, compress_to_vec, decompress, decompress_to_vec, scan_blocks,
    BlockMode, Compressor, Error, FrameHeader, Params,
};

// ============================================================================
// Test Data Generators
// ============================================================================

/// Generate random data using a simple PRNG
fn generate_random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    for _ in 0..size {
        // Simple xorshift PRNG
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.push((state & 0xFF) as u8);
    }
    data
}

/// Generate highly repetitive data (good compression)
fn generate_repetitive_data(size: usize) -> Vec<u8> {
    let pattern = b"AAAAAAAAAAAAAAAA";
    pattern.iter().cycle().take(size).copied().collect()
}

/// Generate data with mixed patterns (moderate compression)
fn generate_mixed_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let patterns = [
        b"ACGTACGTACGTACGT".as_slice(),
        b"NNNNNNNNNNNNNNNN".as_slice(),
        b"ATATATATATATATAT".as_slice(),
    ];

    let mut pattern_idx = 0;
    while data.len() < size {
        let pattern = patterns[pattern_idx % patterns.len()];
        let remaining = size - data.len();
        let chunk_size = remaining.min(pattern.len());
        data.extend_from_slice(&pattern[..chunk_size]);
        pattern_idx += 1;
    }
    data
}

/// Generate English-like text from a small vocabulary picked by a PRNG
fn generate_text_data(size: usize, seed: u64) -> Vec<u8> {
    const WORDS: [&str; 16] = [
        "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog ", "and ", "runs ",
        "through ", "a ", "field ", "of ", "tall ", "grass. ",
    ];
    let mut data = Vec::with_capacity(size + 16);
    let mut state = seed;
    while data.len() < size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.extend_from_slice(WORDS[(state % WORDS.len() as u64) as usize].as_bytes());
    }
    data.truncate(size);
    data
}

/// Generate FASTQ-formatted data
fn generate_fastq_data(num_reads: usize, read_length: usize) -> Vec<u8> {
    let mut data = Vec::new();
    let bases = [b'A', b'C', b'G', b'T'];

    for i in 0..num_reads {
        writeln!(data, "@read_{}", i).unwrap();
        for j in 0..read_length {
            data.push(bases[(i * 7 + j * j) % 4]);
        }
        data.push(b'\n');
        data.extend_from_slice(b"+\n");
        data.resize(data.len() + read_length, b'I');
        data.push(b'\n');
    }
    data
}

fn round_trip(data: &[u8], params: &Params) -> Vec<u8> {
    let frame = compress_to_vec(data, params).unwrap();
    assert!(frame.len() <= compress_bound(data.len()));
    assert!(frame.len() <= params.frame_bound(data.len()));
    decompress_to_vec(&frame).unwrap()
}

// ============================================================================
// Round Trip Tests
// ============================================================================

#[test]
fn test_empty_input() {
    for checksum in [false, true] {
        let params = Params::default().with_checksum(checksum);
        let frame = compress_to_vec(&[], &params).unwrap();
        assert_eq!(frame.len(), params.frame_bound(0));
        assert!(scan_blocks(&frame).unwrap().is_empty());
        assert!(decompress_to_vec(&frame).unwrap().is_empty());
    }
}

#[test]
fn test_single_byte_input() {
    let data = b"Z".to_vec();
    assert_eq!(round_trip(&data, &Params::default()), data);
}

#[test]
fn test_all_levels_round_trip() {
    let data = generate_text_data(50_000, 0x1234_5678);
    for level in 1..=9 {
        let params = Params::default().with_level(level);
        assert_eq!(round_trip(&data, &params), data, "level {}", level);
    }
}

#[test]
fn test_block_sizes_round_trip() {
    let data = generate_mixed_data(20_000);
    for block_size in [64u32, 65, 100, 1000, 4096, 19_999, 20_000, 1 << 20] {
        let params = Params::default().with_block_size(block_size).with_checksum(true);
        assert_eq!(round_trip(&data, &params), data, "block size {}", block_size);
    }
}

#[test]
fn test_data_at_block_boundary() {
    let params = Params::default().with_block_size(4096);
    for size in [4095, 4096, 4097, 8192, 8193] {
        let data = generate_text_data(size, size as u64);
        let frame = compress_to_vec(&data, &params).unwrap();
        let blocks = scan_blocks(&frame).unwrap();
        assert_eq!(blocks.len(), (size + 4095) / 4096, "size {}", size);
        assert_eq!(decompress_to_vec(&frame).unwrap(), data);
    }
}

#[test]
fn test_fastq_data() {
    let data = generate_fastq_data(500, 100);
    let params = Params::default().with_level(6).with_checksum(true);
    let frame = compress_to_vec(&data, &params).unwrap();
    assert!(frame.len() < data.len() / 2);
    assert_eq!(decompress_to_vec(&frame).unwrap(), data);
}

#[test]
fn test_large_data() {
    let data = generate_text_data(3_000_000, 42);
    let params = Params::default().with_block_size(1 << 20).with_checksum(true);
    assert_eq!(round_trip(&data, &params), data);
}

#[test]
fn test_caller_buffer_api() {
    let data = generate_text_data(10_000, 7);
    let params = Params::default();
    let mut frame = vec![0u8; compress_bound(data.len())];
    let written = compress(&data, &mut frame, &params).unwrap();

    let mut out = vec![0u8; data.len()];
    assert_eq!(decompress(&frame[..written], &mut out).unwrap(), data.len());
    assert_eq!(out, data);
}

// ============================================================================
// Size Properties
// ============================================================================

#[test]
fn test_incompressible_stays_within_stored_bound() {
    let params = Params::default();
    for size in [100, 4096, 65_536, 500_000] {
        let data = generate_random_data(size, 0xDEAD_BEEF ^ size as u64);
        let frame = compress_to_vec(&data, &params).unwrap();

        let blocks = (size + params.block_size as usize - 1) / params.block_size as usize;
        assert!(frame.len() <= size + HEADER_SIZE + blocks * STORED_OVERHEAD);
        assert!(scan_blocks(&frame).unwrap().iter().all(|b| b.mode == BlockMode::Stored));
        assert_eq!(decompress_to_vec(&frame).unwrap(), data);
    }
}

#[test]
fn test_highly_redundant_input() {
    let data = vec![b'x'; 1_000_000];
    let frame = compress_to_vec(&data, &Params::default()).unwrap();
    assert!(frame.len() < data.len() / 100, "frame is {} bytes", frame.len());
    assert_eq!(decompress_to_vec(&frame).unwrap(), data);

    let data = generate_repetitive_data(1_000_000);
    let frame = compress_to_vec(&data, &Params::default()).unwrap();
    assert!(frame.len() < data.len() / 100);
}

#[test]
fn test_level_monotonicity_over_corpus() {
    let corpus: Vec<Vec<u8>> = vec![
        generate_text_data(200_000, 1),
        generate_text_data(100_000, 2),
        generate_fastq_data(1000, 150),
        generate_mixed_data(100_000),
        generate_random_data(50_000, 3),
    ];

    let total_at = |level: u32| -> usize {
        let params = Params::default().with_level(level);
        corpus.iter().map(|data| compress_to_vec(data, &params).unwrap().len()).sum()
    };

    let sizes: Vec<usize> = [1, 3, 6, 9].iter().map(|&level| total_at(level)).collect();
    for pair in sizes.windows(2) {
        assert!(pair[1] <= pair[0], "sizes by level: {:?}", sizes);
    }
}

// ============================================================================
// Capacity Errors
// ============================================================================

#[test]
fn test_decompress_one_byte_short() {
    let data = generate_text_data(30_000, 11);
    let frame = compress_to_vec(&data, &Params::default()).unwrap();
    let mut out = vec![0u8; data.len() - 1];
    assert_eq!(
        decompress(&frame, &mut out),
        Err(Error::DestinationTooSmall { needed: data.len(), available: data.len() - 1 })
    );
}

#[test]
fn test_compress_one_byte_short() {
    let data = generate_random_data(10_000, 99);
    for checksum in [false, true] {
        let params = Params::default().with_block_size(4096).with_checksum(checksum);
        let mut frame = vec![0u8; params.frame_bound(data.len()) - 1];
        assert!(matches!(
            compress(&data, &mut frame, &params),
            Err(Error::DestinationTooSmall { .. })
        ));
    }
}

// ============================================================================
// Corruption Detection
// ============================================================================

#[test]
fn test_truncation_at_every_position_fails() {
    let data = generate_text_data(3000, 5);
    for checksum in [false, true] {
        let params = Params::default().with_block_size(1024).with_checksum(checksum);
        let frame = compress_to_vec(&data, &params).unwrap();
        let mut out = vec![0u8; data.len()];
        for cut in 0..frame.len() {
            assert!(decompress(&frame[..cut], &mut out).is_err(), "cut at {}", cut);
        }
    }
}

#[test]
fn test_checksum_detects_flipped_byte() {
    let data = generate_text_data(20_000, 8);
    let params = Params::default().with_block_size(4096).with_checksum(true);
    let frame = compress_to_vec(&data, &params).unwrap();

    // Every byte after the header, trailer included
    for pos in (HEADER_SIZE..frame.len()).step_by(37) {
        let mut corrupted = frame.clone();
        corrupted[pos] ^= 0x01;
        assert!(decompress_to_vec(&corrupted).is_err(), "flip at {}", pos);
    }
}

#[test]
fn test_corrupt_header_rejected() {
    let frame = compress_to_vec(b"header test data", &Params::default()).unwrap();
    for pos in 0..HEADER_SIZE {
        let mut corrupted = frame.clone();
        corrupted[pos] ^= 0x10;
        assert!(decompress_to_vec(&corrupted).is_err(), "flip at {}", pos);
    }
}

#[test]
fn test_corrupt_code_length_table_rejected() {
    // A compressed record whose literal-length code has three 1-bit codes
    let tables = TableSet {
        literals: vec![8; 256],
        lit_lens: {
            let mut lengths = vec![0u8; 36];
            lengths[..3].copy_from_slice(&[1, 1, 1]);
            lengths
        },
        match_lens: vec![0; 36],
        offsets: vec![0; 24],
    };
    let mut writer = BitWriter::new();
    tables.serialize(&mut writer);
    writer.write_bits(0, 16);
    let payload = writer.finish();

    let raw_len = 100u32;
    let header = FrameHeader::new(&Params::default(), raw_len as u64);
    let mut frame = header.to_bytes().to_vec();
    frame.push(MODE_COMPRESSED);
    frame.extend_from_slice(&raw_len.to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);

    assert_eq!(decompress_to_vec(&frame), Err(Error::HuffmanOversubscribed));
}

#[test]
fn test_random_garbage_never_panics() {
    let params = Params::default().with_block_size(256);
    let frame = compress_to_vec(&generate_text_data(2000, 21), &params).unwrap();
    for seed in 1..200u64 {
        let mut corrupted = frame.clone();
        let noise = generate_random_data(8, seed);
        let at = HEADER_SIZE + (seed as usize * 13) % (frame.len() - HEADER_SIZE - 8);
        corrupted[at..at + 8].copy_from_slice(&noise);
        // Either rejected or decoded to some bytes of the declared length
        if let Ok(out) = decompress_to_vec(&corrupted) {
            assert_eq!(out.len(), 2000);
        }
    }
}

// ============================================================================
// Dispatch Paths and Block Index
// ============================================================================

#[test]
fn test_dispatch_paths_agree() {
    let data = generate_text_data(100_000, 77);
    let params = Params::default().with_level(7);
    let reference = {
        let compressor = Compressor::new(params).unwrap().with_dispatcher(Dispatcher::scalar());
        let mut frame = vec![0u8; params.frame_bound(data.len())];
        let stats = compressor.compress(&data, &mut frame).unwrap();
        frame.truncate(stats.output_bytes as usize);
        frame
    };

    for level in Dispatcher::available_levels() {
        let dispatcher = Dispatcher::for_level(level).unwrap();
        let compressor = Compressor::new(params).unwrap().with_dispatcher(dispatcher);
        let mut frame = vec![0u8; params.frame_bound(data.len())];
        let stats = compressor.compress(&data, &mut frame).unwrap();
        frame.truncate(stats.output_bytes as usize);
        assert_eq!(frame, reference, "{:?}", level);
    }
}

#[test]
fn test_scan_blocks_agrees_with_layout() {
    let data = generate_text_data(10_000, 31);
    let params = Params::default().with_block_size(3000).with_checksum(true);
    let frame = compress_to_vec(&data, &params).unwrap();
    let blocks = scan_blocks(&frame).unwrap();

    assert_eq!(blocks.iter().map(|b| b.raw_len).collect::<Vec<_>>(), vec![3000, 3000, 3000, 1000]);
    let mut offset = HEADER_SIZE;
    let mut produced = 0u64;
    for block in &blocks {
        assert_eq!(block.record_offset, offset);
        assert_eq!(block.output_offset, produced);
        offset += block.record_len;
        produced += block.raw_len as u64;
    }
    assert_eq!(offset + 4, frame.len());
}

#[test]
fn test_stats_accuracy() {
    let data = generate_mixed_data(100_000);
    let params = Params::default().with_block_size(10_000);
    let mut frame = vec![0u8; params.frame_bound(data.len())];
    let stats = Compressor::new(params).unwrap().compress(&data, &mut frame).unwrap();

    assert_eq!(stats.input_bytes, 100_000);
    assert_eq!(stats.blocks_compressed + stats.blocks_stored, 10);
    let frame = &frame[..stats.output_bytes as usize];
    let compressed = scan_blocks(frame)
        .unwrap()
        .iter()
        .filter(|b| b.mode == BlockMode::Compressed)
        .count();
    assert_eq!(compressed as u64, stats.blocks_compressed);
}

// ============================================================================
// Randomized Round Trips
// ============================================================================

#[test]
fn test_random_params_round_trip_within_bound() {
    let mut state = 0xC0FF_EE00_1234_5678u64;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for _ in 0..64 {
        let len = (next() % 3000) as usize;
        let params = Params {
            level: (next() % 9 + 1) as u32,
            block_size: (next() % 960 + 64) as u32,
            checksum: (next() % 2) as u32,
        };
        // Alternate between incompressible and low-entropy content
        let data = if next() % 2 == 0 {
            generate_random_data(len, next() | 1)
        } else {
            generate_random_data(len, next() | 1).iter().map(|b| b % 4).collect()
        };

        let frame = compress_to_vec(&data, &params).unwrap();
        assert!(frame.len() <= compress_bound(data.len()), "{:?}", params);
        assert!(frame.len() <= params.frame_bound(data.len()), "{:?}", params);
        assert_eq!(decompress_to_vec(&frame).unwrap(), data, "{:?}", params);
    }
}

// ============================================================================
// CLI Tests
// ============================================================================

fn zyphrax_bin() -> std::process::Command {
    std::process::Command::new(env!("CARGO_BIN_EXE_zyphrax"))
}

#[test]
fn test_cli_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let packed = dir.path().join("input.zyx");
    let unpacked = dir.path().join("output.txt");
    let data = generate_text_data(100_000, 9);
    std::fs::write(&input, &data).unwrap();

    let status = zyphrax_bin()
        .args(["--level", "6", "--checksum"])
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(status.success());

    let status = zyphrax_bin().arg("-d").arg(&packed).arg(&unpacked).status().unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(&unpacked).unwrap(), data);
}

#[test]
fn test_cli_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty");
    let packed = dir.path().join("empty.zyx");
    let unpacked = dir.path().join("empty.out");
    std::fs::write(&input, b"").unwrap();

    assert!(zyphrax_bin().arg(&input).arg(&packed).status().unwrap().success());
    assert!(zyphrax_bin().arg("-d").arg(&packed).arg(&unpacked).status().unwrap().success());
    assert!(std::fs::read(&unpacked).unwrap().is_empty());
}

#[test]
fn test_cli_info() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let packed = dir.path().join("input.zyx");
    std::fs::write(&input, generate_text_data(5000, 3)).unwrap();

    let status =
        zyphrax_bin().args(["--block-size", "2048"]).arg(&input).arg(&packed).status().unwrap();
    assert!(status.success());

    let output = zyphrax_bin().arg("--info").arg(&packed).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Content size:     5000"), "{}", stdout);
    assert!(stdout.contains("Blocks:           3"), "{}", stdout);
}

#[test]
fn test_cli_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage");
    let output_path = dir.path().join("out");
    std::fs::write(&input, generate_random_data(100, 1)).unwrap();

    let output = zyphrax_bin().arg("-d").arg(&input).arg(&output_path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));

    let output =
        zyphrax_bin().args(["--level", "12"]).arg(&input).arg(&output_path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
