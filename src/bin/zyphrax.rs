use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use memmap2::Mmap;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use zyphrax::{scan_blocks, Compressor, FrameHeader, Params};

#[derive(Parser, Debug)]
#[command(name = "zyphrax")]
#[command(about = "Lossless block compressor (LZ77 + Huffman)")]
#[command(version)]
struct Args {
    /// Input file
    input: PathBuf,

    /// Output file
    #[arg(required_unless_present = "info")]
    output: Option<PathBuf>,

    /// Decompress instead of compress
    #[arg(short, long)]
    decompress: bool,

    /// Print the frame header and block index of a compressed input and exit
    #[arg(long, conflicts_with = "decompress")]
    info: bool,

    /// Compression level (1-9)
    #[arg(short, long, default_value = "3")]
    level: u32,

    /// Block size in bytes (64 to 16777215)
    #[arg(short, long, default_value = "65536")]
    block_size: u32,

    /// Append a CRC32 of the content to the frame
    #[arg(long)]
    checksum: bool,

    /// Print statistics; repeat for debug and trace logging
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

const EXIT_ERROR: u8 = 1;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<u8, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(filter, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let file = File::open(&args.input)?;
    // Zero-length files cannot be mapped
    let mmap = if file.metadata()?.len() > 0 {
        // SAFETY: the mapping is read-only and dropped before this function returns;
        // concurrent modification of the input file is not supported.
        Some(unsafe { Mmap::map(&file)? })
    } else {
        None
    };
    let input: &[u8] = mmap.as_deref().unwrap_or(&[]);

    if args.info {
        return print_info(input);
    }

    let output_path = args.output.as_deref().ok_or("output path required")?;

    if args.decompress {
        decompress_file(input, output_path, args.verbose > 0)
    } else {
        let params = Params::default()
            .with_level(args.level)
            .with_block_size(args.block_size)
            .with_checksum(args.checksum);
        compress_file(input, output_path, params, args.verbose > 0)
    }
}

fn compress_file(
    input: &[u8],
    output_path: &Path,
    params: Params,
    verbose: bool,
) -> Result<u8, Box<dyn std::error::Error>> {
    let compressor = Compressor::new(params)?;

    let start = std::time::Instant::now();
    let mut frame = vec![0u8; params.frame_bound(input.len())];
    let stats = compressor.compress(input, &mut frame)?;
    frame.truncate(stats.output_bytes as usize);
    let elapsed = start.elapsed();

    write_output(output_path, &frame)?;

    if verbose {
        eprintln!("Compression complete:");
        eprintln!("  Input bytes:      {}", stats.input_bytes);
        eprintln!("  Output bytes:     {}", stats.output_bytes);
        eprintln!("  Ratio:            {:.2}%", stats.ratio() * 100.0);
        eprintln!("  Blocks:           {}", stats.blocks_compressed + stats.blocks_stored);
        eprintln!("  Stored blocks:    {}", stats.blocks_stored);
        eprintln!("  Time:             {:.2?}", elapsed);
        eprintln!("  Throughput:       {:.1} MB/s", throughput(stats.input_bytes, elapsed));
    }

    Ok(0)
}

fn decompress_file(
    input: &[u8],
    output_path: &Path,
    verbose: bool,
) -> Result<u8, Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();
    let content = zyphrax::decompress_to_vec(input)?;
    let elapsed = start.elapsed();

    write_output(output_path, &content)?;

    if verbose {
        eprintln!("Decompression complete:");
        eprintln!("  Input bytes:      {}", input.len());
        eprintln!("  Output bytes:     {}", content.len());
        eprintln!("  Time:             {:.2?}", elapsed);
        eprintln!("  Throughput:       {:.1} MB/s", throughput(content.len() as u64, elapsed));
    }

    Ok(0)
}

fn print_info(input: &[u8]) -> Result<u8, Box<dyn std::error::Error>> {
    let header = FrameHeader::parse(input)?;
    let blocks = scan_blocks(input)?;

    println!("Frame:");
    println!("  Content size:     {}", header.content_size);
    println!("  Frame size:       {}", input.len());
    println!("  Block size:       {}", header.block_size);
    println!("  Level:            {}", header.level);
    println!("  Checksum:         {}", if header.checksum { "crc32" } else { "none" });
    println!("  Blocks:           {}", blocks.len());
    println!();
    println!("{:>8} {:>12} {:>10} {:>10} {:>14}", "block", "offset", "record", "raw", "mode");
    for (i, block) in blocks.iter().enumerate() {
        println!(
            "{:>8} {:>12} {:>10} {:>10} {:>14}",
            i,
            block.record_offset,
            block.record_len,
            block.raw_len,
            format!("{:?}", block.mode)
        );
    }

    Ok(0)
}

fn write_output(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut output = BufWriter::new(File::create(path)?);
    output.write_all(bytes)?;
    output.flush()
}

fn throughput(bytes: u64, elapsed: std::time::Duration) -> f64 {
    bytes as f64 / elapsed.as_secs_f64().max(1e-9) / 1_000_000.0
}
