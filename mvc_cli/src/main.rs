use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mvc_compressors::{DeflateCompressor, Lz4Compressor, PassThroughCompressor, ZstdCompressor};
use mvc_core::{ChunkMeta, CompressionKind, Compressor, EncodedChunk, MeasureReader, MeasureWriter};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "mvc",
    about = "Measure value compression: encode, decode, and round-trip double columns",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a text column (one double per line) into a compressed payload
    Encode {
        /// Source column ("-" reads stdin)
        input: PathBuf,
        /// Destination payload file
        output: PathBuf,
        /// Declared digits after the decimal point
        #[arg(short, long)]
        decimal_places: i32,
        /// Compressor to use: passthrough | zstd | lz4 | deflate
        #[arg(short, long, default_value = "zstd")]
        codec: String,
        /// Compression level (zstd 1–22, deflate 0–9); compressor default if unset
        #[arg(long)]
        level: Option<i32>,
        /// Store values as-is instead of max-min scaled offsets
        #[arg(long)]
        plain: bool,
    },
    /// Decode a payload back into a text column
    ///
    /// The metadata printed by `encode` must be passed back in.
    Decode {
        /// Source payload file
        input: PathBuf,
        /// Destination column ("-" writes to stdout)
        output: PathBuf,
        /// Compressor the payload was written with
        #[arg(short, long, default_value = "zstd")]
        codec: String,
        /// Column maximum
        #[arg(long, allow_hyphen_values = true)]
        max: f64,
        /// Declared digits after the decimal point
        #[arg(short, long, allow_hyphen_values = true)]
        decimal_places: i32,
        /// Number of rows in the payload
        #[arg(short, long)]
        rows: usize,
        /// Variant id printed by `encode` (0 = double, 1 = double max-min scaled)
        #[arg(short, long, default_value_t = 1)]
        kind: u8,
        /// Expected xxh3 checksum (hex); verified before decoding when given
        #[arg(long)]
        checksum: Option<String>,
    },
    /// Encode and decode in memory, reporting ratio and reconstruction error
    Roundtrip {
        /// Source column ("-" reads stdin)
        input: PathBuf,
        /// Declared digits after the decimal point
        #[arg(short, long)]
        decimal_places: i32,
        /// Compressor to use: passthrough | zstd | lz4 | deflate
        #[arg(short, long, default_value = "zstd")]
        codec: String,
        /// Compression level (zstd 1–22, deflate 0–9); compressor default if unset
        #[arg(long)]
        level: Option<i32>,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn compressor_from_name(name: &str, level: Option<i32>) -> anyhow::Result<Arc<dyn Compressor>> {
    match name {
        "passthrough" | "pass" | "none" => Ok(Arc::new(PassThroughCompressor)),
        "zstd" | "z" => Ok(Arc::new(
            level.map(ZstdCompressor::new).unwrap_or_default(),
        )),
        "lz4" | "l" => Ok(Arc::new(Lz4Compressor)),
        "deflate" | "zlib" | "d" => Ok(Arc::new(
            level.map(DeflateCompressor::new).unwrap_or_default(),
        )),
        other => anyhow::bail!(
            "unknown codec '{}'. Valid options: passthrough, zstd, lz4, deflate",
            other
        ),
    }
}

fn kind_for(plain: bool) -> CompressionKind {
    if plain {
        CompressionKind::Double
    } else {
        CompressionKind::DoubleMaxMinScaled
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

/// Parse one double per non-blank line.
fn read_column(input: &Path) -> anyhow::Result<Vec<f64>> {
    let src: Box<dyn BufRead> = if input.to_str() == Some("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(
            File::open(input).with_context(|| format!("opening input file {:?}", input))?,
        ))
    };

    let mut values = Vec::new();
    for (lineno, line) in src.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let v: f64 = trimmed
            .parse()
            .with_context(|| format!("line {}: {:?} is not a number", lineno + 1, trimmed))?;
        values.push(v);
    }
    debug!(rows = values.len(), ?input, "read text column");
    Ok(values)
}

fn encode(
    values: &[f64],
    compressor: Arc<dyn Compressor>,
    kind: CompressionKind,
    decimal_places: i32,
) -> anyhow::Result<EncodedChunk> {
    let mut writer = MeasureWriter::create(compressor, kind, decimal_places)?;
    writer.extend(values);
    Ok(writer.finish()?)
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_encode(
    input: PathBuf,
    output: PathBuf,
    decimal_places: i32,
    codec_name: &str,
    level: Option<i32>,
    plain: bool,
) -> anyhow::Result<()> {
    let values = read_column(&input)?;
    let compressor = compressor_from_name(codec_name, level)?;
    let kind = kind_for(plain);

    let t0 = Instant::now();
    let chunk = encode(&values, compressor.clone(), kind, decimal_places)?;
    let elapsed = t0.elapsed();

    std::fs::write(&output, &chunk.payload)
        .with_context(|| format!("writing payload {:?}", output))?;

    eprintln!("  codec          : {} (id {})", compressor.name(), chunk.compressor_id);
    eprintln!("  variant        : {} (id {})", kind.name(), kind.id());
    eprintln!("  rows           : {}", chunk.meta.row_count);
    eprintln!("  max value      : {}", chunk.meta.max_value);
    eprintln!("  decimal places : {}", chunk.meta.decimal_places);
    eprintln!("  checksum       : {:016x}", chunk.checksum);
    eprintln!("  raw size       : {}", human_bytes(chunk.raw_size()));
    eprintln!("  compressed     : {}", human_bytes(chunk.compressed_size()));
    eprintln!("  ratio          : {:.2}x", chunk.ratio());
    eprintln!("  elapsed        : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_decode(
    input: PathBuf,
    output: PathBuf,
    codec_name: &str,
    max: f64,
    decimal_places: i32,
    rows: usize,
    kind_id: u8,
    checksum: Option<String>,
) -> anyhow::Result<()> {
    let payload =
        std::fs::read(&input).with_context(|| format!("reading payload {:?}", input))?;
    let kind = CompressionKind::from_id(kind_id)?;
    let meta = ChunkMeta::new(kind, max, decimal_places, rows);
    let compressor = compressor_from_name(codec_name, None)?;

    let mut chunk = EncodedChunk::new(payload, meta, compressor.id());
    if let Some(hex) = checksum {
        chunk.checksum = u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .with_context(|| format!("checksum {:?} is not hex", hex))?;
    }

    let t0 = Instant::now();
    let mut reader = MeasureReader::open(&chunk, compressor)?;
    let values = reader.read_range(0, reader.row_count())?;
    reader.free_memory();
    let elapsed = t0.elapsed();

    let is_stdout = output.to_str() == Some("-");
    let dst: Box<dyn Write> = if is_stdout {
        Box::new(io::stdout())
    } else {
        Box::new(
            File::create(&output).with_context(|| format!("creating output file {:?}", output))?,
        )
    };
    let mut dst = BufWriter::new(dst);
    for v in &values {
        writeln!(dst, "{}", v)?;
    }
    dst.flush()?;

    eprintln!("  rows        : {}", values.len());
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_roundtrip(
    input: PathBuf,
    decimal_places: i32,
    codec_name: &str,
    level: Option<i32>,
) -> anyhow::Result<()> {
    let values = read_column(&input)?;
    let compressor = compressor_from_name(codec_name, level)?;

    let t0 = Instant::now();
    let chunk = encode(
        &values,
        compressor.clone(),
        CompressionKind::DoubleMaxMinScaled,
        decimal_places,
    )?;
    let encode_elapsed = t0.elapsed();

    let t1 = Instant::now();
    let reader = MeasureReader::open(&chunk, compressor.clone())?;
    let decoded = reader.read_range(0, reader.row_count())?;
    let decode_elapsed = t1.elapsed();

    let max_error = values
        .iter()
        .zip(&decoded)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);

    println!();
    println!("=== Max-min scaled round trip ===");
    println!("  codec          : {}", compressor.name());
    println!("  rows           : {}", chunk.meta.row_count);
    println!("  decimal places : {}", decimal_places);
    println!("  raw size       : {}", human_bytes(chunk.raw_size()));
    println!("  compressed     : {}", human_bytes(chunk.compressed_size()));
    println!("  ratio          : {:.2}x", chunk.ratio());
    println!("  max abs error  : {:e}", max_error);
    println!("  encode         : {:.3}ms", encode_elapsed.as_secs_f64() * 1000.0);
    println!("  decode         : {:.3}ms", decode_elapsed.as_secs_f64() * 1000.0);

    if decimal_places >= 0 && max_error > 10f64.powi(-decimal_places) {
        anyhow::bail!(
            "reconstruction error {:e} exceeds the declared precision of {} decimal places",
            max_error,
            decimal_places
        );
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode {
            input,
            output,
            decimal_places,
            codec,
            level,
            plain,
        } => run_encode(input, output, decimal_places, &codec, level, plain),
        Commands::Decode {
            input,
            output,
            codec,
            max,
            decimal_places,
            rows,
            kind,
            checksum,
        } => run_decode(
            input,
            output,
            &codec,
            max,
            decimal_places,
            rows,
            kind,
            checksum,
        ),
        Commands::Roundtrip {
            input,
            decimal_places,
            codec,
            level,
        } => run_roundtrip(input, decimal_places, &codec, level),
    }
}
