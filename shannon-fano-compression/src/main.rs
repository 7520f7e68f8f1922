use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use shannon_fano_compression::{
    decode, CompressionStats, Encoded, Encoder, EncoderConfig, SingleSymbolPolicy,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into a Shannon–Fano artifact
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Fail on inputs made of a single distinct byte instead of giving it a one bit code
        #[arg(long)]
        reject_single_symbol: bool,
    },
    /// Restore the original file from an artifact
    Decode { input: PathBuf, output: PathBuf },
    /// Encode and decode a file in memory, writing the decoded text
    RoundTrip { input: PathBuf, output: PathBuf },
    /// Print entropy and compression figures for a file
    Stats {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Args::parse().command {
        Command::Encode {
            input,
            output,
            reject_single_symbol,
        } => {
            let single_symbol = if reject_single_symbol {
                SingleSymbolPolicy::Reject
            } else {
                SingleSymbolPolicy::Placeholder
            };
            let content = read_input(&input)?;
            let encoded = encode_content(&content, &input, EncoderConfig { single_symbol })?;
            fs::write(&output, encoded.bytes())
                .with_context(|| format!("Failed to write artifact to {}", output.display()))?;
            log_stats(&encoded.stats());
        }
        Command::Decode { input, output } => {
            let artifact = fs::read(&input)
                .with_context(|| format!("Failed to read artifact {}", input.display()))?;
            let started = Instant::now();
            let content = decode(&artifact)
                .with_context(|| format!("Failed to decode {}", input.display()))?;
            info!("decoded {} bytes in {:?}", content.len(), started.elapsed());
            fs::write(&output, content)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Command::RoundTrip { input, output } => {
            let content = read_input(&input)?;
            let encoded = encode_content(&content, &input, EncoderConfig::default())?;
            let decoded = decode(encoded.bytes()).context("Failed to decode artifact")?;
            if decoded != content {
                bail!("Decoded content of {} differs from the input", input.display());
            }
            fs::write(&output, decoded)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log_stats(&encoded.stats());
        }
        Command::Stats { input, json } => {
            let content = read_input(&input)?;
            let stats = encode_content(&content, &input, EncoderConfig::default())?.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn encode_content(content: &[u8], input: &Path, config: EncoderConfig) -> anyhow::Result<Encoded> {
    let started = Instant::now();
    let encoded = Encoder::with_config(config)
        .encode(content)
        .with_context(|| format!("Failed to encode {}", input.display()))?;
    info!(
        "encoded {} bytes into {} in {:?}",
        content.len(),
        encoded.bytes().len(),
        started.elapsed()
    );
    Ok(encoded)
}

fn log_stats(stats: &CompressionStats) {
    info!(
        "entropy {:.4} bits, average code length {:.4} bits, compression ratio {:.3}",
        stats.entropy, stats.average_code_length, stats.compression_ratio
    );
}

fn print_stats(stats: &CompressionStats) {
    println!("symbols: {}", stats.symbol_count);
    println!("alphabet size: {}", stats.alphabet_size);
    println!("entropy (bits/symbol): {:.4}", stats.entropy);
    println!("average code length (bits/symbol): {:.4}", stats.average_code_length);
    println!("redundancy of the original text (%): {:.2}", stats.raw_redundancy * 100.0);
    println!("redundancy of the encoded text (%): {:.2}", stats.encoded_redundancy * 100.0);
    println!("payload bits: {}", stats.payload_bits);
    println!("artifact bytes: {}", stats.artifact_bytes);
    println!("compression ratio: {:.3}", stats.compression_ratio);
}
