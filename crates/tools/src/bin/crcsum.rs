//! bl-crc - checksum a file with a named CRC preset

use anyhow::Result;
use burstlink_codecs::crc::CrcEngine;
use burstlink_codecs::registry;
use burstlink_tools::common::read_payload;
use clap::Parser;
use std::path::PathBuf;

/// Compute a CRC over a file
#[derive(Debug, Parser)]
#[command(name = "bl-crc")]
#[command(about = "Checksum data with a named CRC algorithm")]
struct Args {
    /// Input file (stdin when omitted)
    input: Option<PathBuf>,

    /// Algorithm preset name
    #[arg(short, long, default_value = "CRC-32")]
    algorithm: String,

    /// List the available presets and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list {
        for name in registry::crc_preset_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let algorithm = registry::crc_algorithm(&args.algorithm)?;
    let engine = CrcEngine::new(algorithm)?;
    let data = read_payload(args.input.as_deref())?;
    let checksum = engine.calculate(&data);

    let hex_digits = (algorithm.width / 4) as usize;
    println!("{checksum:0hex_digits$x}");
    Ok(())
}
