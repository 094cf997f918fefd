//! bl-frame - render payloads into a framed symbol stream

use anyhow::{Context, Result};
use burstlink_tools::common::{chunk_payload, read_payload, symbols_to_text};
use burstlink_tools::config::{LinkToolConfig, Protocol};
use burstlink_tools::pipeline::frame_payloads;
use clap::Parser;
use rand::RngCore;
use std::io::Write;
use std::path::PathBuf;

/// Frame a payload for transmission
#[derive(Debug, Parser)]
#[command(name = "bl-frame")]
#[command(about = "Frame payload bytes into a Burstlink symbol stream")]
struct Args {
    /// Payload file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Symbol stream output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Framing protocol
    #[arg(short, long, value_enum, default_value = "golay")]
    protocol: Protocol,

    /// TOML link configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Payload bytes per frame
    #[arg(long, default_value = "64")]
    chunk: usize,

    /// Ignore the input and send this many random payload bytes
    #[arg(long)]
    random: Option<usize>,

    /// Production buffer capacity in symbols
    #[arg(long, default_value = "256")]
    buffer: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LinkToolConfig::from_file(path)?,
        None => LinkToolConfig::default(),
    };
    config.protocol = args.protocol;

    let payload = match args.random {
        Some(len) => {
            let mut data = vec![0u8; len];
            rand::thread_rng().fill_bytes(&mut data);
            data
        }
        None => read_payload(args.input.as_deref())?,
    };

    let payloads = chunk_payload(&payload, args.chunk);
    let symbols = frame_payloads(&config, payloads, args.buffer)?;
    let text = symbols_to_text(&symbols);

    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .context("failed to write stdout")?,
    }
    Ok(())
}
