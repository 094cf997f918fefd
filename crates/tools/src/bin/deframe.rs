//! bl-deframe - recover frames from a symbol stream

use anyhow::{Context, Result};
use burstlink_tools::common::text_to_symbols;
use burstlink_tools::config::{LinkToolConfig, Protocol};
use burstlink_tools::pipeline::deframe_symbols;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// Recover frames from a received symbol stream
#[derive(Debug, Parser)]
#[command(name = "bl-deframe")]
#[command(about = "Deframe a Burstlink symbol stream back into frames")]
struct Args {
    /// Symbol stream file ('0'/'1' text; stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Framing protocol
    #[arg(short, long, value_enum, default_value = "golay")]
    protocol: Protocol,

    /// TOML link configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit one JSON object per frame instead of the text summary
    #[arg(long)]
    json: bool,
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

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let symbols = text_to_symbols(&text)?;
    let frames = deframe_symbols(&config, &symbols)?;

    for frame in &frames {
        if args.json {
            println!("{}", serde_json::to_string(frame)?);
        } else {
            let hex: String = frame.payload.iter().map(|b| format!("{b:02x}")).collect();
            println!("frame {} ({} bytes): {}", frame.id, frame.payload.len(), hex);
            for (key, value) in &frame.metadata {
                println!("  {key} = {value:?}");
            }
        }
    }
    eprintln!("{} frame(s) recovered", frames.len());
    Ok(())
}
