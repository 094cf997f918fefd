//! File-to-link plumbing shared by the bl-frame and bl-deframe binaries

use anyhow::Result;
use burstlink_core::buffer::BitBuffer;
use burstlink_core::frame::Frame;
use burstlink_core::gen::GeneratorState;
use burstlink_frame::golay_link::{GolayDeframer, GolayFramer};
use burstlink_frame::hdlc::{HdlcDeframer, HdlcFramer};
use burstlink_frame::ports::{Deframer, Framer, QueueSink, QueueSource};
use tracing::info;

use crate::config::{LinkToolConfig, Protocol};

/// Frame each payload as one burst and concatenate the symbol streams.
///
/// `buffer` is the production buffer capacity, standing in for the chunk
/// size a modulator would request.
pub fn frame_payloads(
    config: &LinkToolConfig,
    payloads: Vec<Vec<u8>>,
    buffer: usize,
) -> Result<Vec<u8>> {
    let mut source = QueueSource::new();
    let count = payloads.len();
    for (i, payload) in payloads.into_iter().enumerate() {
        source.push(Frame::new(i as u64, payload));
    }

    let symbols = match config.protocol {
        Protocol::Golay => run_framer(GolayFramer::new(config.golay.clone(), source)?, buffer)?,
        Protocol::Hdlc => run_framer(HdlcFramer::new(config.hdlc.clone(), source)?, buffer)?,
    };
    info!(frames = count, symbols = symbols.len(), "framing complete");
    Ok(symbols)
}

fn run_framer<F: Framer>(mut framer: F, buffer: usize) -> Result<Vec<u8>> {
    let mut dest = BitBuffer::with_capacity(buffer.max(1));
    let mut symbols = Vec::new();
    loop {
        let state = framer.produce(&mut dest)?;
        symbols.extend_from_slice(dest.data());
        if state == GeneratorState::NotStarted {
            return Ok(symbols);
        }
    }
}

/// Push a symbol stream through the configured deframer and collect frames.
pub fn deframe_symbols(config: &LinkToolConfig, symbols: &[u8]) -> Result<Vec<Frame>> {
    let frames = match config.protocol {
        Protocol::Golay => {
            let mut deframer = GolayDeframer::new(config.golay.clone(), QueueSink::new())?;
            for &symbol in symbols {
                deframer.sink_symbol(symbol, None);
            }
            info!(stats = ?deframer.stats(), "deframing complete");
            std::mem::take(&mut deframer.sink_mut().frames)
        }
        Protocol::Hdlc => {
            let mut deframer = HdlcDeframer::new(config.hdlc.clone(), QueueSink::new())?;
            for &symbol in symbols {
                deframer.sink_symbol(symbol, None);
            }
            info!(stats = ?deframer.stats(), "deframing complete");
            std::mem::take(&mut deframer.sink_mut().frames)
        }
    };
    Ok(frames.into_iter().collect())
}
