//! HDLC framing protocol
//!
//! Frames are delimited by 0x7E flag octets with zero-bit stuffing after
//! five consecutive ones, an optional CRC-16/X25 trailer (big-endian in the
//! byte stream), and an optional G3RUH scrambled line coding (NRZI plus the
//! x^17+x^12+1 multiplicative scrambler) applied identically on both sides.
//! Payload octets travel least-significant bit first, as HDLC has always
//! done.
//!
//! The deframer is a three-state machine: `WaitingSync` hunts for a flag,
//! `ReceivingFrame` collects and destuffs bits between flags (treating
//! too-short frames as repeated start flags), and `Trailer` waits out the
//! inter-frame flag pattern before hunting again.

use burstlink_codecs::crc::{CrcAlgorithm, CrcEngine};
use burstlink_codecs::whiten::{G3ruhDescrambler, G3ruhScrambler, NrziDecoder, NrziEncoder};
use burstlink_codecs::CodecError;
use burstlink_core::bits::{bits_to_bytes_lsb, bytes_to_bits_lsb};
use burstlink_core::buffer::{BitBuffer, BurstFlags};
use burstlink_core::frame::{Frame, FrameFlags};
use burstlink_core::gen::{BatchSource, Generator, GeneratorState};
use burstlink_core::CoreError;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ports::{Deframer, FrameSink, FrameSource, Framer};
use crate::{FrameError, Result};

/// HDLC flag octet
const FLAG: u8 = 0x7E;

/// HDLC link parameters, shared by framer and deframer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdlcConfig {
    /// Flag octets sent before each frame
    pub preamble_flags: usize,
    /// Flag octets sent after each frame
    pub trailer_flags: usize,
    /// Append and verify a CRC-16/X25 trailer
    pub use_crc: bool,
    /// G3RUH scrambled line coding
    pub scramble: bool,
    /// Shortest frame (destuffed bytes, CRC included) accepted as real
    pub min_frame_len: usize,
    /// Longest frame (destuffed bytes, CRC included) before sync aborts
    pub max_frame_len: usize,
    /// Inter-frame flag bits to wait out after a frame
    pub min_silence_bits: usize,
}

impl Default for HdlcConfig {
    fn default() -> Self {
        Self {
            preamble_flags: 3,
            trailer_flags: 2,
            use_crc: true,
            scramble: false,
            min_frame_len: 2,
            max_frame_len: 2048,
            min_silence_bits: 8,
        }
    }
}

impl HdlcConfig {
    fn crc_len(&self) -> usize {
        if self.use_crc {
            2
        } else {
            0
        }
    }

    /// Largest payload a frame can carry
    pub fn max_payload(&self) -> usize {
        self.max_frame_len - self.crc_len()
    }

    fn validate(&self) -> Result<()> {
        if self.preamble_flags == 0 || self.trailer_flags == 0 {
            return Err(FrameError::Config {
                msg: "at least one preamble and one trailer flag are required".to_string(),
            });
        }
        let floor = self.crc_len().max(1);
        if self.min_frame_len < floor {
            return Err(FrameError::Config {
                msg: format!("minimum frame length {} below {floor}", self.min_frame_len),
            });
        }
        if self.max_frame_len < self.min_frame_len {
            return Err(FrameError::Config {
                msg: format!(
                    "maximum frame length {} below the minimum {}",
                    self.max_frame_len, self.min_frame_len
                ),
            });
        }
        Ok(())
    }

    fn build_crc(&self) -> Result<Option<CrcEngine>> {
        if self.use_crc {
            Ok(Some(CrcEngine::new(CrcAlgorithm::CRC16_X25)?))
        } else {
            Ok(None)
        }
    }
}

/// Rendering phases of one frame.
enum Phase {
    Preamble,
    Content,
    Trailer,
    Finished,
}

/// Batch source emitting flags, stuffed content, flags.
struct HdlcPhases {
    phase: Phase,
    preamble_flags: usize,
    trailer_flags: usize,
    content_bits: Vec<u8>,
}

impl HdlcPhases {
    fn new(config: &HdlcConfig, crc: Option<&CrcEngine>, frame: &Frame) -> Result<Self> {
        let max = config.max_payload();
        if frame.payload.len() > max {
            return Err(CodecError::MessageTooLong {
                len: frame.payload.len(),
                max,
            }
            .into());
        }

        let mut content = frame.payload.clone();
        if let Some(crc) = crc {
            let checksum = crc.calculate(&frame.payload) as u16;
            content.push((checksum >> 8) as u8);
            content.push(checksum as u8);
        }

        Ok(Self {
            phase: Phase::Preamble,
            preamble_flags: config.preamble_flags,
            trailer_flags: config.trailer_flags,
            content_bits: stuff(&bytes_to_bits_lsb(&content)),
        })
    }
}

fn push_flags(out: &mut Vec<u8>, count: usize) {
    for _ in 0..count {
        out.extend(bytes_to_bits_lsb(&[FLAG]));
    }
}

impl BatchSource<u8> for HdlcPhases {
    fn next_batch(&mut self, out: &mut Vec<u8>) -> bool {
        match self.phase {
            Phase::Preamble => {
                push_flags(out, self.preamble_flags);
                self.phase = Phase::Content;
                true
            }
            Phase::Content => {
                out.append(&mut self.content_bits);
                self.phase = Phase::Trailer;
                true
            }
            Phase::Trailer => {
                push_flags(out, self.trailer_flags);
                self.phase = Phase::Finished;
                false
            }
            Phase::Finished => false,
        }
    }
}

/// Insert a zero after every run of five ones.
fn stuff(bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len() + bits.len() / 5);
    let mut ones = 0u32;
    for &bit in bits {
        out.push(bit);
        if bit == 1 {
            ones += 1;
            if ones == 5 {
                out.push(0);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }
    out
}

/// Undo [`stuff`] and pack into bytes.
///
/// Returns `None` on an abort pattern (six or more ones) or a bit count
/// that is not a whole number of octets.
fn destuff(bits: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(bits.len());
    let mut ones = 0u32;
    for &bit in bits {
        if bit == 1 {
            ones += 1;
            if ones > 5 {
                return None;
            }
            out.push(1);
        } else {
            if ones == 5 {
                ones = 0;
                continue;
            }
            ones = 0;
            out.push(0);
        }
    }
    if out.len() % 8 != 0 {
        return None;
    }
    Some(bits_to_bytes_lsb(&out))
}

/// Framer for the HDLC link.
///
/// The scrambler and NRZI state are line properties and persist across
/// frames.
pub struct HdlcFramer<S: FrameSource> {
    config: HdlcConfig,
    source: S,
    crc: Option<CrcEngine>,
    scrambler: G3ruhScrambler,
    nrzi: NrziEncoder,
    gen: Option<Generator<u8, HdlcPhases>>,
}

impl<S: FrameSource> HdlcFramer<S> {
    /// Validate the configuration and bind the frame source.
    pub fn new(config: HdlcConfig, source: S) -> Result<Self> {
        config.validate()?;
        let crc = config.build_crc()?;
        Ok(Self {
            config,
            source,
            crc,
            scrambler: G3ruhScrambler::new(),
            nrzi: NrziEncoder::new(),
            gen: None,
        })
    }

    /// Link configuration
    pub fn config(&self) -> &HdlcConfig {
        &self.config
    }
}

impl<S: FrameSource> Framer for HdlcFramer<S> {
    fn produce(&mut self, dest: &mut BitBuffer) -> Result<GeneratorState> {
        if dest.capacity() == 0 {
            return Err(CoreError::BufferOverrun.into());
        }

        let mut gen = match self.gen.take() {
            Some(gen) => gen,
            None => {
                let Some(frame) = self.source.source_frame(None) else {
                    dest.reset();
                    return Ok(GeneratorState::NotStarted);
                };
                trace!(id = frame.id, len = frame.payload.len(), "framing");

                let phases = HdlcPhases::new(&self.config, self.crc.as_ref(), &frame)?;
                let mut gen = Generator::new(phases);
                let mut flags = BurstFlags::empty();
                if frame.flags.contains(FrameFlags::NO_LATE) {
                    flags.insert(BurstFlags::NO_LATE);
                }
                gen.set_burst_info(frame.timestamp, flags);
                gen
            }
        };

        let state = gen.produce(dest)?;
        if self.config.scramble {
            for bit in dest.data_mut() {
                let level = self.nrzi.encode(*bit);
                *bit = self.scrambler.scramble(level);
            }
        }
        if state != GeneratorState::Done {
            self.gen = Some(gen);
        }
        Ok(state)
    }

    fn reset(&mut self) {
        self.gen = None;
    }
}

/// Deframer state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitingSync,
    ReceivingFrame,
    Trailer,
}

/// Running counters kept by the deframer.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HdlcStats {
    /// Start flags detected
    pub syncs: u64,
    /// Frames delivered to the sink
    pub frames: u64,
    /// Frames dropped on a CRC mismatch
    pub crc_failures: u64,
    /// Syncs aborted (overlength or malformed stuffing)
    pub aborted: u64,
    /// Flags treated as repeated frame starts
    pub false_starts: u64,
}

/// Deframer for the HDLC link.
pub struct HdlcDeframer<S: FrameSink> {
    config: HdlcConfig,
    sink: S,
    crc: Option<CrcEngine>,
    descrambler: G3ruhDescrambler,
    nrzi: NrziDecoder,
    state: State,
    ones: u32,
    shift: u8,
    raw_bits: Vec<u8>,
    max_raw_bits: usize,
    silence: usize,
    frame_timestamp: Option<i64>,
    next_id: u64,
    stats: HdlcStats,
}

impl<S: FrameSink> HdlcDeframer<S> {
    /// Validate the configuration and bind the frame sink.
    pub fn new(config: HdlcConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let crc = config.build_crc()?;
        // Stuffing expands at most 6/5; one flag of slack
        let max_raw_bits = config.max_frame_len * 10 + 16;
        Ok(Self {
            config,
            sink,
            crc,
            descrambler: G3ruhDescrambler::new(),
            nrzi: NrziDecoder::new(),
            state: State::WaitingSync,
            ones: 0,
            shift: 0,
            raw_bits: Vec::new(),
            max_raw_bits,
            silence: 0,
            frame_timestamp: None,
            next_id: 0,
            stats: HdlcStats::default(),
        })
    }

    /// Running statistics
    pub fn stats(&self) -> &HdlcStats {
        &self.stats
    }

    /// Borrow the sink (for draining collected frames in tests/tools)
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn enter_wait(&mut self) {
        self.state = State::WaitingSync;
        self.ones = 0;
        self.shift = 0;
        self.raw_bits.clear();
    }

    fn on_wait_bit(&mut self, bit: u8, timestamp: Option<i64>) {
        if bit == 1 {
            self.ones += 1;
            return;
        }
        if self.ones >= 6 {
            trace!("start flag detected");
            self.stats.syncs += 1;
            self.raw_bits.clear();
            self.shift = FLAG;
            self.frame_timestamp = timestamp;
            self.state = State::ReceivingFrame;
            self.sink.sync_detected(true, timestamp);
        }
        self.ones = 0;
    }

    fn on_frame_bit(&mut self, bit: u8, timestamp: Option<i64>) {
        self.shift = (self.shift << 1) | bit;
        self.raw_bits.push(bit);

        if self.shift == FLAG {
            let content_len = self.raw_bits.len().saturating_sub(8);
            let content: Vec<u8> = self.raw_bits[..content_len].to_vec();
            self.raw_bits.clear();
            self.on_boundary(&content, timestamp);
            return;
        }

        if self.raw_bits.len() > self.max_raw_bits {
            debug!("frame exceeds maximum length, dropping sync");
            self.stats.aborted += 1;
            self.sink.sync_detected(false, timestamp);
            self.enter_wait();
        }
    }

    /// A closing flag arrived; decide between repeated start, garbage and a
    /// real frame.
    fn on_boundary(&mut self, content: &[u8], timestamp: Option<i64>) {
        let Some(bytes) = destuff(content) else {
            debug!("malformed stuffing between flags, dropping sync");
            self.stats.aborted += 1;
            self.sink.sync_detected(false, timestamp);
            self.enter_wait();
            return;
        };

        if bytes.len() < self.config.min_frame_len {
            // Too short to be a frame; the flag was a repeated start.
            self.stats.false_starts += 1;
            self.frame_timestamp = timestamp;
            return;
        }

        self.sink.sync_detected(false, timestamp);

        let payload = match &self.crc {
            Some(crc) => {
                let split = bytes.len() - 2;
                let received = u16::from_be_bytes([bytes[split], bytes[split + 1]]);
                let computed = crc.calculate(&bytes[..split]) as u16;
                if received != computed {
                    debug!(received, computed, "frame check sequence mismatch, dropping");
                    self.stats.crc_failures += 1;
                    self.enter_wait();
                    return;
                }
                bytes[..split].to_vec()
            }
            None => bytes,
        };

        let mut frame = Frame::new(self.next_id, payload);
        self.next_id += 1;
        if let Some(ts) = self.frame_timestamp {
            frame.set_timestamp(ts);
        }
        trace!(id = frame.id, len = frame.payload.len(), "frame received");
        self.stats.frames += 1;
        self.sink.sink_frame(frame, timestamp);

        if self.config.min_silence_bits == 0 {
            self.enter_wait();
        } else {
            self.state = State::Trailer;
            self.silence = 0;
        }
    }

    fn on_trailer_bit(&mut self) {
        self.silence += 1;
        if self.silence >= self.config.min_silence_bits {
            self.enter_wait();
        }
    }
}

impl<S: FrameSink> Deframer for HdlcDeframer<S> {
    fn sink_symbol(&mut self, bit: u8, timestamp: Option<i64>) {
        let bit = if self.config.scramble {
            let level = self.descrambler.descramble(bit & 1);
            self.nrzi.decode(level)
        } else {
            bit & 1
        };

        match self.state {
            State::WaitingSync => self.on_wait_bit(bit, timestamp),
            State::ReceivingFrame => self.on_frame_bit(bit, timestamp),
            State::Trailer => self.on_trailer_bit(),
        }
    }

    fn reset(&mut self) {
        self.enter_wait();
    }
}
