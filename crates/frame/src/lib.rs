//! Burstlink Frame - Bit-level framing protocols
//!
//! This crate composes the Burstlink codecs into complete over-the-air
//! frame formats: a length-prefixed link with a Golay-protected header and
//! optional Reed-Solomon payload coding, and a bit-stuffed HDLC link with
//! optional scrambling and CRC trailer. Framers render frames through the
//! core generator contract; deframers consume one demodulated bit per call.

pub mod error;
pub mod golay_link;
pub mod hdlc;
pub mod ports;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        error::{FrameError, Result},
        golay_link::{GolayDeframer, GolayFramer, GolayLinkConfig, LinkStats},
        hdlc::{HdlcConfig, HdlcDeframer, HdlcFramer, HdlcStats},
        ports::{Deframer, FrameSink, FrameSource, Framer, QueueSink, QueueSource},
    };
}
