//! Burstlink Core - Frame data model and stream contracts
//!
//! This crate provides the shared vocabulary of the Burstlink stack: the
//! `Frame` exchanged with frame transports, the tagged bit/sample sequence
//! buffers exchanged with modems, and the suspendable `Generator` contract
//! that lets a framer render a frame into arbitrarily sized caller buffers.

pub mod bits;
pub mod buffer;
pub mod error;
pub mod frame;
pub mod gen;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{BitBuffer, BurstFlags, Iq, SampleBuffer, SeqBuffer},
        error::{CoreError, Result},
        frame::{Frame, FrameBuilder, FrameFlags, MetadataValue},
        gen::{BatchSource, Generator, GeneratorState},
    };
}
