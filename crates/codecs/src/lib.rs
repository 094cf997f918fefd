//! Burstlink Codecs - Forward error correction for the framing stack
//!
//! This crate provides the channel codecs used by the Burstlink framing
//! protocols: a parameterized table-driven CRC engine, the extended
//! Golay(24,12) block code, a configurable Reed-Solomon codec over GF(2^m),
//! and the whitening transforms (CCSDS randomizer, PN9, G3RUH scrambler).

pub mod crc;
pub mod error;
pub mod galois;
pub mod golay;
pub mod reed_solomon;
pub mod registry;
pub mod whiten;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        crc::{CrcAlgorithm, CrcEngine},
        error::{CodecError, Result},
        golay,
        reed_solomon::{Corrections, ReedSolomon, ReedSolomonConfig},
        registry,
        whiten::{G3ruhDescrambler, G3ruhScrambler, NrziDecoder, NrziEncoder, Randomizer},
    };
}
