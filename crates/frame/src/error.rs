//! Error types for Burstlink Frame

use burstlink_codecs::CodecError;
use burstlink_core::CoreError;
use thiserror::Error;

/// Frame processing error types
///
/// Only configuration and caller-sizing failures escape the framing state
/// machines; sync losses and uncorrectable codewords are handled internally
/// by resetting and counted in the per-protocol statistics.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid framer configuration: {msg}")]
    Config { msg: String },

    #[error("not implemented: {feature}")]
    NotImplemented { feature: &'static str },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for Burstlink Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
