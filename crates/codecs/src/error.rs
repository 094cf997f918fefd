//! Error types for Burstlink Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid codec configuration: {msg}")]
    Config { msg: String },

    #[error("unknown algorithm preset: {name}")]
    UnknownPreset { name: String },

    #[error("message too long: {len} bytes exceeds {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("message too short: {len} bytes, need more than {min}")]
    MessageTooShort { len: usize, min: usize },

    #[error("error pattern exceeds the correction capability of the code")]
    Uncorrectable,

    #[error("not implemented: {feature}")]
    NotImplemented { feature: &'static str },
}

/// Result type for Burstlink Codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
