//! Error types for Burstlink Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("destination buffer has zero capacity")]
    BufferOverrun,

    #[error("sequence capacity exceeded: {len} > {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },
}

/// Result type for Burstlink Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
