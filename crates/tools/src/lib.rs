//! Burstlink Tools library

pub mod common;
pub mod config;
pub mod pipeline;

pub use common::{read_payload, symbols_to_text, text_to_symbols};
pub use config::{LinkToolConfig, Protocol};
pub use pipeline::{deframe_symbols, frame_payloads};
