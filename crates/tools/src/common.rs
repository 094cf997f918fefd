//! Shared helpers for the Burstlink tools
//!
//! The tools exchange symbol streams as ASCII text: one '0' or '1' per
//! transmitted bit, whitespace ignored. That keeps captures diffable and
//! easy to splice in tests.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a payload from a file, or from stdin when no path is given.
pub fn read_payload(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .context("failed to read stdin")?;
            Ok(data)
        }
    }
}

/// Render a symbol stream as '0'/'1' text, 64 symbols per line.
pub fn symbols_to_text(symbols: &[u8]) -> String {
    let mut text = String::with_capacity(symbols.len() + symbols.len() / 64 + 1);
    for (i, &symbol) in symbols.iter().enumerate() {
        text.push(if symbol == 0 { '0' } else { '1' });
        if (i + 1) % 64 == 0 {
            text.push('\n');
        }
    }
    if !text.ends_with('\n') && !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Parse '0'/'1' text back into a symbol stream, ignoring whitespace.
pub fn text_to_symbols(text: &str) -> Result<Vec<u8>> {
    let mut symbols = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '0' => symbols.push(0),
            '1' => symbols.push(1),
            c if c.is_whitespace() => {}
            c => bail!("invalid symbol character {c:?}"),
        }
    }
    Ok(symbols)
}

/// Split a payload into transmission-sized chunks (the last may be short).
pub fn chunk_payload(data: &[u8], chunk: usize) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }
    data.chunks(chunk.max(1)).map(<[u8]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_text_roundtrip() {
        let symbols: Vec<u8> = (0..200).map(|i| (i % 3 == 0) as u8).collect();
        let text = symbols_to_text(&symbols);
        assert!(text.lines().all(|l| l.len() <= 64));
        assert_eq!(text_to_symbols(&text).unwrap(), symbols);
    }

    #[test]
    fn test_text_rejects_garbage() {
        assert!(text_to_symbols("0101x10").is_err());
        assert_eq!(text_to_symbols(" 0 1\n1 ").unwrap(), vec![0, 1, 1]);
    }

    #[test]
    fn test_chunking() {
        let data = [1u8, 2, 3, 4, 5];
        assert_eq!(chunk_payload(&data, 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(chunk_payload(&[], 16), vec![Vec::<u8>::new()]);
    }
}
