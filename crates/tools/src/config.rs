//! Configuration management for Burstlink tools

use anyhow::{Context, Result};
use burstlink_frame::golay_link::GolayLinkConfig;
use burstlink_frame::hdlc::HdlcConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Framing protocol selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Golay-header length-prefixed link
    Golay,
    /// Bit-stuffed HDLC link
    Hdlc,
}

/// Tool configuration: one section per protocol plus the active selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkToolConfig {
    pub protocol: Protocol,
    pub golay: GolayLinkConfig,
    pub hdlc: HdlcConfig,
}

impl Default for LinkToolConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Golay,
            golay: GolayLinkConfig::default(),
            hdlc: HdlcConfig::default(),
        }
    }
}

impl LinkToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config file")
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }
}
