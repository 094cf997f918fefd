//! Named codec presets
//!
//! String-keyed lookup of the built-in CRC algorithms and Reed-Solomon
//! codes, so deployments can select codecs from configuration files without
//! spelling out parameters. Unknown names fail with
//! [`CodecError::UnknownPreset`].

use crate::crc::CrcAlgorithm;
use crate::reed_solomon::ReedSolomonConfig;
use crate::{CodecError, Result};

/// Built-in CRC algorithm presets, catalogue parameterization.
static CRC_PRESETS: &[(&str, CrcAlgorithm)] = &[
    (
        "CRC-8",
        CrcAlgorithm {
            width: 8,
            poly: 0x07,
            init: 0x00,
            ref_in: false,
            ref_out: false,
            xor_out: 0x00,
        },
    ),
    (
        "CRC-8/CDMA2000",
        CrcAlgorithm {
            width: 8,
            poly: 0x9B,
            init: 0xFF,
            ref_in: false,
            ref_out: false,
            xor_out: 0x00,
        },
    ),
    (
        "CRC-16/CCITT-FALSE",
        CrcAlgorithm {
            width: 16,
            poly: 0x1021,
            init: 0xFFFF,
            ref_in: false,
            ref_out: false,
            xor_out: 0x0000,
        },
    ),
    ("CRC-16/X25", CrcAlgorithm::CRC16_X25),
    (
        "CRC-16/XMODEM",
        CrcAlgorithm {
            width: 16,
            poly: 0x1021,
            init: 0x0000,
            ref_in: false,
            ref_out: false,
            xor_out: 0x0000,
        },
    ),
    (
        "CRC-16/USB",
        CrcAlgorithm {
            width: 16,
            poly: 0x8005,
            init: 0xFFFF,
            ref_in: true,
            ref_out: true,
            xor_out: 0xFFFF,
        },
    ),
    (
        "CRC-24/OPENPGP",
        CrcAlgorithm {
            width: 24,
            poly: 0x86_4CFB,
            init: 0xB7_04CE,
            ref_in: false,
            ref_out: false,
            xor_out: 0x00_0000,
        },
    ),
    (
        "CRC-32",
        CrcAlgorithm {
            width: 32,
            poly: 0x04C1_1DB7,
            init: 0xFFFF_FFFF,
            ref_in: true,
            ref_out: true,
            xor_out: 0xFFFF_FFFF,
        },
    ),
    (
        "CRC-32/BZIP2",
        CrcAlgorithm {
            width: 32,
            poly: 0x04C1_1DB7,
            init: 0xFFFF_FFFF,
            ref_in: false,
            ref_out: false,
            xor_out: 0xFFFF_FFFF,
        },
    ),
    (
        "CRC-32/POSIX",
        CrcAlgorithm {
            width: 32,
            poly: 0x04C1_1DB7,
            init: 0x0000_0000,
            ref_in: false,
            ref_out: false,
            xor_out: 0xFFFF_FFFF,
        },
    ),
    (
        "CRC-32C",
        CrcAlgorithm {
            width: 32,
            poly: 0x1EDC_6F41,
            init: 0xFFFF_FFFF,
            ref_in: true,
            ref_out: true,
            xor_out: 0xFFFF_FFFF,
        },
    ),
];

/// Look up a CRC algorithm by its catalogue name.
pub fn crc_algorithm(name: &str) -> Result<CrcAlgorithm> {
    CRC_PRESETS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, algorithm)| *algorithm)
        .ok_or_else(|| CodecError::UnknownPreset {
            name: name.to_string(),
        })
}

/// Names of the built-in CRC presets.
pub fn crc_preset_names() -> Vec<&'static str> {
    CRC_PRESETS.iter().map(|(name, _)| *name).collect()
}

/// Look up a Reed-Solomon code by name.
pub fn reed_solomon(name: &str) -> Result<ReedSolomonConfig> {
    match name {
        "CCSDS RS(255,223)" => Ok(ReedSolomonConfig::ccsds_255_223()),
        "CCSDS RS(255,239)" => Ok(ReedSolomonConfig::ccsds_255_239()),
        _ => Err(CodecError::UnknownPreset {
            name: name.to_string(),
        }),
    }
}

/// Names of the built-in Reed-Solomon presets.
pub fn reed_solomon_preset_names() -> Vec<&'static str> {
    vec!["CCSDS RS(255,223)", "CCSDS RS(255,239)"]
}
