//! Frame structure and metadata

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frame flag bitset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFlags(u32);

impl FrameFlags {
    /// The frame carries a meaningful timestamp.
    pub const HAS_TIMESTAMP: FrameFlags = FrameFlags(1 << 0);
    /// The frame must not be transmitted after its timestamp has passed.
    pub const NO_LATE: FrameFlags = FrameFlags(1 << 1);
    /// The frame carries link control data rather than user payload.
    pub const CONTROL_FRAME: FrameFlags = FrameFlags(1 << 2);

    /// Empty flag set
    pub fn empty() -> Self {
        FrameFlags(0)
    }

    /// Check whether all bits of `other` are set
    pub fn contains(self, other: FrameFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: FrameFlags) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`
    pub fn remove(&mut self, other: FrameFlags) {
        self.0 &= !other.0;
    }

    /// Raw bit representation
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for FrameFlags {
    type Output = FrameFlags;

    fn bitor(self, rhs: FrameFlags) -> FrameFlags {
        FrameFlags(self.0 | rhs.0)
    }
}

/// Typed metadata value attached to a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    /// Nanosecond timestamp
    Timestamp(i64),
    Str(String),
}

impl MetadataValue {
    /// Read the value as an unsigned integer if it is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MetadataValue::UInt(v) => Some(*v),
            MetadataValue::Int(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }
}

/// Well-known metadata keys set by the deframers.
pub mod meta {
    /// Bit errors tolerated in the syncword correlation.
    pub const SYNC_ERRORS: &str = "sync_errors";
    /// Bits corrected by the Golay header decode.
    pub const GOLAY_ERRORS: &str = "golay_errors";
    /// Symbols corrected by the Reed-Solomon payload decode.
    pub const RS_BYTES_CORRECTED: &str = "rs_bytes_corrected";
    /// Bits corrected by the Reed-Solomon payload decode.
    pub const RS_BITS_CORRECTED: &str = "rs_bits_corrected";
}

/// A transmissible unit of application data.
///
/// Frames are created by a framer's source or by a deframer on a successful
/// decode, and are owned by exactly one pipeline stage at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Frame identifier, assigned by the producer
    pub id: u64,
    /// Optional nanosecond timestamp of the first transmitted symbol
    pub timestamp: Option<i64>,
    /// Frame flags
    pub flags: FrameFlags,
    /// Typed metadata, unique keys
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Byte payload
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given id and payload
    pub fn new(id: u64, payload: Vec<u8>) -> Self {
        Self {
            id,
            payload,
            ..Self::default()
        }
    }

    /// Set the timestamp and the matching flag
    pub fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = Some(timestamp);
        self.flags.insert(FrameFlags::HAS_TIMESTAMP);
    }

    /// Insert or replace a metadata value
    pub fn set_meta(&mut self, key: &str, value: MetadataValue) {
        self.metadata.insert(key.to_string(), value);
    }

    /// Look up a metadata value
    pub fn meta(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// Look up a metadata value as an unsigned integer
    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(MetadataValue::as_u64)
    }

    /// Whether this is a link control frame
    pub fn is_control(&self) -> bool {
        self.flags.contains(FrameFlags::CONTROL_FRAME)
    }
}

/// Builder for frames with optional fields
pub struct FrameBuilder {
    id: u64,
    timestamp: Option<i64>,
    flags: FrameFlags,
}

impl FrameBuilder {
    /// Start building a frame with the given id
    pub fn new(id: u64) -> Self {
        Self {
            id,
            timestamp: None,
            flags: FrameFlags::empty(),
        }
    }

    /// Set the frame timestamp (nanoseconds)
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self.flags.insert(FrameFlags::HAS_TIMESTAMP);
        self
    }

    /// Set frame flags
    pub fn flags(mut self, flags: FrameFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Build the frame with the given payload
    pub fn build(self, payload: Vec<u8>) -> Frame {
        Frame {
            id: self.id,
            timestamp: self.timestamp,
            flags: self.flags,
            metadata: BTreeMap::new(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mut flags = FrameFlags::empty();
        assert!(!flags.contains(FrameFlags::NO_LATE));

        flags.insert(FrameFlags::NO_LATE);
        flags.insert(FrameFlags::HAS_TIMESTAMP);
        assert!(flags.contains(FrameFlags::NO_LATE));
        assert!(flags.contains(FrameFlags::NO_LATE | FrameFlags::HAS_TIMESTAMP));

        flags.remove(FrameFlags::NO_LATE);
        assert!(!flags.contains(FrameFlags::NO_LATE));
        assert!(flags.contains(FrameFlags::HAS_TIMESTAMP));
    }

    #[test]
    fn test_frame_timestamp() {
        let mut frame = Frame::new(7, vec![1, 2, 3]);
        assert!(frame.timestamp.is_none());

        frame.set_timestamp(1_500_000);
        assert_eq!(frame.timestamp, Some(1_500_000));
        assert!(frame.flags.contains(FrameFlags::HAS_TIMESTAMP));
    }

    #[test]
    fn test_metadata_access() {
        let mut frame = Frame::new(1, Vec::new());
        frame.set_meta(meta::SYNC_ERRORS, MetadataValue::UInt(2));
        frame.set_meta("station", MetadataValue::Str("OH2XYZ".into()));

        assert_eq!(frame.meta_u64(meta::SYNC_ERRORS), Some(2));
        assert_eq!(frame.meta_u64(meta::GOLAY_ERRORS), None);
        assert_eq!(
            frame.meta("station"),
            Some(&MetadataValue::Str("OH2XYZ".into()))
        );
    }

    #[test]
    fn test_builder() {
        let frame = FrameBuilder::new(42)
            .timestamp(123)
            .flags(FrameFlags::CONTROL_FRAME)
            .build(vec![0xAA]);

        assert_eq!(frame.id, 42);
        assert_eq!(frame.timestamp, Some(123));
        assert!(frame.is_control());
        assert!(frame.flags.contains(FrameFlags::HAS_TIMESTAMP));
        assert_eq!(frame.payload, vec![0xAA]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut frame = Frame::new(9, vec![1, 2, 3]);
        frame.set_meta(meta::GOLAY_ERRORS, MetadataValue::UInt(1));

        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 9);
        assert_eq!(back.payload, frame.payload);
        assert_eq!(back.meta_u64(meta::GOLAY_ERRORS), Some(1));
    }
}
