//! Tagged bit and sample sequence buffers

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Burst flag bitset carried by a sequence buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstFlags(u32);

impl BurstFlags {
    /// The timestamp field refers to the first element.
    pub const HAS_TIMESTAMP: BurstFlags = BurstFlags(1 << 0);
    /// First production of a burst.
    pub const START_OF_BURST: BurstFlags = BurstFlags(1 << 1);
    /// Last production of a burst.
    pub const END_OF_BURST: BurstFlags = BurstFlags(1 << 2);
    /// The burst must not be transmitted late.
    pub const NO_LATE: BurstFlags = BurstFlags(1 << 3);

    /// Empty flag set
    pub fn empty() -> Self {
        BurstFlags(0)
    }

    /// Check whether all bits of `other` are set
    pub fn contains(self, other: BurstFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: BurstFlags) {
        self.0 |= other.0;
    }

    /// Raw bit representation
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for BurstFlags {
    type Output = BurstFlags;

    fn bitor(self, rhs: BurstFlags) -> BurstFlags {
        BurstFlags(self.0 | rhs.0)
    }
}

/// An ordered, finite sequence of symbols with burst tagging.
///
/// The buffer has a fixed capacity chosen by its owner; producers fill it up
/// to that capacity and never beyond. Ownership of the contents transfers
/// with each production or consumption call.
#[derive(Debug, Clone)]
pub struct SeqBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    flags: BurstFlags,
    timestamp: Option<i64>,
}

impl<T> SeqBuffer<T> {
    /// Create an empty buffer with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            flags: BurstFlags::empty(),
            timestamp: None,
        }
    }

    /// Maximum number of elements the buffer accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining space before the capacity is reached
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Append an element, failing once the capacity is reached
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.data.len() >= self.capacity {
            return Err(CoreError::CapacityExceeded {
                len: self.data.len() + 1,
                capacity: self.capacity,
            });
        }
        self.data.push(value);
        Ok(())
    }

    /// Borrow the elements
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the elements
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Drop all elements and tags, keeping the capacity
    pub fn reset(&mut self) {
        self.data.clear();
        self.flags = BurstFlags::empty();
        self.timestamp = None;
    }

    /// Burst flags
    pub fn flags(&self) -> BurstFlags {
        self.flags
    }

    /// Mutable burst flags
    pub fn flags_mut(&mut self) -> &mut BurstFlags {
        &mut self.flags
    }

    /// Timestamp of the first element, if tagged
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Tag the first element with a nanosecond timestamp
    pub fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = Some(timestamp);
        self.flags.insert(BurstFlags::HAS_TIMESTAMP);
    }

    /// Iterate over the elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> Index<usize> for SeqBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for SeqBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Complex sample for IQ sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Iq {
    pub re: f64,
    pub im: f64,
}

impl Iq {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn magnitude(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }
}

/// Sequence of bit symbols (values 0 or 1)
pub type BitBuffer = SeqBuffer<u8>;

/// Sequence of complex samples
pub type SampleBuffer = SeqBuffer<Iq>;
