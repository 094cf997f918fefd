//! Frame transport seams
//!
//! A framer pulls frames from one [`FrameSource`]; a deframer pushes
//! completed frames into one [`FrameSink`]. Each link is a single typed
//! interface the owning component is constructed with; callers needing
//! fan-out keep their own list of sinks.

use burstlink_core::buffer::BitBuffer;
use burstlink_core::frame::Frame;
use burstlink_core::gen::GeneratorState;
use std::collections::VecDeque;

use crate::Result;

/// Supplier of frames to transmit.
pub trait FrameSource {
    /// Next frame to send, or `None` when nothing is queued.
    fn source_frame(&mut self, timestamp: Option<i64>) -> Option<Frame>;
}

/// Consumer of received frames.
pub trait FrameSink {
    /// Deliver a completed frame.
    fn sink_frame(&mut self, frame: Frame, timestamp: Option<i64>);

    /// Synchronization state notification (HDLC start/end flags).
    fn sync_detected(&mut self, _locked: bool, _timestamp: Option<i64>) {}
}

/// A framer renders queued frames into bit sequences on demand.
pub trait Framer {
    /// Fill `dest` with the next symbols of the current frame, pulling a
    /// new frame from the source when idle.
    fn produce(&mut self, dest: &mut BitBuffer) -> Result<GeneratorState>;

    /// Discard any partially rendered frame.
    fn reset(&mut self);
}

/// A deframer consumes one demodulated symbol per call.
pub trait Deframer {
    /// Push one bit (0 or 1) with an optional nanosecond timestamp.
    fn sink_symbol(&mut self, bit: u8, timestamp: Option<i64>);

    /// Drop in-progress state and return to hunting for sync.
    fn reset(&mut self);
}

/// FIFO frame source backed by a queue.
#[derive(Debug, Default)]
pub struct QueueSource {
    queue: VecDeque<Frame>,
}

impl QueueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for transmission
    pub fn push(&mut self, frame: Frame) {
        self.queue.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FrameSource for QueueSource {
    fn source_frame(&mut self, _timestamp: Option<i64>) -> Option<Frame> {
        self.queue.pop_front()
    }
}

/// Frame sink that collects everything it is handed.
#[derive(Debug, Default)]
pub struct QueueSink {
    /// Received frames in arrival order
    pub frames: VecDeque<Frame>,
    /// Sync transition history
    pub sync_events: Vec<bool>,
}

impl QueueSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for QueueSink {
    fn sink_frame(&mut self, frame: Frame, _timestamp: Option<i64>) {
        self.frames.push_back(frame);
    }

    fn sync_detected(&mut self, locked: bool, _timestamp: Option<i64>) {
        self.sync_events.push(locked);
    }
}
