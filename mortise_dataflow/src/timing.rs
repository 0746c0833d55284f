// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame sources.

/// Supplies frame times to a [`DataFlowGraph`](crate::graph::DataFlowGraph).
///
/// The graph starts its source when the first binding is activated and stops
/// it when the last one finishes. Platform sources usually push frames by
/// calling [`DataFlowGraph::do_frame`](crate::graph::DataFlowGraph::do_frame)
/// from a display callback; pull-style sources implement
/// [`next_frame`](Self::next_frame).
pub trait TimingSource {
    /// Begins producing frames.
    fn start(&mut self);

    /// Stops producing frames.
    fn stop(&mut self);

    /// Time of the next frame in nanoseconds, or `None` when stopped.
    fn next_frame(&mut self) -> Option<u64> {
        None
    }
}

/// Frame interval of [`MockTimingSource`], in milliseconds.
pub const FRAME_TIME_MS: u64 = 16;

const FRAME_TIME_NANOS: u64 = FRAME_TIME_MS * 1_000_000;

/// A deterministic source that advances a fixed [`FRAME_TIME_MS`] per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockTimingSource {
    running: bool,
    now_nanos: u64,
}

impl MockTimingSource {
    /// Creates a stopped source at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the source is producing frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time of the last produced frame.
    #[must_use]
    pub fn now_nanos(&self) -> u64 {
        self.now_nanos
    }
}

impl TimingSource for MockTimingSource {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn next_frame(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.now_nanos += FRAME_TIME_NANOS;
        Some(self.now_nanos)
    }
}
