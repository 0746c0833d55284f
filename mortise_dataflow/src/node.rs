// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value nodes.
//!
//! A [`ValueNode`] turns the values of its inputs into one output value per
//! frame. Inputs arrive in the order their edges were connected.

use alloc::boxed::Box;
use core::fmt;

/// One node of a [`DataFlowGraph`](crate::graph::DataFlowGraph).
pub trait ValueNode: fmt::Debug {
    /// Computes this frame's value from the inputs' values.
    fn calculate(&mut self, inputs: &[f32], frame_time_nanos: u64) -> f32;

    /// Whether the node will not change its value again.
    ///
    /// A binding is deactivated once every node in it is finished. Nodes
    /// that only transform their inputs are always finished.
    fn is_finished(&self) -> bool {
        true
    }
}

const NANOS_PER_MS: u64 = 1_000_000;

/// Ramps linearly from 0 to 1 over a duration, starting at the first frame
/// it sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingNode {
    duration_nanos: u64,
    start_nanos: Option<u64>,
    value: f32,
}

impl TimingNode {
    /// Creates a timing node that takes `duration_ms` to reach 1.
    #[must_use]
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_nanos: u64::from(duration_ms) * NANOS_PER_MS,
            start_nanos: None,
            value: 0.0,
        }
    }
}

impl ValueNode for TimingNode {
    fn calculate(&mut self, _inputs: &[f32], frame_time_nanos: u64) -> f32 {
        let start = *self.start_nanos.get_or_insert(frame_time_nanos);
        let elapsed = frame_time_nanos.saturating_sub(start);
        if elapsed >= self.duration_nanos {
            self.value = 1.0;
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "progress lies in 0..1, well within f32 range"
            )]
            let progress = (elapsed as f64 / self.duration_nanos as f64) as f32;
            self.value = progress;
        }
        self.value
    }

    fn is_finished(&self) -> bool {
        self.value >= 1.0
    }
}

/// Applies a function to its first input.
///
/// With no function it passes the input through.
pub struct SimpleNode {
    map: Option<Box<dyn FnMut(f32) -> f32>>,
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("mapped", &self.map.is_some())
            .finish()
    }
}

impl Default for SimpleNode {
    fn default() -> Self {
        Self::pass_through()
    }
}

impl SimpleNode {
    /// A node that forwards its input unchanged.
    #[must_use]
    pub fn pass_through() -> Self {
        Self { map: None }
    }

    /// A node that forwards `map(input)`.
    #[must_use]
    pub fn new(map: impl FnMut(f32) -> f32 + 'static) -> Self {
        Self {
            map: Some(Box::new(map)),
        }
    }
}

impl ValueNode for SimpleNode {
    fn calculate(&mut self, inputs: &[f32], _frame_time_nanos: u64) -> f32 {
        let input = inputs.first().copied().unwrap_or(0.0);
        match &mut self.map {
            Some(map) => map(input),
            None => input,
        }
    }
}

/// Always produces the same value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNode(pub f32);

impl ValueNode for ConstantNode {
    fn calculate(&mut self, _inputs: &[f32], _frame_time_nanos: u64) -> f32 {
        self.0
    }
}

/// A sink that records the last value it received.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputOnlyNode {
    last: Option<f32>,
}

impl OutputOnlyNode {
    /// Creates a node that has not received anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last received value.
    #[must_use]
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

impl ValueNode for OutputOnlyNode {
    fn calculate(&mut self, inputs: &[f32], _frame_time_nanos: u64) -> f32 {
        let value = inputs.first().copied().unwrap_or(0.0);
        self.last = Some(value);
        value
    }
}
