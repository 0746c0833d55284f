// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for mount passes.
//!
//! This module provides a [`MountTraceSink`] trait with per-event methods
//! that the mount engine calls at each stage of a pass. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn MountTraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When **on**,
//! each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): collects per-item [`ItemChange`]
//!   records during a pass and enables the corresponding `MountTraceSink`
//!   method.

use crate::component::ContentKind;
use crate::diff::PrepareMountStats;
use crate::id::{OutputId, TreeId};
use crate::stats::MountStats;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of a mount pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Tree the mounted layout belongs to.
    pub tree_id: TreeId,
    /// Number of outputs in the layout.
    pub output_count: u32,
    /// Whether the pass diffs against the previous layout.
    pub dirty: bool,
    /// Whether a viewport limits the pass.
    pub incremental: bool,
}

/// Emitted after the diff against the previous layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrepareEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Diff counters.
    pub stats: PrepareMountStats,
}

/// Emitted at the end of a mount pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassEndEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Mount counters.
    pub stats: MountStats,
    /// Whether the pass was handled by the scroll fast path.
    pub scrolled: bool,
}

/// Emitted after pending animation completions are drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionEvent {
    /// Counter of the last completed pass.
    pub pass_index: u64,
    /// Number of completions processed.
    pub completed: u32,
    /// Disappearing items torn down as a result.
    pub torn_down: u32,
}

/// What happened to an item during a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemOp {
    /// Content was acquired and attached.
    Mount,
    /// Content was detached and released.
    Unmount,
    /// Content was refreshed for a changed output.
    Update,
    /// Content moved within its host.
    Move,
    /// Content was detached from diffing to play an exit animation.
    Disappear,
}

/// A per-item change record, delivered to sinks with `trace-rich`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemChange {
    /// Output the item belongs to.
    pub id: OutputId,
    /// Position of the output in the layout the change was made against.
    pub position: u32,
    /// Kind of content.
    pub kind: ContentKind,
    /// What happened.
    pub op: ItemOp,
}

// ---------------------------------------------------------------------------
// MountTraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the mount engine.
///
/// Every method defaults to doing nothing; implement the ones a sink needs.
pub trait MountTraceSink {
    /// Called at the start of a pass.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called after the diff of a dirty pass.
    fn on_prepare(&mut self, e: &PrepareEvent) {
        _ = e;
    }

    /// Called at the end of a pass.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called after animation completions are drained.
    fn on_completions(&mut self, e: &CompletionEvent) {
        _ = e;
    }

    /// Called with the per-item changes of a pass (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_item_changes(&mut self, pass_index: u64, changes: &[ItemChange]) {
        _ = (pass_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`MountTraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MountTraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`MountTraceSink`].
///
/// Without the `trace` feature the wrapper is zero-sized and its methods are
/// empty. With it, each call costs one `Option` check.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn MountTraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn MountTraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn MountTraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether per-item changes should be collected for this tracer.
    #[inline]
    #[must_use]
    pub fn wants_item_changes(&self) -> bool {
        #[cfg(feature = "trace-rich")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            false
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PrepareEvent`].
    #[inline]
    pub fn prepare(&mut self, e: &PrepareEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_prepare(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompletionEvent`].
    #[inline]
    pub fn completions(&mut self, e: &CompletionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_completions(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits per-item changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn item_changes(&mut self, pass_index: u64, changes: &[ItemChange]) {
        if let Some(s) = &mut self.sink {
            s.on_item_changes(pass_index, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
