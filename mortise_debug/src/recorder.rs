// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`MountTraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each starting with a one-byte tag.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Per-item changes are stored in full: a count followed by one fixed-size
//! record per change.

use mortise_core::component::ContentKind;
use mortise_core::diff::PrepareMountStats;
use mortise_core::id::{OutputId, TreeId};
use mortise_core::stats::MountStats;
use mortise_core::trace::{
    CompletionEvent, ItemChange, ItemOp, MountTraceSink, PassBeginEvent, PassEndEvent,
    PrepareEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PREPARE: u8 = 2;
const TAG_PASS_END: u8 = 3;
const TAG_COMPLETIONS: u8 = 4;
const TAG_ITEM_CHANGES: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`MountTraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_kind(&mut self, kind: ContentKind) {
        self.write_u8(match kind {
            ContentKind::HostContainer => 0,
            ContentKind::ViewContent => 1,
            ContentKind::DrawableContent => 2,
        });
    }

    fn write_op(&mut self, op: ItemOp) {
        self.write_u8(match op {
            ItemOp::Mount => 0,
            ItemOp::Unmount => 1,
            ItemOp::Update => 2,
            ItemOp::Move => 3,
            ItemOp::Disappear => 4,
        });
    }

    fn write_mount_stats(&mut self, s: &MountStats) {
        self.write_u32(s.mounted);
        self.write_u32(s.unmounted);
        self.write_u32(s.updated);
        self.write_u32(s.skipped_updates);
        self.write_u32(s.disappearing);
        self.write_u32(s.torn_down);
    }
}

impl MountTraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass_index);
        self.write_u32(e.tree_id.0);
        self.write_u32(e.output_count);
        self.write_bool(e.dirty);
        self.write_bool(e.incremental);
    }

    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.write_u8(TAG_PREPARE);
        self.write_u64(e.pass_index);
        self.write_u32(e.stats.unmounted);
        self.write_u32(e.stats.moved);
        self.write_u32(e.stats.unchanged);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.write_u8(TAG_PASS_END);
        self.write_u64(e.pass_index);
        self.write_mount_stats(&e.stats);
        self.write_bool(e.scrolled);
    }

    fn on_completions(&mut self, e: &CompletionEvent) {
        self.write_u8(TAG_COMPLETIONS);
        self.write_u64(e.pass_index);
        self.write_u32(e.completed);
        self.write_u32(e.torn_down);
    }

    fn on_item_changes(&mut self, pass_index: u64, changes: &[ItemChange]) {
        let count = u32::try_from(changes.len()).unwrap_or(u32::MAX);
        self.write_u8(TAG_ITEM_CHANGES);
        self.write_u64(pass_index);
        self.write_u32(count);
        for change in changes.iter().take(count as usize) {
            self.write_u64(change.id.0);
            self.write_u32(change.position);
            self.write_kind(change.kind);
            self.write_op(change.op);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PrepareEvent`].
    Prepare(PrepareEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`CompletionEvent`].
    Completions(CompletionEvent),
    /// The per-item changes of a pass.
    ItemChanges {
        /// Pass counter.
        pass_index: u64,
        /// Changes in the order they were made.
        changes: Vec<ItemChange>,
    },
}

impl RecordedEvent {
    /// Pass counter the event belongs to.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        match self {
            Self::PassBegin(e) => e.pass_index,
            Self::Prepare(e) => e.pass_index,
            Self::PassEnd(e) => e.pass_index,
            Self::Completions(e) => e.pass_index,
            Self::ItemChanges { pass_index, .. } => *pass_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_kind(&mut self) -> Option<ContentKind> {
        Some(match self.read_u8()? {
            0 => ContentKind::HostContainer,
            1 => ContentKind::ViewContent,
            2 => ContentKind::DrawableContent,
            _ => return None,
        })
    }

    fn read_op(&mut self) -> Option<ItemOp> {
        Some(match self.read_u8()? {
            0 => ItemOp::Mount,
            1 => ItemOp::Unmount,
            2 => ItemOp::Update,
            3 => ItemOp::Move,
            4 => ItemOp::Disappear,
            _ => return None,
        })
    }

    fn read_mount_stats(&mut self) -> Option<MountStats> {
        Some(MountStats {
            mounted: self.read_u32()?,
            unmounted: self.read_u32()?,
            updated: self.read_u32()?,
            skipped_updates: self.read_u32()?,
            disappearing: self.read_u32()?,
            torn_down: self.read_u32()?,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass_index: self.read_u64()?,
            tree_id: TreeId(self.read_u32()?),
            output_count: self.read_u32()?,
            dirty: self.read_bool()?,
            incremental: self.read_bool()?,
        }))
    }

    fn decode_prepare(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Prepare(PrepareEvent {
            pass_index: self.read_u64()?,
            stats: PrepareMountStats {
                unmounted: self.read_u32()?,
                moved: self.read_u32()?,
                unchanged: self.read_u32()?,
            },
        }))
    }

    fn decode_pass_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassEndEvent {
            pass_index: self.read_u64()?,
            stats: self.read_mount_stats()?,
            scrolled: self.read_bool()?,
        }))
    }

    fn decode_completions(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Completions(CompletionEvent {
            pass_index: self.read_u64()?,
            completed: self.read_u32()?,
            torn_down: self.read_u32()?,
        }))
    }

    fn decode_item_changes(&mut self) -> Option<RecordedEvent> {
        let pass_index = self.read_u64()?;
        let count = self.read_u32()? as usize;
        // Each record is 14 bytes; refuse counts the buffer cannot hold.
        if count > (self.data.len() - self.pos) / 14 {
            return None;
        }
        let mut changes = Vec::with_capacity(count);
        for _ in 0..count {
            changes.push(ItemChange {
                id: OutputId(self.read_u64()?),
                position: self.read_u32()?,
                kind: self.read_kind()?,
                op: self.read_op()?,
            });
        }
        Some(RecordedEvent::ItemChanges {
            pass_index,
            changes,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PREPARE => self.decode_prepare(),
            TAG_PASS_END => self.decode_pass_end(),
            TAG_COMPLETIONS => self.decode_completions(),
            TAG_ITEM_CHANGES => self.decode_item_changes(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
