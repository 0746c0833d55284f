// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`MountTraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use mortise_core::component::ContentKind;
use mortise_core::trace::{
    CompletionEvent, ItemChange, ItemOp, MountTraceSink, PassBeginEvent, PassEndEvent,
    PrepareEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    item_details: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("item_details", &self.item_details)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            item_details: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            item_details: false,
        }
    }

    /// Prints one line per item change instead of a per-pass count.
    #[must_use]
    pub fn with_item_details(mut self, item_details: bool) -> Self {
        self.item_details = item_details;
        self
    }

    /// Consumes the sink and returns the destination.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn kind_name(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::HostContainer => "host",
        ContentKind::ViewContent => "view",
        ContentKind::DrawableContent => "drawable",
    }
}

fn op_name(op: ItemOp) -> &'static str {
    match op {
        ItemOp::Mount => "mount",
        ItemOp::Unmount => "unmount",
        ItemOp::Update => "update",
        ItemOp::Move => "move",
        ItemOp::Disappear => "disappear",
    }
}

impl<W: Write> MountTraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} tree={:?} outputs={} dirty={} incremental={}",
            e.pass_index, e.tree_id, e.output_count, e.dirty, e.incremental,
        );
    }

    fn on_prepare(&mut self, e: &PrepareEvent) {
        let _ = writeln!(
            self.writer,
            "[prepare] pass={} unmounted={} moved={} unchanged={}",
            e.pass_index, e.stats.unmounted, e.stats.moved, e.stats.unchanged,
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let s = &e.stats;
        let path = if e.scrolled { "scroll" } else { "full" };
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} path={path} mounted={} unmounted={} updated={} \
             skipped={} disappearing={} torn_down={}",
            e.pass_index,
            s.mounted,
            s.unmounted,
            s.updated,
            s.skipped_updates,
            s.disappearing,
            s.torn_down,
        );
    }

    fn on_completions(&mut self, e: &CompletionEvent) {
        let _ = writeln!(
            self.writer,
            "[completions] after pass={} completed={} torn_down={}",
            e.pass_index, e.completed, e.torn_down,
        );
    }

    fn on_item_changes(&mut self, pass_index: u64, changes: &[ItemChange]) {
        if !self.item_details {
            let _ = writeln!(
                self.writer,
                "[items] pass={pass_index} changes={}",
                changes.len(),
            );
            return;
        }
        for change in changes {
            let _ = writeln!(
                self.writer,
                "[item] pass={pass_index} {} {} {:?} at {}",
                op_name(change.op),
                kind_name(change.kind),
                change.id,
                change.position,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortise_core::id::{OutputId, TreeId};

    #[test]
    fn pretty_print_pass_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 1,
            tree_id: TreeId(3),
            output_count: 20,
            dirty: true,
            incremental: true,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[pass:begin]"), "got: {output}");
        assert!(output.contains("pass=1"), "got: {output}");
        assert!(output.contains("outputs=20"), "got: {output}");
    }

    #[test]
    fn item_details_print_one_line_per_change() {
        let changes = [
            ItemChange {
                id: OutputId(4),
                position: 1,
                kind: ContentKind::ViewContent,
                op: ItemOp::Mount,
            },
            ItemChange {
                id: OutputId(7),
                position: 2,
                kind: ContentKind::DrawableContent,
                op: ItemOp::Unmount,
            },
        ];

        let mut summary = PrettyPrintSink::with_writer(Vec::<u8>::new());
        summary.on_item_changes(5, &changes);
        let output = String::from_utf8(summary.into_writer()).unwrap();
        assert_eq!(output.lines().count(), 1, "got: {output}");
        assert!(output.contains("changes=2"), "got: {output}");

        let mut detailed = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_item_details(true);
        detailed.on_item_changes(5, &changes);
        let output = String::from_utf8(detailed.into_writer()).unwrap();
        assert_eq!(output.lines().count(), 2, "got: {output}");
        assert!(output.contains("unmount drawable"), "got: {output}");
    }
}
