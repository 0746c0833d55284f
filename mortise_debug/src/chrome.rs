// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns the bytes captured by a
//! [`RecorderSink`](super::recorder::RecorderSink) into [Chrome Trace Event
//! Format][format] JSON.
//!
//! Mount passes carry no wall-clock timestamps, so the pass counter is used
//! as a logical clock: pass `n` spans `n * PASS_SPAN_US` to
//! `n * PASS_SPAN_US + PASS_SPAN_US / 2` microseconds, and the events of the
//! pass are placed inside that span.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Logical duration of one pass slot, in microseconds.
pub const PASS_SPAN_US: u64 = 1000;

/// Writes a recording as a JSON array of trace events.
///
/// Load the result in [Perfetto](https://ui.perfetto.dev/) or
/// `chrome://tracing`. Each mount pass becomes one `MountPass` span.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PassBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "MountPass",
                    "cat": "Mount",
                    "ts": slot(e.pass_index, 0),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "pass_index": e.pass_index,
                        "tree_id": e.tree_id.0,
                        "output_count": e.output_count,
                        "dirty": e.dirty,
                        "incremental": e.incremental,
                    }
                }));
            }
            RecordedEvent::Prepare(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Prepare",
                    "cat": "Mount",
                    "ts": slot(e.pass_index, 100),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "unmounted": e.stats.unmounted,
                        "moved": e.stats.moved,
                        "unchanged": e.stats.unchanged,
                    }
                }));
            }
            RecordedEvent::ItemChanges {
                pass_index,
                changes,
            } => {
                let changes: Vec<Value> = changes
                    .iter()
                    .map(|c| {
                        json!({
                            "id": c.id.0,
                            "position": c.position,
                            "kind": format!("{:?}", c.kind),
                            "op": format!("{:?}", c.op),
                        })
                    })
                    .collect();
                events.push(json!({
                    "ph": "i",
                    "name": "ItemChanges",
                    "cat": "Rich",
                    "ts": slot(pass_index, 200),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "count": changes.len(),
                        "changes": changes,
                    }
                }));
            }
            RecordedEvent::PassEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "MountPass",
                    "cat": "Mount",
                    "ts": slot(e.pass_index, PASS_SPAN_US / 2),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "scrolled": e.scrolled,
                        "mounted": e.stats.mounted,
                        "unmounted": e.stats.unmounted,
                        "updated": e.stats.updated,
                        "skipped_updates": e.stats.skipped_updates,
                        "disappearing": e.stats.disappearing,
                        "torn_down": e.stats.torn_down,
                    }
                }));
            }
            RecordedEvent::Completions(e) => {
                // Drained between passes, after the pass it is numbered with.
                events.push(json!({
                    "ph": "i",
                    "name": "Completions",
                    "cat": "Animation",
                    "ts": slot(e.pass_index, PASS_SPAN_US * 3 / 4),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "completed": e.completed,
                        "torn_down": e.torn_down,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn slot(pass_index: u64, offset_us: u64) -> u64 {
    pass_index.saturating_mul(PASS_SPAN_US).saturating_add(offset_us)
}
