// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility event tracking.
//!
//! After a mount pass with visibility processing enabled, every
//! [`VisibilityOutput`] of the layout is compared against the visible rect.
//! The tracker remembers which outputs were visible and focused on the
//! previous pass and reports transitions as [`VisibilityEvent`]s.
//!
//! Rules:
//!
//! - An output is visible when it strictly intersects the visible rect and
//!   the visible part covers its height and width ratios. Both ratios zero
//!   means any intersection counts.
//! - An output large enough to cover half the visible area is focused while
//!   its visible part covers half the visible area; a smaller output is
//!   focused while it is fully visible.
//! - A full impression is reported once each of its four edges has been seen.
//! - A changed global key ends the old tracking and starts over.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::layout::{VisibilityHandlers, VisibilityOutput, intersects};

/// Kind of visibility transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityEventKind {
    /// Entered the visible range.
    Visible,
    /// Left the visible range.
    Invisible,
    /// Entered the focused range.
    Focused,
    /// Left the focused range.
    Unfocused,
    /// Every edge has been seen.
    FullImpression,
}

/// A visibility transition for one output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Id of the [`VisibilityOutput`].
    pub id: u64,
    /// What happened.
    pub kind: VisibilityEventKind,
}

const EDGE_LEFT: u8 = 1 << 0;
const EDGE_TOP: u8 = 1 << 1;
const EDGE_RIGHT: u8 = 1 << 2;
const EDGE_BOTTOM: u8 = 1 << 3;
const ALL_EDGES: u8 = EDGE_LEFT | EDGE_TOP | EDGE_RIGHT | EDGE_BOTTOM;

#[derive(Clone, Debug)]
struct TrackedItem {
    global_key: Option<Rc<str>>,
    handlers: VisibilityHandlers,
    focused: bool,
    seen_edges: u8,
    full_impression_sent: bool,
    /// Pass in which the item was last found visible.
    seen_in_pass: u64,
}

/// Remembers the visibility state of outputs between passes.
#[derive(Debug, Default)]
pub(crate) struct VisibilityTracker {
    items: HashMap<u64, TrackedItem>,
    pass: u64,
}

impl VisibilityTracker {
    /// Number of outputs currently tracked as visible.
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Evaluates `outputs` against `visible`, appending transitions to `events`.
    pub(crate) fn process(
        &mut self,
        outputs: &[VisibilityOutput],
        visible: Rect,
        events: &mut Vec<VisibilityEvent>,
    ) {
        self.pass += 1;
        let pass = self.pass;

        for output in outputs {
            let id = output.id;
            let bounds = output.bounds;
            let intersection = bounds.intersect(visible);
            let is_visible = intersects(bounds, visible) && in_visible_range(output, intersection);

            if let Some(item) = self.items.get(&id)
                && item.global_key != output.global_key
            {
                if let Some(item) = self.items.remove(&id) {
                    end_tracking(id, &item, events);
                }
            }

            if !is_visible {
                if let Some(item) = self.items.remove(&id) {
                    end_tracking(id, &item, events);
                }
                continue;
            }

            let item = self.items.entry(id).or_insert_with(|| {
                if output.handlers.visible {
                    events.push(VisibilityEvent {
                        id,
                        kind: VisibilityEventKind::Visible,
                    });
                }
                TrackedItem {
                    global_key: output.global_key.clone(),
                    handlers: output.handlers,
                    focused: false,
                    seen_edges: 0,
                    full_impression_sent: false,
                    seen_in_pass: pass,
                }
            });
            item.seen_in_pass = pass;
            item.handlers = output.handlers;

            if output.handlers.focused || output.handlers.unfocused {
                let focused = in_focused_range(bounds, intersection, visible);
                if focused && !item.focused {
                    item.focused = true;
                    if output.handlers.focused {
                        events.push(VisibilityEvent {
                            id,
                            kind: VisibilityEventKind::Focused,
                        });
                    }
                } else if !focused && item.focused {
                    item.focused = false;
                    if output.handlers.unfocused {
                        events.push(VisibilityEvent {
                            id,
                            kind: VisibilityEventKind::Unfocused,
                        });
                    }
                }
            }

            if output.handlers.full_impression && !item.full_impression_sent {
                item.seen_edges |= visible_edges(bounds, intersection);
                if item.seen_edges == ALL_EDGES {
                    item.full_impression_sent = true;
                    events.push(VisibilityEvent {
                        id,
                        kind: VisibilityEventKind::FullImpression,
                    });
                }
            }
        }

        // Outputs that vanished from the layout.
        let mut gone: Vec<u64> = self
            .items
            .iter()
            .filter(|(_, item)| item.seen_in_pass != pass)
            .map(|(&id, _)| id)
            .collect();
        gone.sort_unstable();
        for id in gone {
            if let Some(item) = self.items.remove(&id) {
                end_tracking(id, &item, events);
            }
        }
    }

    /// Drops every tracked output, reporting it invisible and unfocused.
    pub(crate) fn clear(&mut self, events: &mut Vec<VisibilityEvent>) {
        let mut ids: Vec<u64> = self.items.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(item) = self.items.remove(&id) {
                end_tracking(id, &item, events);
            }
        }
    }
}

fn end_tracking(id: u64, item: &TrackedItem, events: &mut Vec<VisibilityEvent>) {
    if item.handlers.invisible {
        events.push(VisibilityEvent {
            id,
            kind: VisibilityEventKind::Invisible,
        });
    }
    if item.focused && item.handlers.unfocused {
        events.push(VisibilityEvent {
            id,
            kind: VisibilityEventKind::Unfocused,
        });
    }
}

fn in_visible_range(output: &VisibilityOutput, intersection: Rect) -> bool {
    let height_ratio = output.visible_height_ratio;
    let width_ratio = output.visible_width_ratio;
    if height_ratio == 0.0 && width_ratio == 0.0 {
        return true;
    }
    let bounds = output.bounds;
    intersection.height() >= height_ratio * bounds.height()
        && intersection.width() >= width_ratio * bounds.width()
}

fn in_focused_range(bounds: Rect, intersection: Rect, visible: Rect) -> bool {
    let half_viewport = visible.area() / 2.0;
    if bounds.area() >= half_viewport {
        intersection.area() >= half_viewport
    } else {
        bounds == intersection
    }
}

fn visible_edges(bounds: Rect, intersection: Rect) -> u8 {
    let mut edges = 0;
    if bounds.x0 == intersection.x0 {
        edges |= EDGE_LEFT;
    }
    if bounds.y0 == intersection.y0 {
        edges |= EDGE_TOP;
    }
    if bounds.x1 == intersection.x1 {
        edges |= EDGE_RIGHT;
    }
    if bounds.y1 == intersection.y1 {
        edges |= EDGE_BOTTOM;
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn kinds(events: &[VisibilityEvent]) -> Vec<VisibilityEventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    fn row(id: u64, y: f64) -> VisibilityOutput {
        VisibilityOutput::new(
            id,
            Rect::new(0.0, y, 100.0, y + 100.0),
            VisibilityHandlers::ALL,
        )
    }

    #[test]
    fn enters_and_leaves() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let outputs = vec![row(1, 0.0)];

        tracker.process(&outputs, Rect::new(0.0, 0.0, 100.0, 400.0), &mut events);
        assert_eq!(
            kinds(&events),
            vec![
                VisibilityEventKind::Visible,
                VisibilityEventKind::Focused,
                VisibilityEventKind::FullImpression,
            ]
        );

        events.clear();
        tracker.process(&outputs, Rect::new(0.0, 100.0, 100.0, 500.0), &mut events);
        assert_eq!(
            kinds(&events),
            vec![VisibilityEventKind::Invisible, VisibilityEventKind::Unfocused]
        );
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn repeated_pass_is_quiet() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let outputs = vec![row(1, 0.0)];
        let visible = Rect::new(0.0, 0.0, 100.0, 400.0);
        tracker.process(&outputs, visible, &mut events);
        events.clear();
        tracker.process(&outputs, visible, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn ratio_gates_visibility() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let mut output = row(1, 0.0);
        output.visible_height_ratio = 0.5;
        let outputs = vec![output];

        // 40% of the height is visible.
        tracker.process(&outputs, Rect::new(0.0, 60.0, 100.0, 400.0), &mut events);
        assert!(events.is_empty());

        tracker.process(&outputs, Rect::new(0.0, 50.0, 100.0, 400.0), &mut events);
        assert_eq!(events[0].kind, VisibilityEventKind::Visible);
    }

    #[test]
    fn full_impression_accumulates_edges() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let outputs = vec![VisibilityOutput::new(
            1,
            Rect::new(0.0, 0.0, 100.0, 300.0),
            VisibilityHandlers {
                full_impression: true,
                ..VisibilityHandlers::default()
            },
        )];

        // Top half, then bottom half.
        tracker.process(&outputs, Rect::new(0.0, 0.0, 100.0, 200.0), &mut events);
        assert!(events.is_empty());
        tracker.process(&outputs, Rect::new(0.0, 100.0, 100.0, 300.0), &mut events);
        assert_eq!(kinds(&events), vec![VisibilityEventKind::FullImpression]);

        events.clear();
        tracker.process(&outputs, Rect::new(0.0, 0.0, 100.0, 300.0), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn large_item_focus_uses_half_viewport() {
        let visible = Rect::new(0.0, 0.0, 100.0, 100.0);
        let big = Rect::new(0.0, 0.0, 100.0, 300.0);
        assert!(in_focused_range(big, big.intersect(visible), visible));
        let shifted = Rect::new(0.0, 60.0, 100.0, 360.0);
        assert!(!in_focused_range(shifted, shifted.intersect(visible), visible));
        let small = Rect::new(0.0, 90.0, 10.0, 110.0);
        assert!(!in_focused_range(small, small.intersect(visible), visible));
    }

    #[test]
    fn global_key_change_reissues_events() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let visible = Rect::new(0.0, 0.0, 100.0, 400.0);
        let mut output = VisibilityOutput::new(
            1,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            VisibilityHandlers {
                visible: true,
                invisible: true,
                ..VisibilityHandlers::default()
            },
        );
        output.global_key = Some(Rc::from("a"));
        tracker.process(&[output.clone()], visible, &mut events);
        events.clear();

        output.global_key = Some(Rc::from("b"));
        tracker.process(&[output], visible, &mut events);
        assert_eq!(
            kinds(&events),
            vec![VisibilityEventKind::Invisible, VisibilityEventKind::Visible]
        );
    }

    #[test]
    fn removed_outputs_and_clear_end_tracking() {
        let mut tracker = VisibilityTracker::default();
        let mut events = Vec::new();
        let visible = Rect::new(0.0, 0.0, 100.0, 400.0);
        tracker.process(&[row(1, 0.0), row(2, 100.0)], visible, &mut events);
        events.clear();

        tracker.process(&[row(2, 100.0)], visible, &mut events);
        assert_eq!(events[0], VisibilityEvent {
            id: 1,
            kind: VisibilityEventKind::Invisible
        });

        events.clear();
        tracker.clear(&mut events);
        assert_eq!(tracker.len(), 0);
        assert!(events.iter().all(|e| e.id == 2));
    }
}
