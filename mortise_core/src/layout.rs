// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout result consumed by the mount engine.
//!
//! A [`LayoutResult`] is an ordered arena of [`RenderOutput`]s. Order encodes
//! host nesting: position 0 is the root container and every output appears
//! after its host, with a host's descendants contiguous after it. Side
//! indices (id to position, transition key to position, and the outputs
//! sorted by top and bottom edge) are built once when the layout is
//! constructed.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;
use thiserror::Error;

use crate::component::{Attributes, ComponentRef, ContentKind, UpdateState};
use crate::id::{OutputId, TransitionKey, TreeId};
use crate::transition::Transition;

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Strict rectangle intersection: rectangles that only touch along an edge
/// do not intersect.
#[inline]
#[must_use]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Returns whether a rectangle has no area.
#[inline]
#[must_use]
pub fn is_empty(r: Rect) -> bool {
    r.x1 <= r.x0 || r.y1 <= r.y0
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One positioned, identified unit produced by layout.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Stable identity.
    pub id: OutputId,
    /// Identity of the output this one is mounted into.
    pub host: OutputId,
    /// Bounds in root coordinates.
    pub bounds: Rect,
    /// What to mount.
    pub component: ComponentRef,
    /// Identity used to correlate this output across passes for animation.
    pub transition_key: Option<TransitionKey>,
    /// Layout's own change classification.
    pub update_state: UpdateState,
    /// Visual attributes for view-like content.
    pub attributes: Attributes,
}

impl RenderOutput {
    /// Creates an output with no transition key, unspecified update state
    /// and no attributes.
    #[must_use]
    pub fn new(id: OutputId, host: OutputId, bounds: Rect, component: ComponentRef) -> Self {
        Self {
            id,
            host,
            bounds,
            component,
            transition_key: None,
            update_state: UpdateState::Unspecified,
            attributes: Attributes::default(),
        }
    }

    /// Creates the root output covering `bounds`.
    #[must_use]
    pub fn root(bounds: Rect, component: ComponentRef) -> Self {
        Self::new(OutputId::ROOT, OutputId::ROOT, bounds, component)
    }

    /// Sets the transition key.
    #[must_use]
    pub fn with_transition_key(mut self, key: impl Into<TransitionKey>) -> Self {
        self.transition_key = Some(key.into());
        self
    }

    /// Sets the update state.
    #[must_use]
    pub fn with_update_state(mut self, state: UpdateState) -> Self {
        self.update_state = state;
        self
    }

    /// Sets the visual attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Which visibility events an output wants to receive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisibilityHandlers {
    /// Entered the visible range.
    pub visible: bool,
    /// Left the visible range.
    pub invisible: bool,
    /// Entered the focused range.
    pub focused: bool,
    /// Left the focused range.
    pub unfocused: bool,
    /// Every edge has been seen at least once.
    pub full_impression: bool,
}

impl VisibilityHandlers {
    /// Handlers for every event.
    pub const ALL: Self = Self {
        visible: true,
        invisible: true,
        focused: true,
        unfocused: true,
        full_impression: true,
    };
}

/// An output tracked for visibility events.
#[derive(Clone, Debug)]
pub struct VisibilityOutput {
    /// Identity, stable across passes.
    pub id: u64,
    /// Bounds in root coordinates.
    pub bounds: Rect,
    /// Key of the component that owns the handlers; a change re-issues events.
    pub global_key: Option<Rc<str>>,
    /// Fraction of the height that must be visible to count as visible.
    pub visible_height_ratio: f64,
    /// Fraction of the width that must be visible to count as visible.
    pub visible_width_ratio: f64,
    /// Which events to report.
    pub handlers: VisibilityHandlers,
}

impl VisibilityOutput {
    /// Creates a visibility output with no ratio requirement.
    #[must_use]
    pub fn new(id: u64, bounds: Rect, handlers: VisibilityHandlers) -> Self {
        Self {
            id,
            bounds,
            global_key: None,
            visible_height_ratio: 0.0,
            visible_width_ratio: 0.0,
            handlers,
        }
    }
}

/// Maps a test key to mounted content, for end-to-end test introspection.
#[derive(Clone, Debug)]
pub struct TestOutput {
    /// Key the test looks up.
    pub test_key: Rc<str>,
    /// Host the tested content lives in, if any.
    pub host: Option<OutputId>,
    /// Output whose content is tested, if it is mounted separately.
    pub output: Option<OutputId>,
    /// Bounds in root coordinates.
    pub bounds: Rect,
}

// ---------------------------------------------------------------------------
// LayoutError
// ---------------------------------------------------------------------------

/// Reasons a sequence of outputs cannot be used as a layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The first output is not the root.
    #[error("first output must be the root, found {found:?}")]
    RootNotFirst {
        /// Id found at position 0.
        found: OutputId,
    },
    /// The same id appears twice.
    #[error("output id {0:?} appears more than once")]
    DuplicateId(OutputId),
    /// An output's host does not appear before it.
    #[error("output {id:?} references host {host:?} which does not precede it")]
    HostOutOfOrder {
        /// The child output.
        id: OutputId,
        /// Its host.
        host: OutputId,
    },
    /// An output's host does not mount a container.
    #[error("output {id:?} is hosted by {host:?} which is not a container")]
    HostNotContainer {
        /// The child output.
        id: OutputId,
        /// Its host.
        host: OutputId,
    },
}

// ---------------------------------------------------------------------------
// LayoutResult
// ---------------------------------------------------------------------------

/// An immutable, validated layout ready to be mounted.
#[derive(Debug)]
pub struct LayoutResult {
    tree_id: TreeId,
    outputs: Vec<RenderOutput>,

    // -- Side indices --
    positions: HashMap<OutputId, usize>,
    tops: Vec<usize>,
    bottoms: Vec<usize>,
    keys: HashMap<TransitionKey, usize>,

    // -- Transitions --
    has_transition_context: bool,
    explicit_transitions: Vec<Transition>,

    // -- Auxiliary outputs --
    visibility_outputs: Vec<VisibilityOutput>,
    test_outputs: Vec<TestOutput>,
}

impl LayoutResult {
    /// Validates `outputs` and builds the side indices.
    ///
    /// An empty sequence is a valid layout that mounts nothing.
    pub fn new(tree_id: TreeId, outputs: Vec<RenderOutput>) -> Result<Self, LayoutError> {
        let mut positions = HashMap::with_capacity(outputs.len());
        let mut keys = HashMap::new();

        for (index, output) in outputs.iter().enumerate() {
            if index == 0 && !output.id.is_root() {
                return Err(LayoutError::RootNotFirst { found: output.id });
            }
            if positions.insert(output.id, index).is_some() {
                return Err(LayoutError::DuplicateId(output.id));
            }
            if index > 0 {
                let host_pos = match positions.get(&output.host) {
                    Some(&p) if p < index => p,
                    _ => {
                        return Err(LayoutError::HostOutOfOrder {
                            id: output.id,
                            host: output.host,
                        });
                    }
                };
                if outputs[host_pos].component.kind() != ContentKind::HostContainer {
                    return Err(LayoutError::HostNotContainer {
                        id: output.id,
                        host: output.host,
                    });
                }
            }
            if let Some(key) = &output.transition_key {
                keys.insert(key.clone(), index);
            }
        }

        let mut tops: Vec<usize> = (0..outputs.len()).collect();
        tops.sort_by(|&a, &b| {
            outputs[a]
                .bounds
                .y0
                .total_cmp(&outputs[b].bounds.y0)
                .then(a.cmp(&b))
        });
        let mut bottoms: Vec<usize> = (0..outputs.len()).collect();
        bottoms.sort_by(|&a, &b| {
            outputs[a]
                .bounds
                .y1
                .total_cmp(&outputs[b].bounds.y1)
                .then(b.cmp(&a))
        });

        Ok(Self {
            tree_id,
            outputs,
            positions,
            tops,
            bottoms,
            keys,
            has_transition_context: false,
            explicit_transitions: Vec::new(),
            visibility_outputs: Vec::new(),
            test_outputs: Vec::new(),
        })
    }

    /// Marks whether the tree declares transitions.
    #[must_use]
    pub fn with_transition_context(mut self, has_transitions: bool) -> Self {
        self.has_transition_context = has_transitions;
        self
    }

    /// Adds transitions declared for this layout.
    #[must_use]
    pub fn with_explicit_transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.explicit_transitions = transitions;
        self
    }

    /// Adds outputs tracked for visibility events.
    #[must_use]
    pub fn with_visibility_outputs(mut self, outputs: Vec<VisibilityOutput>) -> Self {
        self.visibility_outputs = outputs;
        self
    }

    /// Adds outputs for test introspection.
    #[must_use]
    pub fn with_test_outputs(mut self, outputs: Vec<TestOutput>) -> Self {
        self.test_outputs = outputs;
        self
    }

    // -- Accessors --

    /// Identity of the tree this layout belongs to.
    #[inline]
    #[must_use]
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// Number of outputs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns whether the layout has no outputs.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// All outputs, in mount order.
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[RenderOutput] {
        &self.outputs
    }

    /// The output at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    #[must_use]
    pub fn output(&self, index: usize) -> &RenderOutput {
        &self.outputs[index]
    }

    /// Position of the output with `id`.
    #[inline]
    #[must_use]
    pub fn position_for_id(&self, id: OutputId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Position of the output carrying `key`.
    #[inline]
    #[must_use]
    pub fn position_for_key(&self, key: &TransitionKey) -> Option<usize> {
        self.keys.get(key).copied()
    }

    /// Every transition key present in this layout.
    pub fn transition_keys(&self) -> impl Iterator<Item = &TransitionKey> + '_ {
        self.keys.keys()
    }

    /// Output positions sorted by top edge.
    #[inline]
    #[must_use]
    pub fn tops(&self) -> &[usize] {
        &self.tops
    }

    /// Output positions sorted by bottom edge.
    #[inline]
    #[must_use]
    pub fn bottoms(&self) -> &[usize] {
        &self.bottoms
    }

    /// Whether the tree declares transitions.
    #[inline]
    #[must_use]
    pub fn has_transition_context(&self) -> bool {
        self.has_transition_context
    }

    /// Transitions declared for this layout.
    #[inline]
    #[must_use]
    pub fn explicit_transitions(&self) -> &[Transition] {
        &self.explicit_transitions
    }

    /// Outputs tracked for visibility events.
    #[inline]
    #[must_use]
    pub fn visibility_outputs(&self) -> &[VisibilityOutput] {
        &self.visibility_outputs
    }

    /// Outputs for test introspection.
    #[inline]
    #[must_use]
    pub fn test_outputs(&self) -> &[TestOutput] {
        &self.test_outputs
    }

    // -- Tree queries --

    /// Returns the last position that belongs to the subtree rooted at `index`.
    ///
    /// Returns `index` itself for leaves. The root's subtree spans the whole
    /// layout.
    #[must_use]
    pub fn find_last_descendant(&self, index: usize) -> usize {
        let host_id = self.outputs[index].id;
        for i in index + 1..self.outputs.len() {
            let mut current = self.outputs[i].host;
            while current != host_id {
                if current.is_root() {
                    return i - 1;
                }
                match self.positions.get(&current) {
                    Some(&p) => current = self.outputs[p].host,
                    None => return i - 1,
                }
            }
        }
        self.outputs.len().saturating_sub(1)
    }

    /// Positions of every host above `index`, nearest first, excluding the root.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let mut host = self.outputs[index].host;
        core::iter::from_fn(move || {
            if host.is_root() {
                return None;
            }
            let pos = self.positions.get(&host).copied()?;
            host = self.outputs[pos].host;
            Some(pos)
        })
    }

    /// Bounds of the output at `index`, relative to its host.
    #[must_use]
    pub fn mount_bounds(&self, index: usize) -> Rect {
        let output = &self.outputs[index];
        let origin = self
            .position_for_id(output.host)
            .map_or(kurbo::Point::ZERO, |p| self.outputs[p].bounds.origin());
        output.bounds - origin.to_vec2()
    }

    /// Height of the root output, or zero for an empty layout.
    #[must_use]
    pub fn root_height(&self) -> f64 {
        self.outputs.first().map_or(0.0, |o| o.bounds.height())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{host, view};
    use alloc::vec;

    fn nested() -> LayoutResult {
        // root
        // ├── 1 (host)
        // │   ├── 2
        // │   └── 3 (host)
        // │       └── 4
        // └── 5
        LayoutResult::new(
            TreeId(1),
            vec![
                RenderOutput::root(Rect::new(0.0, 0.0, 100.0, 400.0), host("root")),
                RenderOutput::new(
                    OutputId(1),
                    OutputId::ROOT,
                    Rect::new(0.0, 0.0, 100.0, 200.0),
                    host("h1"),
                ),
                RenderOutput::new(
                    OutputId(2),
                    OutputId(1),
                    Rect::new(0.0, 0.0, 100.0, 50.0),
                    view("v2"),
                ),
                RenderOutput::new(
                    OutputId(3),
                    OutputId(1),
                    Rect::new(0.0, 50.0, 100.0, 200.0),
                    host("h3"),
                ),
                RenderOutput::new(
                    OutputId(4),
                    OutputId(3),
                    Rect::new(10.0, 60.0, 90.0, 100.0),
                    view("v4"),
                ),
                RenderOutput::new(
                    OutputId(5),
                    OutputId::ROOT,
                    Rect::new(0.0, 200.0, 100.0, 400.0),
                    view("v5"),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn strict_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(intersects(a, Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(!intersects(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!intersects(a, Rect::new(0.0, 10.0, 10.0, 20.0)));
        assert!(is_empty(Rect::ZERO));
        assert!(!is_empty(a));
    }

    #[test]
    fn positions_and_keys() {
        let layout = nested();
        assert_eq!(layout.len(), 6);
        assert_eq!(layout.position_for_id(OutputId(4)), Some(4));
        assert_eq!(layout.position_for_id(OutputId(9)), None);
        assert_eq!(layout.root_height(), 400.0);
    }

    #[test]
    fn last_descendant() {
        let layout = nested();
        assert_eq!(layout.find_last_descendant(0), 5);
        assert_eq!(layout.find_last_descendant(1), 4);
        assert_eq!(layout.find_last_descendant(2), 2);
        assert_eq!(layout.find_last_descendant(3), 4);
        assert_eq!(layout.find_last_descendant(5), 5);
    }

    #[test]
    fn ancestors_exclude_root() {
        let layout = nested();
        let ancestors: Vec<usize> = layout.ancestors(4).collect();
        assert_eq!(ancestors, vec![3, 1]);
        assert_eq!(layout.ancestors(5).count(), 0);
    }

    #[test]
    fn mount_bounds_are_host_relative() {
        let layout = nested();
        assert_eq!(layout.mount_bounds(4), Rect::new(10.0, 10.0, 90.0, 50.0));
        assert_eq!(layout.mount_bounds(5), Rect::new(0.0, 200.0, 100.0, 400.0));
    }

    #[test]
    fn edge_orders() {
        let layout = nested();
        // Tops: 0,1,2 share y0 = 0 (by position), then 3 (50), 4 (60), 5 (200).
        assert_eq!(layout.tops(), &[0, 1, 2, 3, 4, 5]);
        // Bottoms: 2 (50), 4 (100), then 3 and 1 share 200 (later position first), then 5 and 0.
        assert_eq!(layout.bottoms(), &[2, 4, 3, 1, 5, 0]);
    }

    #[test]
    fn rejects_root_not_first() {
        let err = LayoutResult::new(
            TreeId(1),
            vec![RenderOutput::new(
                OutputId(3),
                OutputId::ROOT,
                Rect::ZERO,
                view("v"),
            )],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::RootNotFirst {
                found: OutputId(3)
            }
        );
    }

    #[test]
    fn rejects_duplicates_and_misordered_hosts() {
        let root = RenderOutput::root(Rect::new(0.0, 0.0, 10.0, 10.0), host("root"));
        let dup = LayoutResult::new(
            TreeId(1),
            vec![
                root.clone(),
                RenderOutput::new(OutputId(1), OutputId::ROOT, Rect::ZERO, view("a")),
                RenderOutput::new(OutputId(1), OutputId::ROOT, Rect::ZERO, view("b")),
            ],
        )
        .unwrap_err();
        assert_eq!(dup, LayoutError::DuplicateId(OutputId(1)));

        let order = LayoutResult::new(
            TreeId(1),
            vec![
                root.clone(),
                RenderOutput::new(OutputId(2), OutputId(1), Rect::ZERO, view("a")),
                RenderOutput::new(OutputId(1), OutputId::ROOT, Rect::ZERO, host("h")),
            ],
        )
        .unwrap_err();
        assert_eq!(
            order,
            LayoutError::HostOutOfOrder {
                id: OutputId(2),
                host: OutputId(1)
            }
        );

        let not_host = LayoutResult::new(
            TreeId(1),
            vec![
                root,
                RenderOutput::new(OutputId(1), OutputId::ROOT, Rect::ZERO, view("a")),
                RenderOutput::new(OutputId(2), OutputId(1), Rect::ZERO, view("b")),
            ],
        )
        .unwrap_err();
        assert_eq!(
            not_host,
            LayoutError::HostNotContainer {
                id: OutputId(2),
                host: OutputId(1)
            }
        );
    }

    #[test]
    fn empty_layout_is_valid() {
        let layout = LayoutResult::new(TreeId::INVALID, Vec::new()).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.root_height(), 0.0);
    }
}
