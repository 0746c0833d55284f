// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional diff of the previous id sequence against a new layout.
//!
//! The walk goes over the *previous* sequence, because only its positions
//! correspond to mounted registry entries. For each previous position the
//! output is classified as removed, re-hosted, moved, or unchanged. A host
//! change always forces an unmount: content is never re-parented across
//! hosts.
//!
//! Classification is lazy: the executor classifies position `i` only after
//! positions before it have been applied, because unmounting a host also
//! unmounts its children. [`reconcile`] runs the classification over the
//! whole sequence without applying anything, for inspection.

use alloc::vec::Vec;

use crate::id::OutputId;
use crate::layout::LayoutResult;
use crate::registry::Registry;

/// Why a previously mounted output must be unmounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnmountReason {
    /// The id no longer exists in the new layout.
    Removed,
    /// The id exists but is hosted by a different (or unmounted) host.
    HostChanged,
}

/// Decision for one position of the previous sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Unmount the item.
    Unmount(UnmountReason),
    /// The id survives but was not mounted (e.g. outside the viewport).
    NotMounted,
    /// Reposition within the same host.
    Move {
        /// Previous position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Same id, host, and position.
    Unchanged,
}

/// Counters produced by the diff pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareMountStats {
    /// Outputs unmounted or found already unmounted.
    pub unmounted: u32,
    /// Outputs moved within their host.
    pub moved: u32,
    /// Outputs left in place.
    pub unchanged: u32,
}

impl PrepareMountStats {
    /// Records one decision.
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Unmount(_) | Decision::NotMounted => self.unmounted += 1,
            Decision::Move { .. } => self.moved += 1,
            Decision::Unchanged => self.unchanged += 1,
        }
    }
}

/// Classifies the previous position `index` against `next`.
#[must_use]
pub fn classify<C>(registry: &Registry<C>, index: usize, next: &LayoutResult) -> Decision {
    let Some(id) = registry.id_at(index) else {
        return Decision::NotMounted;
    };
    let Some(new_pos) = next.position_for_id(id) else {
        return Decision::Unmount(UnmountReason::Removed);
    };
    let Some(item) = registry.item(id) else {
        return Decision::NotMounted;
    };
    let new_host = next.output(new_pos).host;
    if item.host() != new_host || !registry.is_host(new_host) {
        Decision::Unmount(UnmountReason::HostChanged)
    } else if new_pos != index {
        Decision::Move {
            from: index,
            to: new_pos,
        }
    } else {
        Decision::Unchanged
    }
}

/// Result of [`reconcile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Previous positions to unmount, with their ids.
    pub to_unmount: Vec<(usize, OutputId, UnmountReason)>,
    /// Ids to move, as `(id, from, to)`.
    pub to_move: Vec<(OutputId, usize, usize)>,
    /// Ids left in place.
    pub unchanged: Vec<OutputId>,
    /// Ids that survive but were not mounted.
    pub not_mounted: Vec<OutputId>,
}

impl Reconciliation {
    /// Summary counters matching what a mount pass would report, ignoring
    /// cascades from host unmounts.
    #[must_use]
    pub fn stats(&self) -> PrepareMountStats {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        PrepareMountStats {
            unmounted: count(self.to_unmount.len() + self.not_mounted.len()),
            moved: count(self.to_move.len()),
            unchanged: count(self.unchanged.len()),
        }
    }
}

/// Classifies every previous position against `next` without mutating
/// anything.
#[must_use]
pub fn reconcile<C>(registry: &Registry<C>, next: &LayoutResult) -> Reconciliation {
    let mut out = Reconciliation::default();
    for (index, &id) in registry.output_ids().iter().enumerate() {
        match classify(registry, index, next) {
            Decision::Unmount(reason) => out.to_unmount.push((index, id, reason)),
            Decision::NotMounted => out.not_mounted.push(id),
            Decision::Move { from, to } => out.to_move.push((id, from, to)),
            Decision::Unchanged => out.unchanged.push(id),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Attributes, ContentKind};
    use crate::id::TreeId;
    use crate::layout::RenderOutput;
    use crate::registry::{HostRecord, MountedItem};
    use crate::testing::{host, view};
    use alloc::vec;
    use kurbo::Rect;

    fn mounted(registry: &mut Registry<u32>, id: u64, host_id: u64, kind: ContentKind) {
        let id = OutputId(id);
        let host_id = OutputId(host_id);
        registry.items.insert(
            id,
            MountedItem {
                content: 0,
                component: view("v"),
                kind,
                host: host_id,
                bounds: Rect::ZERO,
                bound: true,
                attributes: Attributes::default(),
                transition_key: None,
            },
        );
        registry.attach(host_id, id);
        if kind.is_host() {
            registry.hosts.insert(id, HostRecord::default());
        }
    }

    fn layout(outputs: &[(u64, u64, bool)]) -> LayoutResult {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut list = vec![RenderOutput::root(r, host("root"))];
        for &(id, h, is_host) in outputs {
            let component = if is_host { host("h") } else { view("v") };
            list.push(RenderOutput::new(OutputId(id), OutputId(h), r, component));
        }
        LayoutResult::new(TreeId(1), list).unwrap()
    }

    #[test]
    fn rotation_is_moves_only() {
        let mut registry = Registry::new(0_u32, Rect::ZERO);
        registry.output_ids = vec![OutputId::ROOT, OutputId(1), OutputId(2), OutputId(3)];
        for id in 1..=3 {
            mounted(&mut registry, id, 0, ContentKind::ViewContent);
        }
        let next = layout(&[(3, 0, false), (1, 0, false), (2, 0, false)]);
        let result = reconcile(&registry, &next);
        assert!(result.to_unmount.is_empty());
        assert_eq!(
            result.to_move,
            vec![(OutputId(1), 1, 2), (OutputId(2), 2, 3), (OutputId(3), 3, 1)]
        );
        assert_eq!(result.unchanged, vec![OutputId::ROOT]);
        assert_eq!(
            result.stats(),
            PrepareMountStats {
                unmounted: 0,
                moved: 3,
                unchanged: 1
            }
        );
    }

    #[test]
    fn removed_and_rehosted_are_unmounted() {
        let mut registry = Registry::new(0_u32, Rect::ZERO);
        registry.output_ids = vec![OutputId::ROOT, OutputId(1), OutputId(2), OutputId(3)];
        mounted(&mut registry, 1, 0, ContentKind::HostContainer);
        mounted(&mut registry, 2, 1, ContentKind::ViewContent);
        mounted(&mut registry, 3, 0, ContentKind::ViewContent);
        // 2 moves from host 1 to the root, 3 disappears.
        let next = layout(&[(1, 0, true), (2, 0, false)]);
        assert_eq!(classify(&registry, 0, &next), Decision::Unchanged);
        assert_eq!(classify(&registry, 1, &next), Decision::Unchanged);
        assert_eq!(
            classify(&registry, 2, &next),
            Decision::Unmount(UnmountReason::HostChanged)
        );
        assert_eq!(
            classify(&registry, 3, &next),
            Decision::Unmount(UnmountReason::Removed)
        );
    }

    #[test]
    fn unmounted_survivors_are_counted_as_unmounted() {
        let mut registry = Registry::new(0_u32, Rect::ZERO);
        registry.output_ids = vec![OutputId::ROOT, OutputId(1)];
        let next = layout(&[(1, 0, false)]);
        assert_eq!(classify(&registry, 1, &next), Decision::NotMounted);
        let mut stats = PrepareMountStats::default();
        stats.record(classify(&registry, 1, &next));
        assert_eq!(stats.unmounted, 1);
    }

    #[test]
    fn host_remounted_elsewhere_forces_unmount() {
        let mut registry = Registry::new(0_u32, Rect::ZERO);
        registry.output_ids = vec![OutputId::ROOT, OutputId(2)];
        // Item 2 claims host 1, but host 1 is not mounted.
        mounted(&mut registry, 2, 1, ContentKind::ViewContent);
        let next = layout(&[(1, 0, true), (2, 1, false)]);
        assert_eq!(
            classify(&registry, 1, &next),
            Decision::Unmount(UnmountReason::HostChanged)
        );
    }
}
