// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition coordination: animation driver contract, animation locks, and
//! disappearing-item bookkeeping.
//!
//! The engine does not interpolate anything itself. It asks a
//! [`TransitionDriver`] to set up transitions between two layouts, records
//! which transition keys the driver reports as animating, and keeps those
//! items (plus their ancestors and descendants) mounted through
//! [`AnimationLocks`] while they animate. Items whose key disappears from the
//! new layout are detached from normal diffing into a disappearing group
//! until the driver reports their exit animation complete.
//!
//! Per key the lifecycle is `Idle → Animating → (Completed | Superseded)`.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::error::MountError;
use crate::id::{OutputId, TransitionKey};
use crate::layout::LayoutResult;
use crate::registry::MountedItem;

// ---------------------------------------------------------------------------
// Transition descriptions
// ---------------------------------------------------------------------------

/// Property a transition animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Width.
    Width,
    /// Height.
    Height,
    /// Opacity.
    Alpha,
    /// Uniform scale.
    Scale,
    /// Rotation.
    Rotation,
}

/// Which items a transition applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionTarget {
    /// The item carrying this key.
    Key(TransitionKey),
    /// Every keyed item.
    All,
}

/// A transition request. Opaque to the engine, interpreted by the driver.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Items animated by this transition.
    pub target: TransitionTarget,
    /// Animated property.
    pub property: AnimatedProperty,
    /// Duration in milliseconds.
    pub duration_ms: u32,
}

impl Transition {
    /// A transition for a single key.
    #[must_use]
    pub fn for_key(key: impl Into<TransitionKey>, property: AnimatedProperty) -> Self {
        Self {
            target: TransitionTarget::Key(key.into()),
            property,
            duration_ms: 300,
        }
    }

    /// A transition for every keyed item.
    #[must_use]
    pub fn all(property: AnimatedProperty) -> Self {
        Self {
            target: TransitionTarget::All,
            property,
            duration_ms: 300,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

// ---------------------------------------------------------------------------
// TransitionDriver
// ---------------------------------------------------------------------------

/// The animation subsystem, as seen by the mount engine.
///
/// `C` is the backend's content handle type. Completion is reported back
/// through [`MountState::on_animation_complete`], which queues the key; the
/// engine drains the queue between frames.
///
/// [`MountState::on_animation_complete`]: crate::mount::MountState::on_animation_complete
pub trait TransitionDriver<C> {
    /// Compares `previous` against `next` and prepares animations for the
    /// keys that change, using `explicit` transitions in addition to those
    /// the driver derives itself.
    fn setup_transitions(
        &mut self,
        previous: Option<&LayoutResult>,
        next: &LayoutResult,
        explicit: &[Transition],
    );

    /// Whether `key` is animating after the last setup.
    fn is_key_animating(&self, key: &TransitionKey) -> bool;

    /// Whether `key` is animating out of the tree.
    fn is_key_disappearing(&self, key: &TransitionKey) -> bool;

    /// Tells the driver which content currently renders `key`.
    fn set_mount_content(&mut self, key: &TransitionKey, content: Option<&C>);

    /// Starts the animations prepared by the last setup.
    fn run_transitions(&mut self);

    /// Drops all animation state.
    fn reset(&mut self);
}

/// A [`TransitionDriver`] that never animates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransitions;

impl<C> TransitionDriver<C> for NoTransitions {
    fn setup_transitions(
        &mut self,
        _previous: Option<&LayoutResult>,
        _next: &LayoutResult,
        _explicit: &[Transition],
    ) {
    }

    fn is_key_animating(&self, _key: &TransitionKey) -> bool {
        false
    }

    fn is_key_disappearing(&self, _key: &TransitionKey) -> bool {
        false
    }

    fn set_mount_content(&mut self, _key: &TransitionKey, _content: Option<&C>) {}

    fn run_transitions(&mut self) {}

    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// AnimationLocks
// ---------------------------------------------------------------------------

/// Per-position lock counters aligned with one layout.
///
/// Locking a position increments the counter of its whole descendant range
/// and of every ancestor host up to (excluding) the root. A locked position
/// is never unmounted because it left the viewport.
#[derive(Clone, Debug, Default)]
pub struct AnimationLocks {
    counts: Vec<u32>,
}

impl AnimationLocks {
    /// Creates unlocked counters for a layout of `len` outputs.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            counts: alloc::vec![0; len],
        }
    }

    /// Whether the output at `index` is locked.
    #[inline]
    #[must_use]
    pub fn is_locked(&self, index: usize) -> bool {
        self.counts.get(index).is_some_and(|&c| c > 0)
    }

    /// Lock counter at `index`.
    #[inline]
    #[must_use]
    pub fn count(&self, index: usize) -> u32 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// First position whose counter is non-zero.
    #[must_use]
    pub fn first_locked(&self) -> Option<usize> {
        self.counts.iter().position(|&c| c > 0)
    }

    /// Locks the subtree at `index` and its ancestors.
    pub fn lock(&mut self, layout: &LayoutResult, index: usize) {
        let last = layout.find_last_descendant(index);
        for count in &mut self.counts[index..=last] {
            *count += 1;
        }
        for ancestor in layout.ancestors(index) {
            self.counts[ancestor] += 1;
        }
    }

    /// Reverses one [`lock`](Self::lock) of `index`.
    ///
    /// Fails without modifying anything if any affected counter is already
    /// zero.
    pub fn unlock(&mut self, layout: &LayoutResult, index: usize) -> Result<(), MountError> {
        let last = layout.find_last_descendant(index);
        if let Some(bad) = (index..=last)
            .chain(layout.ancestors(index))
            .find(|&i| self.counts[i] == 0)
        {
            return Err(MountError::LockUnderflow(bad));
        }
        for count in &mut self.counts[index..=last] {
            *count -= 1;
        }
        for ancestor in layout.ancestors(index) {
            self.counts[ancestor] -= 1;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Disappearing items
// ---------------------------------------------------------------------------

/// A subtree detached from normal diffing while its exit animation plays.
///
/// Items are kept in mount order, so every host precedes its children and a
/// subtree is a contiguous run.
#[derive(Debug)]
pub(crate) struct DisappearingGroup<C> {
    /// Host the group's first item is attached to.
    pub(crate) host: OutputId,
    pub(crate) items: Vec<(OutputId, MountedItem<C>)>,
}

impl<C> DisappearingGroup<C> {
    /// Splits off the subtree rooted at `id`, returning it in mount order.
    pub(crate) fn split_subtree(&mut self, id: OutputId) -> Vec<(OutputId, MountedItem<C>)> {
        let Some(start) = self.items.iter().position(|(i, _)| *i == id) else {
            return Vec::new();
        };
        let mut members: HashSet<OutputId> = HashSet::new();
        members.insert(id);
        let mut end = start + 1;
        while end < self.items.len() && members.contains(&self.items[end].1.host) {
            members.insert(self.items[end].0);
            end += 1;
        }
        self.items.drain(start..end).collect()
    }
}

/// Mutable transition state carried between mount passes.
#[derive(Debug)]
pub(crate) struct Coordinator<C> {
    /// Keys the driver reported as animating in place.
    pub(crate) animating: HashSet<TransitionKey>,
    /// Disappearing subtrees by the key of their top item.
    pub(crate) disappearing: HashMap<TransitionKey, DisappearingGroup<C>>,
    /// Keys of disappearing items nested in another group, mapped to that group.
    pub(crate) nested: HashMap<TransitionKey, TransitionKey>,
    /// Keys whose animation state was dropped; a late completion is ignored.
    pub(crate) retired: HashSet<TransitionKey>,
    pub(crate) locks: Option<AnimationLocks>,
    pub(crate) completions: VecDeque<TransitionKey>,
    /// Whether the current pass prepared transitions to run.
    pub(crate) prepared: bool,
}

impl<C> Default for Coordinator<C> {
    fn default() -> Self {
        Self {
            animating: HashSet::new(),
            disappearing: HashMap::new(),
            nested: HashMap::new(),
            retired: HashSet::new(),
            locks: None,
            completions: VecDeque::new(),
            prepared: false,
        }
    }
}

impl<C> Coordinator<C> {
    pub(crate) fn is_locked(&self, index: usize) -> bool {
        self.locks.as_ref().is_some_and(|l| l.is_locked(index))
    }

    /// Whether `key` is registered as disappearing, at top level or nested.
    pub(crate) fn is_disappearing(&self, key: &TransitionKey) -> bool {
        self.disappearing.contains_key(key) || self.nested.contains_key(key)
    }

    /// Rebuilds the lock counters for `layout` from the animating keys.
    pub(crate) fn rebuild_locks(&mut self, layout: &LayoutResult) {
        self.locks = None;
        if self.animating.is_empty() {
            return;
        }
        let mut locks = AnimationLocks::new(layout.len());
        for key in &self.animating {
            if let Some(index) = layout.position_for_key(key) {
                locks.lock(layout, index);
            }
        }
        self.locks = Some(locks);
    }

    /// Moves every animating key to the retired set and drops the locks.
    pub(crate) fn retire_animating(&mut self) {
        self.retired.clear();
        self.retired.extend(self.animating.drain());
        self.retired.extend(self.completions.drain(..));
        self.locks = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TreeId;
    use crate::layout::RenderOutput;
    use crate::testing::{host, view};
    use alloc::vec;
    use kurbo::Rect;

    fn layout() -> LayoutResult {
        // 0 root, 1 host, 2 child of 1, 3 child of 1, 4 sibling of 1.
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        LayoutResult::new(
            TreeId(1),
            vec![
                RenderOutput::root(r, host("root")),
                RenderOutput::new(OutputId(1), OutputId::ROOT, r, host("h")),
                RenderOutput::new(OutputId(2), OutputId(1), r, view("a")),
                RenderOutput::new(OutputId(3), OutputId(1), r, view("b")),
                RenderOutput::new(OutputId(4), OutputId::ROOT, r, view("c")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lock_covers_descendants_and_ancestors() {
        let layout = layout();
        let mut locks = AnimationLocks::new(layout.len());
        locks.lock(&layout, 1);
        assert_eq!(
            (0..5).map(|i| locks.count(i)).collect::<Vec<_>>(),
            vec![0, 1, 1, 1, 0]
        );
        locks.lock(&layout, 3);
        assert_eq!(
            (0..5).map(|i| locks.count(i)).collect::<Vec<_>>(),
            vec![0, 2, 1, 2, 0]
        );
        assert!(locks.is_locked(2));
        assert!(!locks.is_locked(4));
    }

    #[test]
    fn unlock_restores_balance() {
        let layout = layout();
        let mut locks = AnimationLocks::new(layout.len());
        locks.lock(&layout, 1);
        locks.lock(&layout, 3);
        locks.unlock(&layout, 3).unwrap();
        locks.unlock(&layout, 1).unwrap();
        assert_eq!(locks.first_locked(), None);
    }

    #[test]
    fn unlock_below_zero_fails_without_side_effects() {
        let layout = layout();
        let mut locks = AnimationLocks::new(layout.len());
        locks.lock(&layout, 2);
        assert_eq!(locks.unlock(&layout, 1), Err(MountError::LockUnderflow(3)));
        assert_eq!(locks.count(2), 1);
        assert_eq!(locks.count(1), 1);
    }

    #[test]
    fn rebuild_ignores_keys_missing_from_layout() {
        let layout = layout();
        let mut coordinator = Coordinator::<()>::default();
        coordinator.rebuild_locks(&layout);
        assert!(coordinator.locks.is_none());

        coordinator.animating.insert(TransitionKey::new("gone"));
        coordinator.rebuild_locks(&layout);
        assert_eq!(coordinator.locks.as_ref().unwrap().first_locked(), None);
    }

    #[test]
    fn retiring_clears_pending_completions() {
        let mut coordinator = Coordinator::<()>::default();
        coordinator.animating.insert(TransitionKey::new("a"));
        coordinator.completions.push_back(TransitionKey::new("b"));
        coordinator.retire_animating();
        assert!(coordinator.animating.is_empty());
        assert!(coordinator.completions.is_empty());
        assert!(coordinator.retired.contains(&TransitionKey::new("a")));
        assert!(coordinator.retired.contains(&TransitionKey::new("b")));
    }
}
