// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mount engine.
//!
//! [`MountState`] owns the registry of mounted items, the content pool, and
//! the transition bookkeeping for one mount surface. Each call to
//! [`mount`](MountState::mount) brings the live tree in line with a
//! [`LayoutResult`]:
//!
//! ```text
//!  drain completions ─► update transitions ─► prepare (diff) ─► mount pass ─► run transitions
//!                           (dirty only)        (dirty only)     │
//!                                                                ├─ scroll fast path (clean, viewport)
//!                                                                └─ full pass
//! ```
//!
//! The pass is synchronous and single-threaded. Animation completions are
//! queued by [`on_animation_complete`](MountState::on_animation_complete) and
//! drained at the start of the next pass or by
//! [`process_animation_completions`](MountState::process_animation_completions).

mod animation;
mod executor;
mod incremental;
mod prepare;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::backend::MountBackend;
use crate::component::ContentKind;
use crate::config::MountConfig;
use crate::diff::PrepareMountStats;
use crate::error::MountError;
use crate::id::{OutputId, TransitionKey, TreeId};
use crate::layout::LayoutResult;
use crate::pool::ContentPool;
use crate::registry::Registry;
use crate::stats::MountStats;
use crate::trace::{CompletionEvent, ItemOp, PassBeginEvent, PassEndEvent, PrepareEvent, Tracer};
use crate::transition::{Coordinator, NoTransitions, TransitionDriver};
use crate::visibility::{VisibilityEvent, VisibilityTracker};

#[cfg(feature = "trace-rich")]
use crate::trace::ItemChange;

/// Result of a mount pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MountOutcome {
    /// Counters of the diff against the previous layout (zero on clean passes).
    pub prepare: PrepareMountStats,
    /// Counters of the pass itself, including completions drained first.
    pub stats: MountStats,
    /// Whether the scroll fast path handled the pass.
    pub scrolled: bool,
    /// Animation completions drained before the pass.
    pub completions: usize,
    /// Visibility transitions, when visibility processing was requested.
    pub visibility_events: Vec<VisibilityEvent>,
}

/// A test-key lookup result.
#[derive(Clone, Debug, PartialEq)]
pub struct TestItem {
    /// The key the layout attached.
    pub test_key: Rc<str>,
    /// Bounds in root coordinates.
    pub bounds: Rect,
    /// Host the tested content lives in.
    pub host: Option<OutputId>,
    /// Output whose content is tested, if it is mounted separately.
    pub output: Option<OutputId>,
}

impl TestItem {
    /// The mounted content of the tested output, if it is mounted.
    #[must_use]
    pub fn content<'a, C>(&self, registry: &'a Registry<C>) -> Option<&'a C> {
        self.output
            .and_then(|id| registry.item(id))
            .map(|item| item.content())
    }
}

/// Incrementally mounts layouts onto a backend.
///
/// `B` performs the mount decisions on a platform tree, `D` drives
/// transition animations.
pub struct MountState<B: MountBackend, D = NoTransitions> {
    backend: B,
    driver: D,
    config: MountConfig,

    // -- Live state --
    registry: Registry<B::Content>,
    pool: ContentPool<B::Content>,
    transitions: Coordinator<B::Content>,
    visibility: VisibilityTracker,
    test_items: Option<HashMap<Rc<str>, Vec<TestItem>>>,

    // -- Previous pass --
    last_layout: Option<Rc<LayoutResult>>,
    last_tree_id: TreeId,
    first_mount_of_tree: bool,
    dirty: bool,
    previous_viewport: Rect,
    tops_cursor: usize,
    bottoms_cursor: usize,

    // -- Current pass --
    stats: MountStats,
    pass_index: u64,
    #[cfg(feature = "trace-rich")]
    changes: Vec<ItemChange>,
}

impl<B: MountBackend, D> fmt::Debug for MountState<B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountState")
            .field("config", &self.config)
            .field("mounted", &self.registry.mounted_count())
            .field("last_tree_id", &self.last_tree_id)
            .field("dirty", &self.dirty)
            .field("previous_viewport", &self.previous_viewport)
            .field("pass_index", &self.pass_index)
            .finish_non_exhaustive()
    }
}

impl<B: MountBackend, D: TransitionDriver<B::Content>> MountState<B, D> {
    /// Creates a mount state for the externally owned `root` container.
    #[must_use]
    pub fn new(backend: B, driver: D, root: B::Content, config: MountConfig) -> Self {
        Self {
            backend,
            driver,
            config,
            registry: Registry::new(root, Rect::ZERO),
            pool: ContentPool::new(config.pool_capacity),
            transitions: Coordinator::default(),
            visibility: VisibilityTracker::default(),
            test_items: config.test_introspection.then(HashMap::new),
            last_layout: None,
            last_tree_id: TreeId::INVALID,
            first_mount_of_tree: true,
            dirty: true,
            previous_viewport: Rect::ZERO,
            tops_cursor: 0,
            bottoms_cursor: 0,
            stats: MountStats::default(),
            pass_index: 0,
            #[cfg(feature = "trace-rich")]
            changes: Vec::new(),
        }
    }

    // -- Accessors --

    /// The backend.
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The transition driver.
    #[inline]
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The transition driver, mutably.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The mounted-item registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry<B::Content> {
        &self.registry
    }

    /// The content pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &ContentPool<B::Content> {
        &self.pool
    }

    /// The configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Number of outputs of the last mounted layout.
    #[inline]
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.registry.output_ids.len()
    }

    /// Marks the state dirty: the next pass diffs and runs a full mount.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
        self.previous_viewport = Rect::ZERO;
    }

    /// Whether the next pass diffs against the previous layout.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Declares the next pass the first one for its tree, allowing it to set up
    /// transitions even though the tree id changed.
    pub fn set_first_mount_of_tree(&mut self) {
        self.first_mount_of_tree = true;
    }

    /// Whether the output at `index` of the last layout is animation-locked.
    #[inline]
    #[must_use]
    pub fn is_animation_locked(&self, index: usize) -> bool {
        self.transitions.is_locked(index)
    }

    /// Whether `key` is disappearing and still mounted.
    #[must_use]
    pub fn is_disappearing(&self, key: &TransitionKey) -> bool {
        self.transitions.is_disappearing(key)
    }

    // -- Mounting --

    /// Mounts `layout`, limited to `viewport` when given.
    pub fn mount(
        &mut self,
        layout: &Rc<LayoutResult>,
        viewport: Option<Rect>,
        process_visibility: bool,
    ) -> Result<MountOutcome, MountError> {
        self.mount_traced(layout, viewport, process_visibility, &mut Tracer::none())
    }

    /// Like [`mount`](Self::mount), reporting progress to `tracer`.
    pub fn mount_traced(
        &mut self,
        layout: &Rc<LayoutResult>,
        viewport: Option<Rect>,
        process_visibility: bool,
        tracer: &mut Tracer<'_>,
    ) -> Result<MountOutcome, MountError> {
        self.begin_pass();
        let completions = self.drain_completions(tracer)?;

        let tree_id = layout.tree_id();
        if tree_id != self.last_tree_id {
            self.last_layout = None;
        }
        let same_layout = self
            .last_layout
            .as_ref()
            .is_some_and(|last| Rc::ptr_eq(last, layout));
        let dirty = self.dirty || !same_layout;

        self.pass_index += 1;
        tracer.pass_begin(&PassBeginEvent {
            pass_index: self.pass_index,
            tree_id,
            output_count: u32::try_from(layout.len()).unwrap_or(u32::MAX),
            dirty,
            incremental: viewport.is_some(),
        });
        log::trace!(
            "mount pass {} for {:?}: {} outputs, dirty={dirty}",
            self.pass_index,
            tree_id,
            layout.len()
        );

        let mut prepare = PrepareMountStats::default();
        if dirty {
            self.update_transitions(layout)?;
            prepare = self.prepare(layout)?;
            tracer.prepare(&PrepareEvent {
                pass_index: self.pass_index,
                stats: prepare,
            });
        }
        let should_animate = self.transitions.prepared;

        let scrolled = match viewport {
            Some(viewport) if !dirty => self.scroll_mount(layout, viewport, process_visibility)?,
            _ => false,
        };
        if !scrolled {
            self.full_pass(layout, viewport, dirty, process_visibility)?;
            if let Some(viewport) = viewport {
                self.setup_cursors(layout, viewport);
            }
        }

        if should_animate {
            self.driver.run_transitions();
            self.transitions.prepared = false;
        }

        self.dirty = false;
        self.first_mount_of_tree = false;
        self.previous_viewport = viewport.unwrap_or(Rect::ZERO);
        self.last_tree_id = tree_id;
        self.last_layout = Some(Rc::clone(layout));

        let mut visibility_events = Vec::new();
        if process_visibility {
            let visible = viewport.unwrap_or_else(|| {
                layout.outputs().first().map_or(Rect::ZERO, |root| root.bounds)
            });
            self.visibility
                .process(layout.visibility_outputs(), visible, &mut visibility_events);
        }
        if self.test_items.is_some() {
            self.collect_test_items(layout);
        }

        self.end_pass(tracer, scrolled);
        Ok(MountOutcome {
            prepare,
            stats: self.stats,
            scrolled,
            completions,
            visibility_events,
        })
    }

    /// Unmounts every item except the root and marks the state dirty.
    ///
    /// Disappearing items are torn down immediately and in-flight animation
    /// state is dropped. Tracked visibility outputs are reported invisible.
    pub fn unmount_all(&mut self) -> Result<MountOutcome, MountError> {
        self.begin_pass();
        self.reset_animation_state();
        for index in (0..self.registry.output_ids.len()).rev() {
            self.unmount_item(index)?;
        }
        self.registry.output_ids.clear();
        self.previous_viewport = Rect::ZERO;
        self.tops_cursor = 0;
        self.bottoms_cursor = 0;
        self.dirty = true;

        let mut visibility_events = Vec::new();
        self.visibility.clear(&mut visibility_events);
        if let Some(items) = &mut self.test_items {
            items.clear();
        }
        log::debug!("unmounted all items, {} remain", self.registry.mounted_count());
        Ok(MountOutcome {
            stats: self.stats,
            visibility_events,
            ..MountOutcome::default()
        })
    }

    /// Unbinds every mounted item except the root.
    pub fn unbind_all(&mut self) {
        for id in &self.registry.output_ids {
            if id.is_root() {
                continue;
            }
            if let Some(item) = self.registry.items.get_mut(id)
                && item.bound
            {
                self.backend.unbind(&item.content, &*item.component);
                item.bound = false;
            }
        }
    }

    /// Rebinds every unbound item except the root.
    ///
    /// View-like content with a pending layout request gets its bounds
    /// reapplied.
    pub fn rebind_all(&mut self) {
        for id in &self.registry.output_ids {
            if id.is_root() {
                continue;
            }
            if let Some(item) = self.registry.items.get_mut(id)
                && !item.bound
            {
                self.backend.bind(&item.content, &*item.component);
                item.bound = true;
                if item.kind.is_view_like() && self.backend.needs_layout(&item.content) {
                    self.backend.apply_bounds(&item.content, item.bounds, true);
                }
            }
        }
    }

    // -- Animation completion --

    /// Queues the completion of the animation for `key`.
    ///
    /// Nothing is torn down until the queue is drained.
    pub fn on_animation_complete(&mut self, key: impl Into<TransitionKey>) {
        self.transitions.completions.push_back(key.into());
    }

    /// Drains queued animation completions, tearing down finished
    /// disappearing items and releasing animation locks.
    ///
    /// Returns the number of completions processed.
    pub fn process_animation_completions(&mut self) -> Result<usize, MountError> {
        self.process_animation_completions_traced(&mut Tracer::none())
    }

    /// Like [`process_animation_completions`](Self::process_animation_completions),
    /// reporting to `tracer`.
    pub fn process_animation_completions_traced(
        &mut self,
        tracer: &mut Tracer<'_>,
    ) -> Result<usize, MountError> {
        self.begin_pass();
        self.drain_completions(tracer)
    }

    // -- Test introspection --

    /// Items registered under `test_key` by the last pass.
    pub fn find_test_items(&self, test_key: &str) -> Result<&[TestItem], MountError> {
        let items = self
            .test_items
            .as_ref()
            .ok_or(MountError::TestItemsDisabled)?;
        Ok(items.get(test_key).map_or(&[][..], Vec::as_slice))
    }

    fn collect_test_items(&mut self, layout: &LayoutResult) {
        let Some(items) = &mut self.test_items else {
            return;
        };
        items.clear();
        for output in layout.test_outputs() {
            if output
                .host
                .is_some_and(|host| self.registry.item(host).is_none())
            {
                continue;
            }
            items
                .entry(Rc::clone(&output.test_key))
                .or_default()
                .push(TestItem {
                    test_key: Rc::clone(&output.test_key),
                    bounds: output.bounds,
                    host: output.host,
                    output: output.output,
                });
        }
    }

    // -- Pass bookkeeping --

    fn begin_pass(&mut self) {
        self.stats = MountStats::default();
        #[cfg(feature = "trace-rich")]
        self.changes.clear();
    }

    fn end_pass(&mut self, tracer: &mut Tracer<'_>, scrolled: bool) {
        #[cfg(feature = "trace-rich")]
        if !self.changes.is_empty() {
            tracer.item_changes(self.pass_index, &self.changes);
        }
        tracer.pass_end(&PassEndEvent {
            pass_index: self.pass_index,
            stats: self.stats,
            scrolled,
        });
    }

    fn drain_completions(&mut self, tracer: &mut Tracer<'_>) -> Result<usize, MountError> {
        if self.transitions.completions.is_empty() {
            return Ok(0);
        }
        let before = self.stats.torn_down;
        let mut completed = 0;
        while let Some(key) = self.transitions.completions.pop_front() {
            self.complete_animation(key)?;
            completed += 1;
        }
        tracer.completions(&CompletionEvent {
            pass_index: self.pass_index,
            completed: u32::try_from(completed).unwrap_or(u32::MAX),
            torn_down: self.stats.torn_down - before,
        });
        Ok(completed)
    }

    /// Records a per-item change for `trace-rich` sinks.
    #[inline]
    fn record_change(&mut self, id: OutputId, position: usize, kind: ContentKind, op: ItemOp) {
        #[cfg(feature = "trace-rich")]
        self.changes.push(ItemChange {
            id,
            position: u32::try_from(position).unwrap_or(u32::MAX),
            kind,
            op,
        });
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = (id, position, kind, op);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
