// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full and viewport-incremental mount passes.
//!
//! The scroll fast path keeps two cursors between passes:
//!
//! - `tops_cursor`: the first position in top-edge order whose top is at or
//!   below the viewport's bottom edge. Outputs before it have been revealed
//!   from below.
//! - `bottoms_cursor`: the first position in bottom-edge order whose bottom
//!   is below the viewport's top edge. Outputs before it have scrolled off
//!   the top.
//!
//! A vertical scroll only moves each cursor across the outputs whose edges
//! it passed, mounting or unmounting exactly those.

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use super::MountState;
use crate::backend::MountBackend;
use crate::error::MountError;
use crate::id::OutputId;
use crate::layout::{LayoutResult, intersects, is_empty};
use crate::transition::TransitionDriver;

impl<B: MountBackend, D: TransitionDriver<B::Content>> MountState<B, D> {
    /// Visits every output, mounting, unmounting, or updating it.
    pub(super) fn full_pass(
        &mut self,
        layout: &LayoutResult,
        viewport: Option<Rect>,
        dirty: bool,
        process_visibility: bool,
    ) -> Result<(), MountError> {
        for index in 0..layout.len() {
            let output = layout.output(index);
            let id = output.id;
            let is_mounted = self.registry.items.contains_key(&id);
            let is_mountable = match viewport {
                None => true,
                Some(viewport) => {
                    id.is_root()
                        || self.registry.is_host_with_children(id)
                        || intersects(viewport, output.bounds)
                        || self.transitions.is_locked(index)
                }
            };

            match (is_mountable, is_mounted) {
                (true, false) => {
                    self.mount_output(index, layout)?;
                    if viewport.is_some()
                        && self.transitions.is_locked(index)
                        && self.registry.incremental.contains(&id)
                    {
                        // A locked item animates as a whole.
                        self.mount_item_fully(id, output.bounds, process_visibility);
                    }
                }
                (false, true) => self.unmount_item(index)?,
                (true, true) if id.is_root() => {
                    if let Some(root) = self.registry.items.get_mut(&id) {
                        root.bounds = output.bounds;
                    }
                }
                (true, true) => {
                    if dirty {
                        self.update_if_needed(index, layout)?;
                    }
                    if let Some(viewport) = viewport
                        && self.registry.incremental.contains(&id)
                    {
                        self.mount_item_incrementally(id, layout, viewport, process_visibility);
                    }
                }
                (false, false) => {}
            }
        }
        Ok(())
    }

    /// Mounts and unmounts only the outputs whose edges `viewport` crossed
    /// since the previous pass.
    ///
    /// Returns `false` without doing anything when the previous viewport is
    /// empty or the horizontal extent changed; the caller then runs a full
    /// pass.
    pub(super) fn scroll_mount(
        &mut self,
        layout: &LayoutResult,
        viewport: Rect,
        process_visibility: bool,
    ) -> Result<bool, MountError> {
        let previous = self.previous_viewport;
        if is_empty(previous) || viewport.x0 != previous.x0 || viewport.x1 != previous.x1 {
            return Ok(false);
        }

        let count = layout.len();
        let tops = layout.tops();
        let bottoms = layout.bottoms();
        let height = layout.root_height();

        if viewport.y0 > 0.0 || previous.y0 > 0.0 {
            // Items whose bottom scrolled above the new top.
            while self.bottoms_cursor < count
                && viewport.y0 >= layout.output(bottoms[self.bottoms_cursor]).bounds.y1
            {
                let index = bottoms[self.bottoms_cursor];
                if !self.transitions.is_locked(index) {
                    self.unmount_item(index)?;
                }
                self.bottoms_cursor += 1;
            }
            // Items whose bottom came back below the new top.
            while self.bottoms_cursor > 0
                && viewport.y0 < layout.output(bottoms[self.bottoms_cursor - 1]).bounds.y1
            {
                self.bottoms_cursor -= 1;
                let index = bottoms[self.bottoms_cursor];
                if !self.registry.items.contains_key(&layout.output(index).id) {
                    self.mount_output(index, layout)?;
                }
            }
        }

        if viewport.y1 < height || previous.y1 < height {
            // Items whose top came into view from below.
            while self.tops_cursor < count
                && viewport.y1 > layout.output(tops[self.tops_cursor]).bounds.y0
            {
                let index = tops[self.tops_cursor];
                if !self.registry.items.contains_key(&layout.output(index).id) {
                    self.mount_output(index, layout)?;
                }
                self.tops_cursor += 1;
            }
            // Items whose top dropped below the new bottom.
            while self.tops_cursor > 0
                && viewport.y1 <= layout.output(tops[self.tops_cursor - 1]).bounds.y0
            {
                self.tops_cursor -= 1;
                let index = tops[self.tops_cursor];
                if !self.transitions.is_locked(index) {
                    self.unmount_item(index)?;
                }
            }
        }

        let incremental: Vec<OutputId> = self.registry.incremental_items().collect();
        for id in incremental {
            self.mount_item_incrementally(id, layout, viewport, process_visibility);
        }
        Ok(true)
    }

    /// Positions both cursors for `viewport` after a full pass.
    pub(super) fn setup_cursors(&mut self, layout: &LayoutResult, viewport: Rect) {
        if is_empty(viewport) {
            return;
        }
        let count = layout.len();
        self.tops_cursor = layout
            .tops()
            .iter()
            .position(|&index| viewport.y1 <= layout.output(index).bounds.y0)
            .unwrap_or(count);
        self.bottoms_cursor = layout
            .bottoms()
            .iter()
            .position(|&index| viewport.y0 < layout.output(index).bounds.y1)
            .unwrap_or(count);
    }

    /// Asks the nested mount of `id` to mount everything inside `bounds`.
    fn mount_item_fully(&mut self, id: OutputId, bounds: Rect, process_visibility: bool) {
        let Some(item) = self.registry.items.get(&id) else {
            return;
        };
        if !item.kind.is_view_like() {
            return;
        }
        let local = Rect::new(0.0, 0.0, bounds.width(), bounds.height());
        self.backend
            .mount_incrementally(&item.content, local, process_visibility);
    }

    /// Forwards the part of `viewport` covering `id` to its nested mount.
    fn mount_item_incrementally(
        &mut self,
        id: OutputId,
        layout: &LayoutResult,
        viewport: Rect,
        process_visibility: bool,
    ) {
        let Some(item) = self.registry.items.get(&id) else {
            return;
        };
        if !item.kind.is_view_like() {
            return;
        }
        let Some(index) = layout.position_for_id(id) else {
            return;
        };
        let bounds = layout.output(index).bounds;
        let local = viewport - Vec2::new(bounds.x0, bounds.y0);
        let visible = Rect::new(
            local.x0.max(0.0),
            local.y0.max(0.0),
            local.x1.min(bounds.width()),
            local.y1.min(bounds.height()),
        );
        self.backend
            .mount_incrementally(&item.content, visible, process_visibility);
    }
}
