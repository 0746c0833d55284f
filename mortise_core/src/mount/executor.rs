// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount, unmount, move, and update of individual items.

use alloc::vec::Vec;

use kurbo::Rect;

use super::MountState;
use crate::backend::MountBackend;
use crate::component::{ContentKind, UpdateState};
use crate::config::MountConfig;
use crate::error::MountError;
use crate::id::OutputId;
use crate::layout::{LayoutResult, RenderOutput};
use crate::pool::ContentPool;
use crate::registry::{HostRecord, MountedItem};
use crate::trace::ItemOp;
use crate::transition::TransitionDriver;

impl<B: MountBackend, D: TransitionDriver<B::Content>> MountState<B, D> {
    /// Mounts the output at `index` of `layout`, mounting its host first if
    /// needed.
    ///
    /// The registry's id sequence must already be aligned with `layout`.
    pub(super) fn mount_output(
        &mut self,
        index: usize,
        layout: &LayoutResult,
    ) -> Result<(), MountError> {
        let output = layout.output(index);
        let id = output.id;
        let found = self.registry.id_at(index);
        if found != Some(id) {
            return Err(MountError::StaleLayout {
                index,
                expected: id,
                found,
            });
        }

        let host_id = output.host;
        if !self.registry.items.contains_key(&host_id) {
            let Some(host_index) = layout.position_for_id(host_id) else {
                return Err(MountError::HostNotMounted { id, host: host_id });
            };
            self.mount_output(host_index, layout)?;
        }

        let component = &output.component;
        let kind = component.kind();
        let recycled = if kind.is_host() && !self.config.recycle_hosts {
            None
        } else {
            self.pool.acquire(component.shape())
        };
        let content = match recycled {
            Some(content) => content,
            None => self.backend.create_content(&**component),
        };
        let actual = self.backend.content_kind(&content);
        if actual != kind {
            self.backend.destroy_content(content);
            return Err(MountError::UnsupportedContent {
                id,
                expected: kind,
                actual,
            });
        }

        self.backend.mount_content(&content, &**component);
        let bounds = layout.mount_bounds(index);
        let Some(host) = self.registry.items.get(&host_id) else {
            return Err(MountError::HostNotMounted { id, host: host_id });
        };
        self.backend.attach(&host.content, &content, index, bounds);
        self.registry.attach(host_id, id);
        if kind.is_host() {
            self.registry.hosts.insert(id, HostRecord::default());
        }
        if kind.is_view_like() && !output.attributes.is_empty() {
            self.backend.apply_attributes(&content, &output.attributes);
        }
        if let Some(key) = &output.transition_key {
            self.driver.set_mount_content(key, Some(&content));
        }
        self.backend.bind(&content, &**component);
        self.backend.apply_bounds(&content, bounds, true);

        if kind.is_view_like() && component.can_mount_incrementally() {
            self.registry.incremental.insert(id);
        }
        self.registry.items.insert(
            id,
            MountedItem {
                content,
                component: component.clone(),
                kind,
                host: host_id,
                bounds,
                bound: true,
                attributes: output.attributes.clone(),
                transition_key: output.transition_key.clone(),
            },
        );
        self.stats.mounted += 1;
        self.record_change(id, index, kind, ItemOp::Mount);
        Ok(())
    }

    /// Unmounts the item recorded at `index`, if any. The root is never
    /// unmounted.
    pub(super) fn unmount_item(&mut self, index: usize) -> Result<(), MountError> {
        match self.registry.id_at(index) {
            Some(id) => self.unmount_id(id, index),
            None => Ok(()),
        }
    }

    /// Unmounts `id` and, for hosts, every child first (last child first).
    fn unmount_id(&mut self, id: OutputId, index: usize) -> Result<(), MountError> {
        if id.is_root() {
            return Ok(());
        }
        let Some(kind) = self.registry.item(id).map(MountedItem::kind) else {
            return Ok(());
        };

        if kind.is_host() {
            let children: Vec<OutputId> = self.registry.children_of(id).to_vec();
            for &child in children.iter().rev() {
                let child_index = self.registry.position_of(child).unwrap_or(index);
                self.unmount_id(child, child_index)?;
            }
            if self.registry.is_host_with_children(id) {
                return Err(MountError::HostNotEmpty(id));
            }
            let disappearing = self.registry.disappearing_children_of(id).to_vec();
            for key in disappearing {
                self.finish_disappearing(&key, true);
            }
        }

        let Some(item) = self.registry.items.remove(&id) else {
            return Ok(());
        };
        self.registry.detach(item.host, id);
        self.registry.hosts.remove(&id);
        self.registry.incremental.remove(&id);
        release_content(
            &mut self.backend,
            &mut self.driver,
            &mut self.pool,
            &self.config,
            self.registry.items.get(&item.host).map(|host| &host.content),
            item,
        );
        self.stats.unmounted += 1;
        self.record_change(id, index, kind, ItemOp::Unmount);
        Ok(())
    }

    /// Tears down detached items, last first. Hosts are looked up among the
    /// remaining items, then in the registry.
    pub(super) fn tear_down(&mut self, mut items: Vec<(OutputId, MountedItem<B::Content>)>) {
        while let Some((id, item)) = items.pop() {
            let kind = item.kind;
            let host_content = items
                .iter()
                .find(|(candidate, _)| *candidate == item.host)
                .map(|(_, host)| &host.content)
                .or_else(|| self.registry.items.get(&item.host).map(|host| &host.content));
            release_content(
                &mut self.backend,
                &mut self.driver,
                &mut self.pool,
                &self.config,
                host_content,
                item,
            );
            self.stats.torn_down += 1;
            let position = self.registry.position_of(id).unwrap_or(usize::MAX);
            self.record_change(id, position, kind, ItemOp::Unmount);
        }
    }

    /// Moves the item recorded at `from` to layout position `to` within its
    /// host.
    pub(super) fn move_item(&mut self, from: usize, to: usize) {
        let Some(item) = self.registry.item_at(from) else {
            return;
        };
        let Some(host) = self.registry.items.get(&item.host) else {
            return;
        };
        self.backend.move_child(&host.content, &item.content, from, to);
        let (id, kind) = (self.registry.output_ids[from], item.kind);
        self.record_change(id, to, kind, ItemOp::Move);
    }

    /// Brings the mounted item for the output at `index` in line with it.
    pub(super) fn update_if_needed(
        &mut self,
        index: usize,
        layout: &LayoutResult,
    ) -> Result<(), MountError> {
        let output = layout.output(index);
        let id = output.id;
        let tree_id = layout.tree_id();
        let use_update_value = tree_id.is_valid() && tree_id == self.last_tree_id;
        let bounds = layout.mount_bounds(index);

        let Some(item) = self.registry.items.get_mut(&id) else {
            return Ok(());
        };
        let changed = should_update(item, output, bounds, use_update_value);

        if changed {
            if let Some(key) = &item.transition_key {
                self.driver.set_mount_content(key, None);
            }
            if item.kind.is_view_like() && !item.attributes.is_empty() {
                self.backend.clear_attributes(&item.content, &item.attributes);
            }
        }
        if item.bound {
            self.backend.unbind(&item.content, &*item.component);
            item.bound = false;
        }

        let previous = core::mem::replace(&mut item.component, output.component.clone());
        item.host = output.host;
        item.attributes = output.attributes.clone();
        item.transition_key = output.transition_key.clone();
        item.bounds = bounds;

        if changed {
            if !item.kind.is_host() {
                self.backend.unmount_content(&item.content, &*previous);
                self.backend.mount_content(&item.content, &*item.component);
            }
            if item.kind.is_view_like() && !item.attributes.is_empty() {
                self.backend.apply_attributes(&item.content, &item.attributes);
            }
        }

        self.backend.bind(&item.content, &*item.component);
        item.bound = true;
        let force = item.kind.is_view_like() && self.backend.needs_layout(&item.content);
        self.backend.apply_bounds(&item.content, bounds, force);
        if let Some(key) = &item.transition_key {
            self.driver.set_mount_content(key, Some(&item.content));
        }

        let kind = item.kind;
        if changed {
            self.stats.updated += 1;
            self.record_change(id, index, kind, ItemOp::Update);
        } else {
            self.stats.skipped_updates += 1;
        }
        Ok(())
    }
}

/// Decides whether mounted content must be refreshed for `next`.
///
/// Checked in order: size change of size-dependent components, the layout's
/// own update state (only when `use_update_value`), then the component's
/// predicate.
fn should_update<C>(
    item: &MountedItem<C>,
    next: &RenderOutput,
    next_bounds: Rect,
    use_update_value: bool,
) -> bool {
    let current = &*item.component;
    let next_component = &*next.component;

    if next_component.is_mount_size_dependent() && item.bounds.size() != next_bounds.size() {
        return true;
    }

    if use_update_value {
        match next.update_state {
            UpdateState::Updated => {
                if item.kind == ContentKind::DrawableContent
                    && next_component.kind() == ContentKind::DrawableContent
                    && current.should_update(next_component)
                {
                    log::warn!(
                        "{} was reported unchanged by layout but its update predicate disagrees; \
                         refreshing it",
                        next_component.name()
                    );
                    return true;
                }
                return false;
            }
            UpdateState::Dirty => return true,
            UpdateState::Unspecified => {}
        }
    }

    if !next_component.calls_should_update_on_mount() {
        return true;
    }
    current.should_update(next_component)
}

/// Returns an unregistered item's content to the pool or the backend.
///
/// Detaches from `host` when given, then clears attributes, unbinds, and
/// unmounts.
fn release_content<B: MountBackend, D: TransitionDriver<B::Content>>(
    backend: &mut B,
    driver: &mut D,
    pool: &mut ContentPool<B::Content>,
    config: &MountConfig,
    host: Option<&B::Content>,
    item: MountedItem<B::Content>,
) {
    if let Some(host) = host {
        backend.detach(host, &item.content);
    }
    if item.kind.is_view_like() && !item.attributes.is_empty() {
        backend.clear_attributes(&item.content, &item.attributes);
    }
    if item.bound {
        backend.unbind(&item.content, &*item.component);
    }
    backend.unmount_content(&item.content, &*item.component);
    if let Some(key) = &item.transition_key {
        driver.set_mount_content(key, None);
    }

    let leftover = if item.kind.is_host() && !config.recycle_hosts {
        Some(item.content)
    } else {
        pool.release(item.component.shape(), item.content)
    };
    if let Some(content) = leftover {
        backend.destroy_content(content);
    }
}
