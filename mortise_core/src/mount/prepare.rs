// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying the diff of the previous id sequence against a new layout.

use alloc::rc::Rc;
use alloc::vec::Vec;

use super::MountState;
use crate::backend::MountBackend;
use crate::diff::{Decision, PrepareMountStats, classify};
use crate::error::MountError;
use crate::id::TransitionKey;
use crate::layout::LayoutResult;
use crate::trace::ItemOp;
use crate::transition::{DisappearingGroup, TransitionDriver};

impl<B: MountBackend, D: TransitionDriver<B::Content>> MountState<B, D> {
    /// Unmounts, moves, or detaches as disappearing every previously recorded
    /// item, then aligns the registry's id sequence with `layout`.
    pub(super) fn prepare(&mut self, layout: &LayoutResult) -> Result<PrepareMountStats, MountError> {
        let mut stats = PrepareMountStats::default();
        let last = if self.transitions.prepared {
            self.last_layout.clone()
        } else {
            None
        };

        let mut index = 0;
        while index < self.registry.output_ids.len() {
            if let Some(last) = &last
                && let Some(key) = self.disappearing_key_at(last, index)
            {
                let last_descendant = last.find_last_descendant(index);
                self.start_disappearing(last, index, last_descendant, key)?;
                index = last_descendant + 1;
                continue;
            }

            let decision = classify(&self.registry, index, layout);
            match decision {
                Decision::Unmount(reason) => {
                    log::trace!("unmounting position {index}: {reason:?}");
                    self.unmount_item(index)?;
                }
                Decision::Move { from, to } => self.move_item(from, to),
                Decision::NotMounted | Decision::Unchanged => {}
            }
            stats.record(decision);
            index += 1;
        }

        self.registry.output_ids = layout.outputs().iter().map(|output| output.id).collect();
        Ok(stats)
    }

    /// The transition key of position `index` of `last`, if the driver
    /// reports it disappearing and the item can animate out.
    fn disappearing_key_at(&self, last: &LayoutResult, index: usize) -> Option<TransitionKey> {
        if index == 0 || index >= last.len() {
            return None;
        }
        let output = last.output(index);
        if self.registry.id_at(index) != Some(output.id) {
            return None;
        }
        let key = output.transition_key.as_ref()?;
        if !self.driver.is_key_disappearing(key) {
            return None;
        }
        // The item can only animate out inside a mounted host.
        self.registry
            .items
            .contains_key(&output.host)
            .then(|| key.clone())
    }

    /// Detaches the subtree `index..=last_descendant` of `last` from normal
    /// diffing and registers it as disappearing under `key`.
    pub(super) fn start_disappearing(
        &mut self,
        last: &Rc<LayoutResult>,
        index: usize,
        last_descendant: usize,
        key: TransitionKey,
    ) -> Result<(), MountError> {
        if self.transitions.is_disappearing(&key) {
            return Err(MountError::DuplicateDisappearingKey(key));
        }

        // The whole subtree animates, including parts scrolled out of view.
        for position in index..=last_descendant {
            if !self.registry.items.contains_key(&last.output(position).id) {
                self.mount_output(position, last)?;
            }
        }

        // Nested hosts drop their own disappearing children first.
        for position in index..=last_descendant {
            let nested = self
                .registry
                .disappearing_children_of(last.output(position).id)
                .to_vec();
            for nested_key in nested {
                self.finish_disappearing(&nested_key, true);
            }
        }

        let top = last.output(index);
        let mut items = Vec::with_capacity(last_descendant - index + 1);
        for position in index..=last_descendant {
            let id = last.output(position).id;
            let Some(item) = self.registry.items.remove(&id) else {
                continue;
            };
            self.registry.hosts.remove(&id);
            self.registry.incremental.remove(&id);
            if position != index
                && let Some(inner) = &item.transition_key
                && self.driver.is_key_disappearing(inner)
            {
                if self.transitions.is_disappearing(inner) {
                    return Err(MountError::DuplicateDisappearingKey(inner.clone()));
                }
                self.transitions.nested.insert(inner.clone(), key.clone());
            }
            self.stats.disappearing += 1;
            self.record_change(id, position, item.kind, ItemOp::Disappear);
            items.push((id, item));
        }

        self.registry.detach(top.host, top.id);
        if let Some(record) = self.registry.hosts.get_mut(&top.host) {
            record.disappearing.push(key.clone());
        }
        log::debug!(
            "{key} starts disappearing with {} item(s) under {:?}",
            items.len(),
            top.host
        );
        if let Some((_, first)) = items.first() {
            self.driver.set_mount_content(&key, Some(&first.content));
        }
        self.transitions.disappearing.insert(
            key,
            DisappearingGroup {
                host: top.host,
                items,
            },
        );
        Ok(())
    }
}
