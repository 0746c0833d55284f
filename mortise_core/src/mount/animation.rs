// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition setup, animation completion, and disappearing-item teardown.

use alloc::rc::Rc;
use alloc::vec::Vec;

use super::MountState;
use crate::backend::MountBackend;
use crate::error::MountError;
use crate::id::TransitionKey;
use crate::layout::LayoutResult;
use crate::transition::{Transition, TransitionDriver};

impl<B: MountBackend, D: TransitionDriver<B::Content>> MountState<B, D> {
    /// Prepares transitions for a dirty pass over `layout`.
    ///
    /// A tree change drops all animation state; unless the pass is the first
    /// mount of the new tree, nothing is set up.
    pub(super) fn update_transitions(&mut self, layout: &Rc<LayoutResult>) -> Result<(), MountError> {
        self.transitions.prepared = false;
        let tree_changed = layout.tree_id() != self.last_tree_id;
        if tree_changed {
            self.reset_animation_state();
            if !self.first_mount_of_tree {
                return Ok(());
            }
        }

        // Keys that come back end their exit animation now.
        let returning: Vec<TransitionKey> = self
            .transitions
            .disappearing
            .keys()
            .chain(self.transitions.nested.keys())
            .filter(|key| layout.position_for_key(key).is_some())
            .cloned()
            .collect();
        for key in returning {
            self.finish_disappearing(&key, true);
        }

        let explicit: Vec<Transition> = layout
            .explicit_transitions()
            .iter()
            .cloned()
            .chain(
                layout
                    .outputs()
                    .iter()
                    .filter_map(|output| output.component.mount_time_transition()),
            )
            .collect();
        if !explicit.is_empty() || layout.has_transition_context() {
            self.driver
                .setup_transitions(self.last_layout.as_deref(), layout, &explicit);
            for key in layout.transition_keys() {
                if self.driver.is_key_animating(key) {
                    self.transitions.animating.insert(key.clone());
                    self.transitions.retired.remove(key);
                }
            }
            self.transitions.prepared = true;
        }

        self.transitions.rebuild_locks(layout);
        Ok(())
    }

    /// Force-completes every disappearing item and drops in-flight animation
    /// state.
    pub(super) fn reset_animation_state(&mut self) {
        self.transitions.retire_animating();
        let keys: Vec<TransitionKey> = self.transitions.disappearing.keys().cloned().collect();
        for key in keys {
            self.finish_disappearing(&key, true);
        }
        self.transitions.prepared = false;
        self.driver.reset();
    }

    /// Tears down the disappearing subtree registered under `key`.
    ///
    /// With `retire`, a completion reported later for any torn-down key is
    /// ignored instead of rejected.
    pub(super) fn finish_disappearing(&mut self, key: &TransitionKey, retire: bool) {
        if let Some(group) = self.transitions.disappearing.remove(key) {
            let inner: Vec<TransitionKey> = self
                .transitions
                .nested
                .iter()
                .filter(|(_, outer)| *outer == key)
                .map(|(inner, _)| inner.clone())
                .collect();
            for inner in inner {
                self.transitions.nested.remove(&inner);
                if retire {
                    self.transitions.retired.insert(inner);
                }
            }
            if retire {
                self.transitions.retired.insert(key.clone());
            }
            if let Some(record) = self.registry.hosts.get_mut(&group.host) {
                record.disappearing.retain(|k| k != key);
            }
            log::debug!("{key} finished disappearing");
            self.tear_down(group.items);
            return;
        }

        let Some(outer) = self.transitions.nested.remove(key) else {
            return;
        };
        let Some(group) = self.transitions.disappearing.get_mut(&outer) else {
            return;
        };
        let Some(id) = group
            .items
            .iter()
            .find(|(_, item)| item.transition_key.as_ref() == Some(key))
            .map(|(id, _)| *id)
        else {
            return;
        };
        let subtree = group.split_subtree(id);
        for (_, item) in subtree.iter().skip(1) {
            if let Some(inner) = &item.transition_key
                && self.transitions.nested.remove(inner).is_some()
                && retire
            {
                self.transitions.retired.insert(inner.clone());
            }
        }
        if retire {
            self.transitions.retired.insert(key.clone());
        }
        self.tear_down(subtree);
    }

    /// Handles one completion signal.
    pub(super) fn complete_animation(&mut self, key: TransitionKey) -> Result<(), MountError> {
        if self.transitions.is_disappearing(&key) {
            self.finish_disappearing(&key, false);
            return Ok(());
        }

        if !self.transitions.animating.remove(&key) {
            if self.transitions.retired.contains(&key) {
                log::trace!("ignoring late completion for {key}");
                return Ok(());
            }
            return Err(MountError::UnknownAnimation(key));
        }

        if let Some(layout) = &self.last_layout
            && let Some(locks) = &mut self.transitions.locks
            && let Some(index) = layout.position_for_key(&key)
        {
            locks.unlock(layout, index)?;
        }

        if self.transitions.animating.is_empty() {
            if self.config.check_lock_balance
                && let Some(position) = self
                    .transitions
                    .locks
                    .as_ref()
                    .and_then(|locks| locks.first_locked())
            {
                return Err(MountError::LockLeak(position));
            }
            self.transitions.locks = None;
        }
        Ok(())
    }
}
