// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mounted-item registry: live content by output id, the set of acting
//! hosts, and the id sequence of the last completed mount pass.
//!
//! The registry is the engine's persistent state between passes. Its
//! `output_ids` array is positionally aligned with the last mounted layout and
//! is the baseline the next diff walks.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::component::{Attributes, ComponentRef, ContentKind, RootHost};
use crate::id::{OutputId, TransitionKey};

/// Live counterpart of a render output.
#[derive(Debug)]
pub struct MountedItem<C> {
    pub(crate) content: C,
    pub(crate) component: ComponentRef,
    pub(crate) kind: ContentKind,
    pub(crate) host: OutputId,
    pub(crate) bounds: Rect,
    pub(crate) bound: bool,
    pub(crate) attributes: Attributes,
    pub(crate) transition_key: Option<TransitionKey>,
}

impl<C> MountedItem<C> {
    /// The mounted content handle.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    /// The component the content currently reflects.
    #[inline]
    #[must_use]
    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    /// Kind of the mounted content.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Id of the host the content is attached to.
    #[inline]
    #[must_use]
    pub fn host(&self) -> OutputId {
        self.host
    }

    /// Host-relative bounds last applied to the content.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether the content is bound.
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Attributes applied to the content.
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Transition key of the output the content reflects.
    #[inline]
    #[must_use]
    pub fn transition_key(&self) -> Option<&TransitionKey> {
        self.transition_key.as_ref()
    }
}

/// Bookkeeping for a mounted host container.
#[derive(Clone, Debug, Default)]
pub(crate) struct HostRecord {
    /// Ids of the items currently attached to this host.
    pub(crate) children: Vec<OutputId>,
    /// Keys of disappearing items still attached to this host.
    pub(crate) disappearing: Vec<TransitionKey>,
}

/// Every mounted item, the acting hosts, and the last pass's id sequence.
#[derive(Debug)]
pub struct Registry<C> {
    pub(crate) items: HashMap<OutputId, MountedItem<C>>,
    pub(crate) hosts: HashMap<OutputId, HostRecord>,
    pub(crate) output_ids: Vec<OutputId>,
    pub(crate) incremental: BTreeSet<OutputId>,
}

impl<C> Registry<C> {
    /// Creates a registry holding only the externally owned root container.
    pub(crate) fn new(root: C, root_bounds: Rect) -> Self {
        let mut items = HashMap::new();
        items.insert(
            OutputId::ROOT,
            MountedItem {
                content: root,
                component: alloc::rc::Rc::new(RootHost),
                kind: ContentKind::HostContainer,
                host: OutputId::ROOT,
                bounds: root_bounds,
                bound: false,
                attributes: Attributes::default(),
                transition_key: None,
            },
        );
        let mut hosts = HashMap::new();
        hosts.insert(OutputId::ROOT, HostRecord::default());
        Self {
            items,
            hosts,
            output_ids: Vec::new(),
            incremental: BTreeSet::new(),
        }
    }

    // -- Lookup --

    /// The item mounted for `id`.
    #[inline]
    #[must_use]
    pub fn item(&self, id: OutputId) -> Option<&MountedItem<C>> {
        self.items.get(&id)
    }

    /// Id recorded at `index` in the last pass.
    #[inline]
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<OutputId> {
        self.output_ids.get(index).copied()
    }

    /// The item mounted for the id recorded at `index`.
    #[inline]
    #[must_use]
    pub fn item_at(&self, index: usize) -> Option<&MountedItem<C>> {
        self.id_at(index).and_then(|id| self.items.get(&id))
    }

    /// Last position of `id` in the recorded sequence.
    #[must_use]
    pub fn position_of(&self, id: OutputId) -> Option<usize> {
        self.output_ids.iter().rposition(|&x| x == id)
    }

    /// The recorded id sequence.
    #[inline]
    #[must_use]
    pub fn output_ids(&self) -> &[OutputId] {
        &self.output_ids
    }

    /// Number of mounted items, including the root.
    #[inline]
    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.items.len()
    }

    /// Whether `id` is a mounted host.
    #[inline]
    #[must_use]
    pub fn is_host(&self, id: OutputId) -> bool {
        self.hosts.contains_key(&id)
    }

    /// Ids of the items attached to host `id`.
    #[must_use]
    pub fn children_of(&self, id: OutputId) -> &[OutputId] {
        self.hosts.get(&id).map_or(&[][..], |h| h.children.as_slice())
    }

    /// Whether `id` is a mounted host with at least one attached child.
    #[must_use]
    pub fn is_host_with_children(&self, id: OutputId) -> bool {
        self.hosts.get(&id).is_some_and(|h| !h.children.is_empty())
    }

    /// Keys of disappearing items still attached to host `id`.
    #[must_use]
    pub fn disappearing_children_of(&self, id: OutputId) -> &[TransitionKey] {
        self.hosts.get(&id).map_or(&[][..], |h| h.disappearing.as_slice())
    }

    /// Ids of mounted items that drive a nested incremental mount.
    pub fn incremental_items(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.incremental.iter().copied()
    }

    // -- Mutation --

    pub(crate) fn attach(&mut self, host: OutputId, child: OutputId) {
        if let Some(record) = self.hosts.get_mut(&host) {
            record.children.push(child);
        }
    }

    pub(crate) fn detach(&mut self, host: OutputId, child: OutputId) {
        if let Some(record) = self.hosts.get_mut(&host) {
            record.children.retain(|&c| c != child);
        }
    }

    /// Checks that every mounted non-root item's host is itself mounted and
    /// lists it as a child.
    ///
    /// Returns the first offending id.
    #[must_use]
    pub fn find_orphan(&self) -> Option<OutputId> {
        self.items.iter().find_map(|(&id, item)| {
            if id.is_root() {
                return None;
            }
            match self.hosts.get(&item.host) {
                Some(record) if record.children.contains(&id) => None,
                _ => Some(id),
            }
        })
    }
}
