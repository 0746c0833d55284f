// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests: components, a backend that records
//! every call, and a transition driver scripted by the test.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

use crate::backend::MountBackend;
use crate::component::{Attributes, Component, ComponentRef, ContentKind, ContentShape};
use crate::id::TransitionKey;
use crate::layout::LayoutResult;
use crate::transition::{Transition, TransitionDriver};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct TestComponent {
    pub(crate) name: String,
    pub(crate) kind: ContentKind,
    pub(crate) type_tag: u32,
    pub(crate) size_dependent: bool,
    pub(crate) incremental: bool,
    pub(crate) checks_update: bool,
    /// Value returned by `should_update`.
    pub(crate) changed: Cell<bool>,
    pub(crate) mount_transition: Option<Transition>,
}

impl TestComponent {
    pub(crate) fn new(name: &str, kind: ContentKind) -> Self {
        Self {
            name: String::from(name),
            kind,
            type_tag: 0,
            size_dependent: false,
            incremental: false,
            checks_update: true,
            changed: Cell::new(false),
            mount_transition: None,
        }
    }

    pub(crate) fn into_ref(self) -> ComponentRef {
        Rc::new(self)
    }
}

impl Component for TestComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn shape(&self) -> ContentShape {
        ContentShape::new(self.kind, self.type_tag)
    }

    fn is_mount_size_dependent(&self) -> bool {
        self.size_dependent
    }

    fn can_mount_incrementally(&self) -> bool {
        self.incremental
    }

    fn calls_should_update_on_mount(&self) -> bool {
        self.checks_update
    }

    fn should_update(&self, _next: &dyn Component) -> bool {
        self.changed.get()
    }

    fn mount_time_transition(&self) -> Option<Transition> {
        self.mount_transition.clone()
    }
}

pub(crate) fn host(name: &str) -> ComponentRef {
    TestComponent::new(name, ContentKind::HostContainer).into_ref()
}

pub(crate) fn view(name: &str) -> ComponentRef {
    TestComponent::new(name, ContentKind::ViewContent).into_ref()
}

pub(crate) fn drawable(name: &str) -> ComponentRef {
    TestComponent::new(name, ContentKind::DrawableContent).into_ref()
}

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// Content handle of the recording backend.
pub(crate) type Handle = u32;

/// Handle of the root container.
pub(crate) const ROOT_HANDLE: Handle = 0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Create(Handle, String),
    Destroy(Handle),
    MountContent(Handle),
    UnmountContent(Handle),
    Attach {
        host: Handle,
        child: Handle,
        index: usize,
    },
    Detach {
        host: Handle,
        child: Handle,
    },
    Move {
        child: Handle,
        from: usize,
        to: usize,
    },
    Bounds(Handle, Rect, bool),
    Bind(Handle),
    Unbind(Handle),
    ApplyAttributes(Handle),
    ClearAttributes(Handle),
    MountIncrementally(Handle, Rect),
}

#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub(crate) calls: Vec<Call>,
    next: Handle,
    kinds: HashMap<Handle, ContentKind>,
    names: HashMap<Handle, String>,
    /// Kind reported for every new handle instead of the requested one.
    pub(crate) force_kind: Option<ContentKind>,
    pub(crate) layout_requested: HashSet<Handle>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        let mut kinds = HashMap::new();
        kinds.insert(ROOT_HANDLE, ContentKind::HostContainer);
        let mut names = HashMap::new();
        names.insert(ROOT_HANDLE, String::from("root"));
        Self {
            calls: Vec::new(),
            next: ROOT_HANDLE + 1,
            kinds,
            names,
            force_kind: None,
            layout_requested: HashSet::new(),
        }
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn mounts(&self) -> usize {
        self.count(|c| matches!(c, Call::MountContent(_)))
    }

    pub(crate) fn unmounts(&self) -> usize {
        self.count(|c| matches!(c, Call::UnmountContent(_)))
    }

    /// Name of the component a handle was created for.
    pub(crate) fn name_of(&self, handle: Handle) -> Option<&str> {
        self.names.get(&handle).map(String::as_str)
    }
}

impl MountBackend for RecordingBackend {
    type Content = Handle;

    fn create_content(&mut self, component: &dyn Component) -> Handle {
        let handle = self.next;
        self.next += 1;
        self.kinds
            .insert(handle, self.force_kind.unwrap_or(component.kind()));
        self.names.insert(handle, String::from(component.name()));
        self.calls
            .push(Call::Create(handle, String::from(component.name())));
        handle
    }

    fn destroy_content(&mut self, content: Handle) {
        self.calls.push(Call::Destroy(content));
    }

    fn content_kind(&self, content: &Handle) -> ContentKind {
        self.kinds
            .get(content)
            .copied()
            .unwrap_or(ContentKind::ViewContent)
    }

    fn mount_content(&mut self, content: &Handle, component: &dyn Component) {
        self.names.insert(*content, String::from(component.name()));
        self.calls.push(Call::MountContent(*content));
    }

    fn unmount_content(&mut self, content: &Handle, _component: &dyn Component) {
        self.calls.push(Call::UnmountContent(*content));
    }

    fn attach(&mut self, host: &Handle, child: &Handle, index: usize, _bounds: Rect) {
        self.calls.push(Call::Attach {
            host: *host,
            child: *child,
            index,
        });
    }

    fn detach(&mut self, host: &Handle, child: &Handle) {
        self.calls.push(Call::Detach {
            host: *host,
            child: *child,
        });
    }

    fn move_child(&mut self, _host: &Handle, child: &Handle, from: usize, to: usize) {
        self.calls.push(Call::Move {
            child: *child,
            from,
            to,
        });
    }

    fn apply_bounds(&mut self, content: &Handle, bounds: Rect, force: bool) {
        self.calls.push(Call::Bounds(*content, bounds, force));
    }

    fn bind(&mut self, content: &Handle, _component: &dyn Component) {
        self.calls.push(Call::Bind(*content));
    }

    fn unbind(&mut self, content: &Handle, _component: &dyn Component) {
        self.calls.push(Call::Unbind(*content));
    }

    fn apply_attributes(&mut self, content: &Handle, _attributes: &Attributes) {
        self.calls.push(Call::ApplyAttributes(*content));
    }

    fn clear_attributes(&mut self, content: &Handle, _attributes: &Attributes) {
        self.calls.push(Call::ClearAttributes(*content));
    }

    fn needs_layout(&self, content: &Handle) -> bool {
        self.layout_requested.contains(content)
    }

    fn mount_incrementally(&mut self, content: &Handle, visible: Rect, _process_visibility: bool) {
        self.calls.push(Call::MountIncrementally(*content, visible));
    }
}

// ---------------------------------------------------------------------------
// ScriptedDriver
// ---------------------------------------------------------------------------

/// Transition driver whose answers are set by the test.
#[derive(Debug, Default)]
pub(crate) struct ScriptedDriver {
    pub(crate) animating: HashSet<TransitionKey>,
    pub(crate) disappearing: HashSet<TransitionKey>,
    pub(crate) setups: u32,
    pub(crate) runs: u32,
    pub(crate) resets: u32,
    pub(crate) explicit_seen: usize,
    pub(crate) content: HashMap<TransitionKey, Option<Handle>>,
    /// Drop every reported content handle on the next setup.
    pub(crate) forget_content_on_setup: bool,
}

impl ScriptedDriver {
    pub(crate) fn animate(&mut self, key: &str) {
        self.animating.insert(TransitionKey::new(key));
    }

    pub(crate) fn disappear(&mut self, key: &str) {
        self.disappearing.insert(TransitionKey::new(key));
    }

    /// The content last reported for `key`.
    pub(crate) fn content_for(&self, key: &str) -> Option<Handle> {
        self.content
            .get(&TransitionKey::new(key))
            .copied()
            .flatten()
    }
}

impl TransitionDriver<Handle> for ScriptedDriver {
    fn setup_transitions(
        &mut self,
        _previous: Option<&LayoutResult>,
        _next: &LayoutResult,
        explicit: &[Transition],
    ) {
        self.setups += 1;
        self.explicit_seen = explicit.len();
        if self.forget_content_on_setup {
            self.content.clear();
        }
    }

    fn is_key_animating(&self, key: &TransitionKey) -> bool {
        self.animating.contains(key)
    }

    fn is_key_disappearing(&self, key: &TransitionKey) -> bool {
        self.disappearing.contains(key)
    }

    fn set_mount_content(&mut self, key: &TransitionKey, content: Option<&Handle>) {
        self.content.insert(key.clone(), content.copied());
    }

    fn run_transitions(&mut self) {
        self.runs += 1;
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}
