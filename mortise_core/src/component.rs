// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component descriptors and the attributes applied to mounted content.
//!
//! A [`Component`] describes *what* is mounted for an output: which kind of
//! content it needs, which pool shape that content belongs to, and how to
//! decide whether a new description requires the mounted content to be
//! refreshed. The engine never inspects concrete component types; every
//! decision goes through this trait or through the closed [`ContentKind`]
//! set.

use alloc::rc::Rc;
use core::fmt;

use crate::transition::Transition;

/// The closed set of mountable content kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// A container that owns child mounted items.
    HostContainer,
    /// A view-like leaf (participates in layout, accepts attributes).
    ViewContent,
    /// A drawable-like leaf (painted by its host).
    DrawableContent,
}

impl ContentKind {
    /// Returns whether content of this kind can own children.
    #[inline]
    #[must_use]
    pub const fn is_host(self) -> bool {
        matches!(self, Self::HostContainer)
    }

    /// Returns whether content of this kind is view-like and therefore
    /// receives visual attributes.
    #[inline]
    #[must_use]
    pub const fn is_view_like(self) -> bool {
        matches!(self, Self::HostContainer | Self::ViewContent)
    }
}

/// Pool key for recycled content: kind plus a reuse-compatibility tag.
///
/// Two components with equal shapes can share recycled content handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentShape {
    /// Kind of content.
    pub kind: ContentKind,
    /// Component-type tag; contents are only reused between equal tags.
    pub type_tag: u32,
}

impl ContentShape {
    /// Creates a shape.
    #[inline]
    #[must_use]
    pub const fn new(kind: ContentKind, type_tag: u32) -> Self {
        Self { kind, type_tag }
    }
}

/// How layout classified an output relative to the previous layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateState {
    /// No information; the component predicate decides.
    #[default]
    Unspecified,
    /// Layout determined the output is unchanged.
    Updated,
    /// Layout determined the output changed.
    Dirty,
}

/// Describes the content to mount for an output.
///
/// Components are shared as [`ComponentRef`] and must not change once a
/// layout referencing them is built.
pub trait Component: fmt::Debug {
    /// Human-readable name, used in diagnostics.
    fn name(&self) -> &str;

    /// Kind of content this component mounts.
    fn kind(&self) -> ContentKind;

    /// Pool shape of the mounted content.
    fn shape(&self) -> ContentShape {
        ContentShape::new(self.kind(), 0)
    }

    /// Whether the mounted content must be refreshed whenever its size changes.
    fn is_mount_size_dependent(&self) -> bool {
        false
    }

    /// Whether the mounted content hosts its own nested incremental mount.
    ///
    /// Only view-like content is driven incrementally.
    fn can_mount_incrementally(&self) -> bool {
        false
    }

    /// Whether [`should_update`](Self::should_update) is consulted when an
    /// output is remounted without layout-provided update information.
    ///
    /// When `false`, such outputs are always refreshed.
    fn calls_should_update_on_mount(&self) -> bool {
        false
    }

    /// Authoritative update predicate: returns `true` when `next` requires
    /// the content currently describing `self` to be refreshed.
    fn should_update(&self, next: &dyn Component) -> bool {
        _ = next;
        true
    }

    /// A transition this component declares at mount time, if any.
    fn mount_time_transition(&self) -> Option<Transition> {
        None
    }
}

/// Shared handle to a [`Component`].
pub type ComponentRef = Rc<dyn Component>;

/// Generic visual attributes applied to view-like content.
///
/// The engine applies and clears them as a unit; their meaning is up to the
/// backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    /// Accessibility description.
    pub content_description: Option<Rc<str>>,
    /// Opacity override.
    pub alpha: Option<f32>,
    /// Rotation override in degrees.
    pub rotation: Option<f32>,
    /// Whether the content can take focus.
    pub focusable: Option<bool>,
    /// Whether the content is enabled.
    pub enabled: Option<bool>,
    /// Whether the content is selected.
    pub selected: Option<bool>,
    /// Whether the content responds to clicks.
    pub clickable: bool,
}

impl Attributes {
    /// Returns whether no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Component of the synthetic root container.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootHost;

impl Component for RootHost {
    fn name(&self) -> &str {
        "RootHost"
    }

    fn kind(&self) -> ContentKind {
        ContentKind::HostContainer
    }

    fn should_update(&self, _next: &dyn Component) -> bool {
        false
    }
}
