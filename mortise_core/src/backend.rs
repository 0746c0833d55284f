// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The engine decides *what* to mount, unmount, move, and rebind; a
//! [`MountBackend`] performs each decision on a platform-native tree (views,
//! layers, DOM nodes, or a test recorder). Backends never see the layout or
//! the registry, only individual content handles.
//!
//! # Call order
//!
//! Mounting an output calls, in order: [`create_content`] (unless a recycled
//! handle is available), [`mount_content`], [`attach`],
//! [`apply_attributes`] for view-like content, [`bind`], and
//! [`apply_bounds`] with `force = true`. Unmounting reverses this:
//! [`detach`], [`clear_attributes`], [`unbind`], [`unmount_content`], then
//! either the handle is pooled or [`destroy_content`] is called.
//!
//! [`create_content`]: MountBackend::create_content
//! [`mount_content`]: MountBackend::mount_content
//! [`attach`]: MountBackend::attach
//! [`apply_attributes`]: MountBackend::apply_attributes
//! [`bind`]: MountBackend::bind
//! [`apply_bounds`]: MountBackend::apply_bounds
//! [`detach`]: MountBackend::detach
//! [`clear_attributes`]: MountBackend::clear_attributes
//! [`unbind`]: MountBackend::unbind
//! [`unmount_content`]: MountBackend::unmount_content
//! [`destroy_content`]: MountBackend::destroy_content

use kurbo::Rect;

use crate::component::{Attributes, Component, ContentKind};

/// Applies mount decisions to a platform-native tree.
pub trait MountBackend {
    /// Handle to a piece of mounted content.
    type Content;

    /// Creates fresh content for `component`.
    fn create_content(&mut self, component: &dyn Component) -> Self::Content;

    /// Destroys content that will not be reused.
    fn destroy_content(&mut self, content: Self::Content);

    /// Kind of `content`, used to reject content that does not match the
    /// component that asked for it.
    fn content_kind(&self, content: &Self::Content) -> ContentKind;

    /// Prepares `content` to display `component`.
    fn mount_content(&mut self, content: &Self::Content, component: &dyn Component);

    /// Releases `component`-specific state from `content`.
    fn unmount_content(&mut self, content: &Self::Content, component: &dyn Component);

    /// Attaches `child` to `host` at layout position `index` with host-relative
    /// `bounds`.
    fn attach(&mut self, host: &Self::Content, child: &Self::Content, index: usize, bounds: Rect);

    /// Detaches `child` from `host`.
    fn detach(&mut self, host: &Self::Content, child: &Self::Content);

    /// Moves `child` within `host` from layout position `from` to `to`.
    fn move_child(&mut self, host: &Self::Content, child: &Self::Content, from: usize, to: usize);

    /// Sets the host-relative bounds of `content`.
    ///
    /// When `force` is false the backend may skip the update if the bounds
    /// are unchanged.
    fn apply_bounds(&mut self, content: &Self::Content, bounds: Rect, force: bool);

    /// Binds `content` to `component` (listeners, data).
    fn bind(&mut self, content: &Self::Content, component: &dyn Component);

    /// Reverses [`bind`](Self::bind).
    fn unbind(&mut self, content: &Self::Content, component: &dyn Component);

    /// Applies visual attributes to view-like content.
    fn apply_attributes(&mut self, content: &Self::Content, attributes: &Attributes);

    /// Clears previously applied visual attributes.
    fn clear_attributes(&mut self, content: &Self::Content, attributes: &Attributes);

    /// Whether view-like `content` has a pending layout request, in which
    /// case its bounds are reapplied with `force = true`.
    fn needs_layout(&self, content: &Self::Content) -> bool {
        _ = content;
        false
    }

    /// Drives the nested incremental mount of content that hosts its own
    /// mount engine. `visible` is in the content's local coordinates.
    fn mount_incrementally(
        &mut self,
        content: &Self::Content,
        visible: Rect,
        process_visibility: bool,
    ) {
        _ = (content, visible, process_visibility);
    }
}
