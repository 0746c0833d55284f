// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental mounting of declarative UI output trees.
//!
//! `mortise_core` takes the flat, ordered output of a layout pass and keeps a
//! live tree of platform content in sync with it, touching only what changed.
//! It is `no_std` compatible (with `alloc`) and platform agnostic: content
//! handles are opaque and every platform call goes through a
//! [`MountBackend`](backend::MountBackend).
//!
//! # Architecture
//!
//! ```text
//!   LayoutResult (validated, indexed)
//!       │
//!       ▼
//!   MountState::mount()
//!       │
//!       ├─► diff ──────────► unmount / move          (dirty passes)
//!       ├─► transitions ───► locks, disappearing items
//!       ├─► full pass ─────► mount / update          (or the scroll fast path)
//!       └─► visibility ────► VisibilityEvent
//!       │
//!       ▼
//!   MountBackend (create, attach, bind, bounds, ...)
//! ```
//!
//! **[`layout`]**: The input. Outputs in depth-first order, each with a
//! stable [`OutputId`](id::OutputId), a host, bounds, and a shared
//! [`Component`](component::Component) descriptor. Building a
//! [`LayoutResult`](layout::LayoutResult) validates the ordering and
//! precomputes the id, edge, and transition-key indices.
//!
//! **[`diff`]**: Pure classification of previously mounted positions against
//! a new layout (unmount, move, unchanged).
//!
//! **[`registry`]**: Mounted items keyed by id, with host/child links and the
//! id sequence of the last pass.
//!
//! **[`mount`]**: [`MountState`](mount::MountState), the engine. Full and
//! viewport-limited passes, update decisions, unmount-all, bind toggling, and
//! animation completion.
//!
//! **[`transition`]**: The [`TransitionDriver`](transition::TransitionDriver)
//! trait an animation system implements, per-position animation locks, and
//! the bookkeeping for items kept mounted while they animate out.
//!
//! **[`pool`]**: Per-shape recycling of released content handles.
//!
//! **[`visibility`]**: Visible, focused, and full-impression tracking for
//! outputs that ask for it.
//!
//! **[`trace`]**: [`MountTraceSink`](trace::MountTraceSink) trait and event
//! types for mount-pass instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-item
//!   mount, unmount, update, and move events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod component;
pub mod config;
pub mod diff;
pub mod error;
pub mod id;
pub mod layout;
pub mod mount;
pub mod pool;
pub mod registry;
pub mod stats;
pub mod trace;
pub mod transition;
pub mod visibility;

#[cfg(test)]
mod testing;
