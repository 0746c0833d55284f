// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven value propagation for mortise animations.
//!
//! A [`DataFlowGraph`](graph::DataFlowGraph) holds [`ValueNode`](node::ValueNode)s
//! connected by directed edges. Edges are activated in groups called
//! [`GraphBinding`](graph::GraphBinding)s. While at least one binding is
//! active the graph's [`TimingSource`](timing::TimingSource) runs, and every
//! frame recalculates the nodes downstream of each binding's sources in
//! dependency order.
//!
//! ```text
//!   TimingSource ──frame──► DataFlowGraph::do_frame()
//!                               │
//!                               ├─► mark binding sources dirty (eager)
//!                               ├─► drain VALUE channel in dependency order
//!                               ├─► ValueNode::calculate(inputs, frame time)
//!                               └─► deactivate finished bindings
//! ```
//!
//! Dependency tracking and cycle rejection come from
//! [`understory_dirty`]. [`MockTimingSource`](timing::MockTimingSource)
//! advances a fixed 16 ms per frame for deterministic tests.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod graph;
pub mod node;
pub mod timing;
