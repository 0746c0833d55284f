// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The value graph and its bindings.
//!
//! Nodes live in a slot arena and are addressed by [`NodeId`]. Edges are
//! grouped into [`GraphBinding`]s; a binding is activated as a unit and
//! deactivated automatically once every node in it reports
//! [`is_finished`](crate::node::ValueNode::is_finished).
//!
//! Each frame marks the source nodes of every active binding dirty with an
//! eager policy, so the whole downstream set is marked too. Draining the
//! [`VALUE`] channel yields the affected nodes with inputs ahead of their
//! dependents, and each node is recalculated from its inputs' values in that
//! order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use thiserror::Error;
use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

use crate::node::ValueNode;
use crate::timing::TimingSource;

/// Dirty channel for node values.
pub const VALUE: Channel = Channel::new(0);

/// Handle to a node in a [`DataFlowGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Slot index of this node.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to an active binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingId(u32);

/// Errors from graph mutation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The edge would close a cycle.
    #[error("edge {from:?} -> {to:?} would create a cycle")]
    Cycle {
        /// Upstream end of the rejected edge.
        from: NodeId,
        /// Downstream end of the rejected edge.
        to: NodeId,
    },
    /// The node does not exist.
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    /// The node already belongs to an active binding.
    #[error("node {0:?} is already bound")]
    NodeBusy(NodeId),
    /// The binding is not active.
    #[error("binding {0:?} is not active")]
    UnknownBinding(BindingId),
}

/// A set of edges that is activated and deactivated together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphBinding {
    edges: Vec<(NodeId, NodeId)>,
}

impl GraphBinding {
    /// Creates an empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `from`'s value into `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        self.edges.push((from, to));
        self
    }

    /// Edges in connection order.
    #[must_use]
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Activates the binding on `graph`.
    pub fn activate<S: TimingSource>(
        self,
        graph: &mut DataFlowGraph<S>,
    ) -> Result<BindingId, GraphError> {
        graph.activate(self)
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.edges.len() * 2);
        for &(from, to) in &self.edges {
            for id in [from, to] {
                if !nodes.contains(&id) {
                    nodes.push(id);
                }
            }
        }
        nodes
    }
}

#[derive(Debug)]
struct Slot {
    node: Box<dyn ValueNode>,
    inputs: Vec<u32>,
    value: f32,
    binding: Option<BindingId>,
}

#[derive(Debug)]
struct ActiveBinding {
    nodes: Vec<u32>,
    edges: Vec<(u32, u32)>,
}

/// A graph of [`ValueNode`]s driven by a [`TimingSource`].
#[derive(Debug)]
pub struct DataFlowGraph<S> {
    slots: Vec<Option<Slot>>,
    free_slots: Vec<u32>,
    bindings: Vec<Option<ActiveBinding>>,
    active: usize,
    dirty: DirtyTracker<u32>,
    source: S,
    scratch: Vec<f32>,
}

impl<S: TimingSource> DataFlowGraph<S> {
    /// Creates an empty graph.
    pub fn new(source: S) -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            bindings: Vec::new(),
            active: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            source,
            scratch: Vec::new(),
        }
    }

    /// Adds a node. Its value is 0 until it is first calculated.
    pub fn add_node(&mut self, node: impl ValueNode + 'static) -> NodeId {
        let slot = Slot {
            node: Box::new(node),
            inputs: Vec::new(),
            value: 0.0,
            binding: None,
        };
        if let Some(idx) = self.free_slots.pop() {
            self.slots[idx as usize] = Some(slot);
            NodeId(idx)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "node count will not exceed u32::MAX"
            )]
            let idx = self.slots.len() as u32;
            self.slots.push(Some(slot));
            NodeId(idx)
        }
    }

    /// Removes an unbound node and returns it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Box<dyn ValueNode>, GraphError> {
        let slot = self.slot(id)?;
        if slot.binding.is_some() {
            return Err(GraphError::NodeBusy(id));
        }
        let slot = self.slots[id.0 as usize]
            .take()
            .ok_or(GraphError::UnknownNode(id))?;
        self.dirty.remove_key(id.0);
        self.free_slots.push(id.0);
        Ok(slot.node)
    }

    /// Latest value of a node.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<f32> {
        self.slot(id).ok().map(|s| s.value)
    }

    /// Borrows a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&dyn ValueNode> {
        self.slot(id).ok().map(|s| &*s.node)
    }

    /// Whether a binding is still active.
    #[must_use]
    pub fn is_active(&self, id: BindingId) -> bool {
        self.bindings
            .get(id.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Number of active bindings.
    #[must_use]
    pub fn active_bindings(&self) -> usize {
        self.active
    }

    /// The frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Activates a binding.
    ///
    /// Every node must exist and be unbound. When an edge would close a
    /// cycle the edges added so far are removed again and the graph is left
    /// as it was. The first active binding starts the timing source.
    pub fn activate(&mut self, binding: GraphBinding) -> Result<BindingId, GraphError> {
        let nodes = binding.nodes();
        for &id in &nodes {
            if self.slot(id)?.binding.is_some() {
                return Err(GraphError::NodeBusy(id));
            }
        }

        let mut added: Vec<(u32, u32)> = Vec::with_capacity(binding.edges.len());
        for &(from, to) in &binding.edges {
            if self.dirty.add_dependency(to.0, from.0, VALUE).is_err() {
                for &(f, t) in &added {
                    self.dirty.remove_dependency(t, f, VALUE);
                }
                return Err(GraphError::Cycle { from, to });
            }
            added.push((from.0, to.0));
        }

        let id = match self.bindings.iter().position(Option::is_none) {
            Some(free) => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "binding count will not exceed u32::MAX"
                )]
                let free = free as u32;
                BindingId(free)
            }
            None => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "binding count will not exceed u32::MAX"
                )]
                let next = self.bindings.len() as u32;
                self.bindings.push(None);
                BindingId(next)
            }
        };

        for &(from, to) in &added {
            if let Some(slot) = self.slots[to as usize].as_mut() {
                slot.inputs.push(from);
            }
        }
        for &node in &nodes {
            if let Some(slot) = self.slots[node.0 as usize].as_mut() {
                slot.binding = Some(id);
            }
        }
        self.bindings[id.0 as usize] = Some(ActiveBinding {
            nodes: nodes.iter().map(|n| n.0).collect(),
            edges: added,
        });
        self.active += 1;
        if self.active == 1 {
            self.source.start();
        }
        log::debug!("activated binding {id:?} with {} nodes", nodes.len());
        Ok(id)
    }

    /// Deactivates a binding, keeping its nodes and their last values.
    ///
    /// The timing source is stopped once no binding remains active.
    pub fn deactivate(&mut self, id: BindingId) -> Result<(), GraphError> {
        let binding = self
            .bindings
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(GraphError::UnknownBinding(id))?;
        for &(from, to) in &binding.edges {
            self.dirty.remove_dependency(to, from, VALUE);
        }
        for &node in &binding.nodes {
            if let Some(slot) = self.slots[node as usize].as_mut() {
                slot.inputs.clear();
                slot.binding = None;
            }
        }
        self.active -= 1;
        if self.active == 0 {
            self.source.stop();
        }
        log::debug!("deactivated binding {id:?}");
        Ok(())
    }

    /// Recalculates every active binding for one frame.
    ///
    /// Returns the number of bindings that finished and were deactivated.
    pub fn do_frame(&mut self, frame_time_nanos: u64) -> usize {
        for binding in self.bindings.iter().flatten() {
            for &node in &binding.nodes {
                let is_source = self.slots[node as usize]
                    .as_ref()
                    .is_some_and(|s| s.inputs.is_empty());
                if is_source {
                    self.dirty.mark_with(node, VALUE, &EagerPolicy);
                }
            }
        }

        let order: Vec<u32> = self
            .dirty
            .drain(VALUE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in order {
            self.scratch.clear();
            if let Some(slot) = self.slots[idx as usize].as_ref() {
                for &input in &slot.inputs {
                    let value = self.slots[input as usize].as_ref().map_or(0.0, |s| s.value);
                    self.scratch.push(value);
                }
            }
            if let Some(slot) = self.slots[idx as usize].as_mut() {
                slot.value = slot.node.calculate(&self.scratch, frame_time_nanos);
            }
        }

        let finished: Vec<BindingId> = self
            .bindings
            .iter()
            .enumerate()
            .filter_map(|(i, b)| {
                let b = b.as_ref()?;
                let done = b.nodes.iter().all(|&n| {
                    self.slots[n as usize]
                        .as_ref()
                        .is_none_or(|s| s.node.is_finished())
                });
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "binding count will not exceed u32::MAX"
                )]
                let id = BindingId(i as u32);
                done.then_some(id)
            })
            .collect();
        for &id in &finished {
            let _ = self.deactivate(id);
        }
        finished.len()
    }

    /// Pulls up to `frames` frames from the source and runs them.
    ///
    /// Returns the number of frames actually run; stops early when the source
    /// stops.
    pub fn run_frames(&mut self, frames: usize) -> usize {
        let mut ran = 0;
        while ran < frames {
            let Some(time) = self.source.next_frame() else {
                break;
            };
            self.do_frame(time);
            ran += 1;
        }
        ran
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, GraphError> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::UnknownNode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ConstantNode, OutputOnlyNode, SimpleNode, TimingNode};
    use crate::timing::{FRAME_TIME_MS, MockTimingSource};

    fn graph() -> DataFlowGraph<MockTimingSource> {
        DataFlowGraph::new(MockTimingSource::new())
    }

    #[test]
    fn timing_chain_reaches_one_and_unbinds() {
        let mut graph = graph();
        let timing = graph.add_node(TimingNode::new(300));
        let middle = graph.add_node(SimpleNode::pass_through());
        let dest = graph.add_node(OutputOnlyNode::new());

        let mut binding = GraphBinding::new();
        binding.connect(timing, middle).connect(middle, dest);
        let id = binding.activate(&mut graph).unwrap();
        assert!(graph.source().is_running());

        let expected_frames = usize::try_from(300 / FRAME_TIME_MS + 1).unwrap();

        assert_eq!(graph.run_frames(1), 1);
        assert_eq!(graph.value(dest), Some(0.0));

        graph.run_frames(expected_frames / 2);
        let halfway = graph.value(dest).unwrap();
        assert!(halfway > 0.0 && halfway < 1.0, "got {halfway}");

        graph.run_frames(expected_frames / 2 + 1);
        assert_eq!(graph.value(dest), Some(1.0));
        assert!(!graph.is_active(id));
        assert!(!graph.source().is_running());
        assert_eq!(graph.run_frames(5), 0);
    }

    #[test]
    fn inputs_are_calculated_before_dependents() {
        let mut graph = graph();
        let constant = graph.add_node(ConstantNode(2.0));
        let double = graph.add_node(SimpleNode::new(|v| v * 2.0));
        let again = graph.add_node(SimpleNode::new(|v| v * 2.0));
        let out = graph.add_node(OutputOnlyNode::new());

        let mut binding = GraphBinding::new();
        binding
            .connect(again, out)
            .connect(double, again)
            .connect(constant, double);
        let id = graph.activate(binding).unwrap();

        assert_eq!(graph.run_frames(1), 1);
        assert_eq!(graph.value(out), Some(8.0));
        // Every node is finished after one frame.
        assert!(!graph.is_active(id));
        assert_eq!(graph.active_bindings(), 0);
    }

    #[test]
    fn cycle_is_rejected_and_rolled_back() {
        let mut graph = graph();
        let a = graph.add_node(SimpleNode::pass_through());
        let b = graph.add_node(SimpleNode::pass_through());

        let mut cyclic = GraphBinding::new();
        cyclic.connect(a, b).connect(b, a);
        assert_eq!(
            graph.activate(cyclic),
            Err(GraphError::Cycle { from: b, to: a })
        );
        assert_eq!(graph.active_bindings(), 0);
        assert!(!graph.source().is_running());

        let mut ok = GraphBinding::new();
        ok.connect(b, a);
        assert!(graph.activate(ok).is_ok());
    }

    #[test]
    fn bound_nodes_cannot_be_reused_or_removed() {
        let mut graph = graph();
        let timing = graph.add_node(TimingNode::new(100));
        let out = graph.add_node(OutputOnlyNode::new());
        let other = graph.add_node(OutputOnlyNode::new());

        let mut first = GraphBinding::new();
        first.connect(timing, out);
        let id = graph.activate(first).unwrap();

        let mut second = GraphBinding::new();
        second.connect(timing, other);
        assert_eq!(graph.activate(second), Err(GraphError::NodeBusy(timing)));
        assert_eq!(
            graph.remove_node(timing).map(|_| ()),
            Err(GraphError::NodeBusy(timing))
        );

        graph.deactivate(id).unwrap();
        assert_eq!(graph.deactivate(id), Err(GraphError::UnknownBinding(id)));
        assert!(graph.remove_node(timing).is_ok());
        assert_eq!(graph.value(timing), None);

        let reused = graph.add_node(ConstantNode(1.0));
        assert_eq!(reused, timing);
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut graph = graph();
        let a = graph.add_node(ConstantNode(1.0));
        let b = graph.add_node(OutputOnlyNode::new());
        graph.remove_node(b).unwrap();

        let mut binding = GraphBinding::new();
        binding.connect(a, b);
        assert_eq!(graph.activate(binding), Err(GraphError::UnknownNode(b)));
        assert!(graph.node(a).is_some());
    }
}
