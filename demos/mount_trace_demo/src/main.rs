// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scrolling list that exercises the mount engine and its tracing
//! pipeline.
//!
//! Mounts a 40-row list through a viewport that scrolls a little every frame.
//! Partway through, one row is removed and fades out through a
//! [`DataFlowGraph`](mortise_dataflow::graph::DataFlowGraph) driven exit
//! animation. Events go to both a
//! [`PrettyPrintSink`](mortise_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](mortise_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::Rect;
use mortise_core::backend::MountBackend;
use mortise_core::component::{Attributes, Component, ComponentRef, ContentKind, RootHost};
use mortise_core::config::MountConfig;
use mortise_core::id::{OutputId, TransitionKey, TreeId};
use mortise_core::layout::{LayoutResult, RenderOutput, VisibilityHandlers, VisibilityOutput};
use mortise_core::mount::MountState;
use mortise_core::trace::{
    CompletionEvent, ItemChange, MountTraceSink, PassBeginEvent, PassEndEvent, PrepareEvent,
    Tracer,
};
use mortise_core::transition::{Transition, TransitionDriver};
use mortise_dataflow::graph::{BindingId, DataFlowGraph, GraphBinding, NodeId};
use mortise_dataflow::node::{OutputOnlyNode, SimpleNode, TimingNode};
use mortise_dataflow::timing::MockTimingSource;
use mortise_debug::pretty::PrettyPrintSink;
use mortise_debug::recorder::RecorderSink;

const FRAME_COUNT: u32 = 30;
const ROW_COUNT: u64 = 40;
const ROW_HEIGHT: f64 = 60.0;
const WIDTH: f64 = 400.0;
const VIEWPORT_HEIGHT: f64 = 600.0;
const SCROLL_PER_FRAME: f64 = 40.0;
const REMOVE_AT_FRAME: u32 = 10;
const REMOVED_ROW: u64 = 12;
const FADE_MS: u32 = 150;

// -- content ---------------------------------------------------------------

#[derive(Debug)]
struct Row {
    name: String,
}

impl Component for Row {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        ContentKind::ViewContent
    }
}

/// Backend that hands out numbered handles and counts the calls it gets.
#[derive(Debug, Default)]
struct ListBackend {
    next_handle: u32,
    kinds: HashMap<u32, ContentKind>,
    attached: usize,
    bounds_updates: usize,
}

impl ListBackend {
    fn with_root() -> (Self, u32) {
        let mut backend = Self::default();
        backend.kinds.insert(0, ContentKind::HostContainer);
        backend.next_handle = 1;
        (backend, 0)
    }
}

impl MountBackend for ListBackend {
    type Content = u32;

    fn create_content(&mut self, component: &dyn Component) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.kinds.insert(handle, component.kind());
        handle
    }

    fn destroy_content(&mut self, content: u32) {
        self.kinds.remove(&content);
    }

    fn content_kind(&self, content: &u32) -> ContentKind {
        self.kinds
            .get(content)
            .copied()
            .unwrap_or(ContentKind::ViewContent)
    }

    fn mount_content(&mut self, _content: &u32, _component: &dyn Component) {}

    fn unmount_content(&mut self, _content: &u32, _component: &dyn Component) {}

    fn attach(&mut self, _host: &u32, _child: &u32, _index: usize, _bounds: Rect) {
        self.attached += 1;
    }

    fn detach(&mut self, _host: &u32, _child: &u32) {
        self.attached -= 1;
    }

    fn move_child(&mut self, _host: &u32, _child: &u32, _from: usize, _to: usize) {}

    fn apply_bounds(&mut self, _content: &u32, _bounds: Rect, _force: bool) {
        self.bounds_updates += 1;
    }

    fn bind(&mut self, _content: &u32, _component: &dyn Component) {}

    fn unbind(&mut self, _content: &u32, _component: &dyn Component) {}

    fn apply_attributes(&mut self, _content: &u32, _attributes: &Attributes) {}

    fn clear_attributes(&mut self, _content: &u32, _attributes: &Attributes) {}
}

// -- exit animations -------------------------------------------------------

struct Fade {
    binding: BindingId,
    nodes: [NodeId; 3],
}

/// Fades removed rows out over [`FADE_MS`] using a value graph.
struct FadeDriver {
    graph: DataFlowGraph<MockTimingSource>,
    fades: HashMap<TransitionKey, Fade>,
}

impl FadeDriver {
    fn new() -> Self {
        Self {
            graph: DataFlowGraph::new(MockTimingSource::new()),
            fades: HashMap::new(),
        }
    }

    fn start_fade(&mut self, key: &TransitionKey) {
        let timing = self.graph.add_node(TimingNode::new(FADE_MS));
        let alpha = self.graph.add_node(SimpleNode::new(|t| 1.0 - t));
        let out = self.graph.add_node(OutputOnlyNode::new());
        let mut binding = GraphBinding::new();
        binding.connect(timing, alpha).connect(alpha, out);
        match binding.activate(&mut self.graph) {
            Ok(binding) => {
                self.fades.insert(
                    key.clone(),
                    Fade {
                        binding,
                        nodes: [timing, alpha, out],
                    },
                );
            }
            Err(err) => eprintln!("fade for {} not started: {err}", key.as_str()),
        }
    }

    /// Advances one frame and returns the keys whose fade finished.
    fn tick(&mut self) -> Vec<TransitionKey> {
        self.graph.run_frames(1);
        let finished: Vec<TransitionKey> = self
            .fades
            .iter()
            .filter(|(_, fade)| !self.graph.is_active(fade.binding))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &finished {
            if let Some(fade) = self.fades.remove(key) {
                for node in fade.nodes {
                    let _ = self.graph.remove_node(node);
                }
            }
        }
        finished
    }
}

impl TransitionDriver<u32> for FadeDriver {
    fn setup_transitions(
        &mut self,
        previous: Option<&LayoutResult>,
        next: &LayoutResult,
        _explicit: &[Transition],
    ) {
        let Some(previous) = previous else {
            return;
        };
        let removed: Vec<TransitionKey> = previous
            .transition_keys()
            .filter(|key| next.position_for_key(key).is_none() && !self.fades.contains_key(*key))
            .cloned()
            .collect();
        for key in &removed {
            self.start_fade(key);
        }
    }

    fn is_key_animating(&self, key: &TransitionKey) -> bool {
        self.fades.contains_key(key)
    }

    fn is_key_disappearing(&self, key: &TransitionKey) -> bool {
        self.fades.contains_key(key)
    }

    fn set_mount_content(&mut self, _key: &TransitionKey, _content: Option<&u32>) {}

    fn run_transitions(&mut self) {}

    fn reset(&mut self) {
        for (_, fade) in self.fades.drain() {
            let _ = self.graph.deactivate(fade.binding);
            for node in fade.nodes {
                let _ = self.graph.remove_node(node);
            }
        }
    }
}

// -- tracing ---------------------------------------------------------------

/// Forwards every event to both sinks.
struct Sinks {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl MountTraceSink for Sinks {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.pretty.on_prepare(e);
        self.recorder.on_prepare(e);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.pretty.on_pass_end(e);
        self.recorder.on_pass_end(e);
    }

    fn on_completions(&mut self, e: &CompletionEvent) {
        self.pretty.on_completions(e);
        self.recorder.on_completions(e);
    }

    fn on_item_changes(&mut self, pass_index: u64, changes: &[ItemChange]) {
        self.pretty.on_item_changes(pass_index, changes);
        self.recorder.on_item_changes(pass_index, changes);
    }
}

// -- layout ----------------------------------------------------------------

fn build_layout(skip: Option<u64>) -> Rc<LayoutResult> {
    let rows: Vec<u64> = (1..=ROW_COUNT).filter(|&r| Some(r) != skip).collect();
    let height = ROW_COUNT as f64 * ROW_HEIGHT;

    let root: ComponentRef = Rc::new(RootHost);
    let mut outputs = vec![RenderOutput::root(Rect::new(0.0, 0.0, WIDTH, height), root)];
    let mut visibility = Vec::with_capacity(rows.len());
    for &row in &rows {
        let top = (row - 1) as f64 * ROW_HEIGHT;
        let bounds = Rect::new(0.0, top, WIDTH, top + ROW_HEIGHT);
        let name = format!("row{row}");
        let key = TransitionKey::new(&name);
        let component: ComponentRef = Rc::new(Row { name });
        outputs.push(
            RenderOutput::new(OutputId(row), OutputId::ROOT, bounds, component)
                .with_transition_key(key),
        );
        visibility.push(VisibilityOutput::new(row, bounds, VisibilityHandlers::ALL));
    }

    let layout = LayoutResult::new(TreeId(1), outputs).expect("demo layout is well formed");
    Rc::new(
        layout
            .with_transition_context(true)
            .with_visibility_outputs(visibility),
    )
}

fn main() {
    let mut sinks = Sinks {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };

    let (backend, root) = ListBackend::with_root();
    let mut state = MountState::new(backend, FadeDriver::new(), root, MountConfig::production());
    state.set_first_mount_of_tree();

    let full = build_layout(None);
    let trimmed = build_layout(Some(REMOVED_ROW));
    let mut visibility_events = 0;
    let mut scroll_top = 0.0;

    for frame in 0..FRAME_COUNT {
        for key in state.driver_mut().tick() {
            state.on_animation_complete(key);
        }

        let layout = if frame < REMOVE_AT_FRAME {
            &full
        } else {
            &trimmed
        };
        let viewport = Rect::new(0.0, scroll_top, WIDTH, scroll_top + VIEWPORT_HEIGHT);

        let mut tracer = Tracer::new(&mut sinks);
        let outcome = state
            .mount_traced(layout, Some(viewport), true, &mut tracer)
            .expect("mount pass failed");
        visibility_events += outcome.visibility_events.len();

        scroll_top += SCROLL_PER_FRAME;
    }

    let outcome = state.unmount_all().expect("unmount failed");
    println!(
        "Tore down {} items; backend saw {} bounds updates, {} still attached, {visibility_events} visibility events",
        outcome.stats.unmounted,
        state.backend().bounds_updates,
        state.backend().attached,
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "mount_trace.json";
    let file = File::create(path).expect("failed to create mount_trace.json");
    let mut writer = BufWriter::new(file);
    mortise_debug::chrome::export(sinks.recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} passes)");
}
