use crate::assets::{load_scene, AssetSource};
use crate::capture::{CaptureTrigger, FrameCapture};
use crate::config::ViewerConfig;
use crate::ecs::{AnimationTargets, DriveSpeed, NodeId, OscillationSample, SceneGraph, SceneNode};
use crate::events::{EventBus, ViewerEvent};
use crate::projection::{project, ProjectionRules, RenderList};
use crate::scene::SceneDescription;
use crate::selection::{SelectionChange, SelectionController, SelectionSource};
use crate::time::BlinkTimer;
use crate::tree::{synthesize, DisplayTreeNode, SelectionMap, Synthesis};
use crate::visuals::{visuals_for, NodeVisual};
use anyhow::Result;
use std::time::Duration;

/// What one frame tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub rotation_step: f32,
    /// Rotating nodes present and advanced this frame.
    pub spun: u32,
    /// `None` when the oscillating node is absent from the scene.
    pub oscillation: Option<OscillationSample>,
    pub blink_lit: bool,
    pub blink_flips: u64,
}

/// Single-threaded viewer core: owns the loaded scene and every piece of per-scene state,
/// and exposes plain commands for the frame loop and UI event dispatcher.
pub struct Viewer {
    config: ViewerConfig,
    graph: SceneGraph,
    selection: SelectionMap,
    controller: SelectionController,
    display: DisplayTreeNode,
    targets: AnimationTargets,
    speed: DriveSpeed,
    blink: BlinkTimer,
    blink_origin: Option<Duration>,
    capture: CaptureTrigger,
    events: EventBus,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let speed = DriveSpeed::parse(config.speed_text());
        let blink = BlinkTimer::new(config.animation.blink_interval());
        let mut viewer = Self {
            config,
            graph: SceneGraph::empty(),
            selection: SelectionMap::new(),
            controller: SelectionController::new(),
            display: DisplayTreeNode::placeholder(),
            targets: AnimationTargets::default(),
            speed,
            blink,
            blink_origin: None,
            capture: CaptureTrigger::default(),
            events: EventBus::default(),
        };
        viewer.install(SceneGraph::empty());
        viewer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn targets(&self) -> &AnimationTargets {
        &self.targets
    }

    /// Replaces the loaded scene wholesale. Selection, animation state and the blink
    /// timer start over; nothing carries across from the previous snapshot.
    pub fn load_snapshot(&mut self, graph: SceneGraph) {
        self.install(graph);
        log::info!(
            "[scene] loaded {} nodes ({} rotating, oscillating: {})",
            self.graph.len(),
            self.targets.rotating.len(),
            self.targets.oscillating.is_some()
        );
        self.events.push(ViewerEvent::SceneLoaded {
            nodes: self.graph.len(),
            rotating: self.targets.rotating.len(),
            oscillating: self.targets.oscillating.is_some(),
        });
    }

    pub fn load_description(&mut self, scene: &SceneDescription) {
        self.load_snapshot(SceneGraph::from_description(scene));
    }

    /// Decodes the asset fully before touching the current scene; a failed load leaves
    /// the viewer as it was.
    pub fn load_asset(&mut self, source: &AssetSource) -> Result<()> {
        let scene = load_scene(source)?;
        self.load_description(&scene);
        Ok(())
    }

    fn install(&mut self, mut graph: SceneGraph) {
        graph.set_animation_params(self.config.animation.params());
        graph.set_speed(self.speed);
        graph.set_placement(self.config.render.placement());
        self.targets = graph.tag_animation_targets(&self.config.tags);
        let Synthesis { selection, display } = synthesize(&graph);
        self.graph = graph;
        self.selection = selection;
        self.display = display;
        self.controller.reset();
        self.blink.reset();
        self.blink_origin = None;
    }

    pub fn display_tree(&self) -> &DisplayTreeNode {
        &self.display
    }

    /// Every known identity in traversal order; the tree widget starts fully expanded.
    pub fn default_expanded(&self) -> Vec<NodeId> {
        self.selection.keys().to_vec()
    }

    pub fn selection(&self) -> &SelectionMap {
        &self.selection
    }

    pub fn current_selection(&self) -> Option<NodeId> {
        self.controller.current()
    }

    pub fn pick(&mut self, id: NodeId) -> SelectionChange {
        let label = self.graph.node_by_id(id).and_then(SceneNode::label);
        let change = self.controller.select_from_pick(&mut self.selection, id, label);
        self.record_selection(change, SelectionSource::Pick);
        change
    }

    /// Picks the first node in traversal order carrying `name`.
    pub fn pick_by_name(&mut self, name: &str) -> SelectionChange {
        match self.graph.find_by_name(name) {
            Some(id) => self.pick(id),
            None => {
                log::warn!("[selection] no node named '{name}' to pick");
                SelectionChange::Ignored
            }
        }
    }

    pub fn tree_select(&mut self, id: NodeId) -> SelectionChange {
        let change = self.controller.select_from_tree(&mut self.selection, id);
        self.record_selection(change, SelectionSource::Tree);
        change
    }

    fn record_selection(&mut self, change: SelectionChange, source: SelectionSource) {
        if let SelectionChange::Changed { previous, current } = change {
            self.events.push(ViewerEvent::SelectionChanged { previous, current, source });
        }
    }

    /// Reads speed text leniently; anything without a leading integer counts as zero.
    pub fn set_speed_text(&mut self, text: &str) -> DriveSpeed {
        let parsed = DriveSpeed::parse_prefix(text);
        if parsed.is_none() && !text.trim().is_empty() {
            log::warn!("[animation] speed '{text}' is not a number; using 0");
        }
        let speed = parsed.unwrap_or_default();
        self.set_speed(speed.0);
        speed
    }

    pub fn set_speed(&mut self, speed: i64) {
        self.speed = DriveSpeed(speed);
        self.graph.set_speed(self.speed);
    }

    pub fn speed(&self) -> DriveSpeed {
        self.speed
    }

    pub fn blink_lit(&self) -> bool {
        self.blink.lit()
    }

    /// Advances one frame: spin, anchored oscillation, transform propagation, then the
    /// blink timer against `wall_elapsed`. The first tick after a load starts the blink clock.
    pub fn tick(&mut self, delta_seconds: f32, wall_elapsed: Duration) -> FrameReport {
        let stats = self.graph.update(delta_seconds);

        let origin = *self.blink_origin.get_or_insert(wall_elapsed);
        let blink_flips = self.blink.sync(wall_elapsed.saturating_sub(origin));
        if blink_flips % 2 == 1 {
            log::debug!("[animation] blink lit={}", self.blink.lit());
            self.events.push(ViewerEvent::BlinkToggled { lit: self.blink.lit() });
        }

        FrameReport {
            rotation_step: stats.rotation_step,
            spun: stats.spun,
            oscillation: stats.oscillation,
            blink_lit: self.blink.lit(),
            blink_flips,
        }
    }

    pub fn project(&self) -> RenderList {
        let rules = ProjectionRules {
            tags: &self.config.tags,
            speed: self.speed,
            pulse_threshold: self.config.animation.pulse_speed_threshold,
            blink_lit: self.blink.lit(),
        };
        project(&self.graph, &self.selection, rules)
    }

    pub fn visuals(&self, list: &RenderList) -> Vec<NodeVisual> {
        visuals_for(list, &self.config.render)
    }

    pub fn capture_frame(&self) -> FrameCapture {
        FrameCapture::from_render_list(&self.project())
    }

    pub fn request_capture(&mut self) {
        self.capture.request();
        self.events.push(ViewerEvent::CaptureRequested);
    }

    pub fn take_capture_request(&mut self) -> bool {
        self.capture.take()
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.events.drain()
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
