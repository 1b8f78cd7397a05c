//! Per-frame renderable list: the scene graph walked in order, each node carrying the
//! decorations a renderer needs. Mapping decorations to materials lives in `visuals`.

use crate::config::TagConfig;
use crate::ecs::{DriveSpeed, NodeId, NodeKind, SceneGraph, Transform3D};
use crate::tree::SelectionMap;
use bevy_ecs::prelude::Entity;
use bitflags::bitflags;
use glam::Mat4;
use serde::Serialize;
use std::sync::Arc;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Decorations: u8 {
        /// Outline-eligible.
        const SELECTED = 1 << 0;
        const WIREFRAME = 1 << 1;
        /// Colour override enabled for this subtree.
        const COLOR_PULSE = 1 << 2;
        /// Colour override visible this frame.
        const PULSE_LIT = 1 << 3;
        /// Alarm icon attached.
        const OVERLAY = 1 << 4;
    }
}

impl Decorations {
    pub fn labels(self) -> Vec<String> {
        self.iter_names().map(|(name, _)| name.to_ascii_lowercase()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationRole {
    Static,
    Rotating,
    Oscillating,
}

#[derive(Clone, Debug)]
pub struct RenderNode {
    pub id: NodeId,
    pub entity: Entity,
    pub name: Arc<str>,
    pub kind: NodeKind,
    pub depth: u32,
    pub parent: Option<usize>,
    pub local: Transform3D,
    pub world: Mat4,
    pub decorations: Decorations,
    pub role: AnimationRole,
}

impl RenderNode {
    pub fn has(&self, flag: Decorations) -> bool {
        self.decorations.contains(flag)
    }
}

/// Nodes in depth-first pre-order; `parent` indexes back into the same list.
#[derive(Clone, Debug, Default)]
pub struct RenderList {
    pub nodes: Vec<RenderNode>,
}

impl RenderList {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderNode> {
        self.nodes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&RenderNode> {
        self.nodes.get(index)
    }

    pub fn find(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.name.as_ref() == name)
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &RenderNode> + '_ {
        self.nodes.iter().filter(move |node| node.parent == Some(index))
    }
}

/// Inputs to one projection pass besides the graph and selection.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionRules<'a> {
    pub tags: &'a TagConfig,
    pub speed: DriveSpeed,
    pub pulse_threshold: i64,
    pub blink_lit: bool,
}

#[derive(Clone, Copy, Default)]
struct Inherited {
    wireframe: bool,
    pulse: bool,
}

struct Projector<'a> {
    graph: &'a SceneGraph,
    selection: &'a SelectionMap,
    rules: ProjectionRules<'a>,
}

impl Projector<'_> {
    fn visit(&self, entity: Entity, parent: Option<usize>, depth: u32, inherited: Inherited, out: &mut Vec<RenderNode>) {
        let Some(node) = self.graph.node(entity) else {
            return;
        };
        let tags = self.rules.tags;

        let mut decorations = Decorations::empty();
        decorations.set(Decorations::SELECTED, self.selection.is_selected(node.id));
        decorations.set(Decorations::WIREFRAME, inherited.wireframe);
        decorations.set(Decorations::COLOR_PULSE, inherited.pulse);
        decorations.set(Decorations::PULSE_LIT, inherited.pulse && self.rules.blink_lit);
        decorations.set(Decorations::OVERLAY, tags.is_alarm(&node.name));

        let role = if self.graph.oscillation_state(entity).is_some() {
            AnimationRole::Oscillating
        } else if self.graph.spin_angle(entity).is_some() {
            AnimationRole::Rotating
        } else {
            AnimationRole::Static
        };

        let index = out.len();
        out.push(RenderNode {
            id: node.id,
            entity,
            name: node.name.clone(),
            kind: node.kind,
            depth,
            parent,
            local: self.graph.transform(entity).unwrap_or_default(),
            world: self.graph.world_transform(entity),
            decorations,
            role,
        });

        let next = Inherited {
            wireframe: inherited.wireframe || tags.is_wireframe(&node.name),
            pulse: inherited.pulse
                || (tags.is_rotating(&node.name) && self.rules.speed.0 > self.rules.pulse_threshold),
        };
        for &child in self.graph.children(entity) {
            self.visit(child, Some(index), depth + 1, next, out);
        }
    }
}

/// Recomputes every node's decorations from the current selection and speed. Children
/// keep their stored order; nothing is filtered out.
pub fn project(graph: &SceneGraph, selection: &SelectionMap, rules: ProjectionRules<'_>) -> RenderList {
    let mut nodes = Vec::with_capacity(graph.len());
    if let Some(root) = graph.root() {
        let projector = Projector { graph, selection, rules };
        projector.visit(root, None, 0, Inherited::default(), &mut nodes);
    }
    RenderList { nodes }
}
