//! Selection-state map and display tree derived from a loaded scene graph.

use crate::ecs::{NodeId, SceneGraph};
use bevy_ecs::prelude::Entity;
use serde::Serialize;
use std::collections::HashMap;

/// Label shown for an unnamed root and for the placeholder of an empty scene.
pub const ROOT_LABEL: &str = "Root";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTreeNode {
    pub id: NodeId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DisplayTreeNode>>,
}

impl DisplayTreeNode {
    pub fn placeholder() -> Self {
        Self { id: NodeId::PLACEHOLDER, label: ROOT_LABEL.to_string(), children: None }
    }

    pub fn children(&self) -> &[DisplayTreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Pre-order search by identity.
    pub fn find(&self, id: NodeId) -> Option<&DisplayTreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn count(&self) -> usize {
        1 + self.children().iter().map(DisplayTreeNode::count).sum::<usize>()
    }

    /// Indented multi-line rendering, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(if self.label.is_empty() { "<unnamed>" } else { self.label.as_str() });
        out.push('\n');
        for child in self.children() {
            child.write_outline(depth + 1, out);
        }
    }
}

/// Per-node "is selected" flags. Keys keep their discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionMap {
    order: Vec<NodeId>,
    flags: HashMap<NodeId, bool>,
}

impl SelectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` as unselected. Re-registering a known id leaves its flag untouched.
    pub fn register(&mut self, id: NodeId) {
        if !self.flags.contains_key(&id) {
            self.flags.insert(id, false);
            self.order.push(id);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.flags.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<bool> {
        self.flags.get(&id).copied()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.get(id).unwrap_or(false)
    }

    /// Updates a known entry; unknown ids are left out of the map.
    pub fn set(&mut self, id: NodeId, selected: bool) -> bool {
        match self.flags.get_mut(&id) {
            Some(flag) => {
                *flag = selected;
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied().filter(|id| self.is_selected(*id))
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }
}

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub selection: SelectionMap,
    pub display: DisplayTreeNode,
}

/// Walks the graph once, depth-first in stored child order, registering every node as
/// unselected and mirroring names into a display tree. Transforms are not touched.
pub fn synthesize(graph: &SceneGraph) -> Synthesis {
    let mut selection = SelectionMap::new();
    let display = match graph.root() {
        Some(root) => synthesize_node(graph, root, true, &mut selection),
        None => DisplayTreeNode::placeholder(),
    };
    Synthesis { selection, display }
}

fn synthesize_node(graph: &SceneGraph, entity: Entity, is_root: bool, selection: &mut SelectionMap) -> DisplayTreeNode {
    let (id, name) = match graph.node(entity) {
        Some(node) => (node.id, node.name.to_string()),
        None => (NodeId::PLACEHOLDER, String::new()),
    };
    selection.register(id);
    let label = if name.is_empty() && is_root { ROOT_LABEL.to_string() } else { name };
    let children = graph.children(entity);
    if children.is_empty() {
        return DisplayTreeNode { id, label, children: None };
    }
    let children = children.iter().map(|&child| synthesize_node(graph, child, false, selection)).collect();
    DisplayTreeNode { id, label, children: Some(children) }
}
