use crate::ecs::NodeId;
use crate::tree::SelectionMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Pick,
    Tree,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSource::Pick => f.write_str("pick"),
            SelectionSource::Tree => f.write_str("tree"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The request could not name a selectable node.
    Ignored,
    /// The requested node was already selected.
    Unchanged,
    Changed { previous: Option<NodeId>, current: NodeId },
}

/// Single-selection state machine. Both event paths funnel into one transition so the
/// map holds at most one `true` entry, and that entry is always `current`.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Option<NodeId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Pick from the viewport. Nodes without a usable label are not selectable this way.
    pub fn select_from_pick(&mut self, map: &mut SelectionMap, id: NodeId, label: Option<&str>) -> SelectionChange {
        if label.map_or(true, str::is_empty) {
            return SelectionChange::Ignored;
        }
        self.transition(map, id, SelectionSource::Pick)
    }

    pub fn select_from_tree(&mut self, map: &mut SelectionMap, id: NodeId) -> SelectionChange {
        self.transition(map, id, SelectionSource::Tree)
    }

    fn transition(&mut self, map: &mut SelectionMap, id: NodeId, source: SelectionSource) -> SelectionChange {
        if self.current == Some(id) {
            return SelectionChange::Unchanged;
        }
        if !map.contains(id) {
            log::warn!("[selection] {source} request for unknown node {id} ignored");
            return SelectionChange::Ignored;
        }
        let previous = self.current;
        if let Some(previous) = previous {
            map.set(previous, false);
        }
        map.set(id, true);
        self.current = Some(id);
        log::debug!("[selection] {source}: {previous:?} -> {id}");
        SelectionChange::Changed { previous, current: id }
    }
}
