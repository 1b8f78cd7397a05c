use crate::ecs::NodeId;
use crate::selection::SelectionSource;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SceneLoaded { nodes: usize, rotating: usize, oscillating: bool },
    SelectionChanged { previous: Option<NodeId>, current: NodeId, source: SelectionSource },
    BlinkToggled { lit: bool },
    CaptureRequested,
}

impl fmt::Display for ViewerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerEvent::SceneLoaded { nodes, rotating, oscillating } => {
                write!(f, "SceneLoaded nodes={nodes} rotating={rotating} oscillating={oscillating}")
            }
            ViewerEvent::SelectionChanged { previous, current, source } => match previous {
                Some(previous) => write!(f, "SelectionChanged {previous} -> {current} via {source}"),
                None => write!(f, "SelectionChanged none -> {current} via {source}"),
            },
            ViewerEvent::BlinkToggled { lit } => write!(f, "BlinkToggled lit={lit}"),
            ViewerEvent::CaptureRequested => f.write_str("CaptureRequested"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<ViewerEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: ViewerEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
