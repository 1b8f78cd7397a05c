use crate::config::RenderConfig;
use crate::ecs::{NodeId, NodeKind};
use crate::projection::{Decorations, RenderList, RenderNode};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialOverride {
    Wireframe { opacity: f32 },
    Pulse { color: [f32; 3], roughness: f32, metalness: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayIcon {
    Alarm,
}

/// Backend-facing description of how one node should be drawn this frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeVisual {
    pub id: NodeId,
    /// Outline colour as `0xRRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayIcon>,
}

impl NodeVisual {
    pub fn is_plain(&self) -> bool {
        self.outline.is_none() && self.material.is_none() && self.overlay.is_none()
    }
}

pub fn visual_for(node: &RenderNode, render: &RenderConfig) -> NodeVisual {
    let outline = node.has(Decorations::SELECTED).then_some(render.outline_color);
    let material = if node.kind != NodeKind::Leaf {
        None
    } else if node.has(Decorations::WIREFRAME) {
        Some(MaterialOverride::Wireframe { opacity: render.wireframe_opacity })
    } else if node.has(Decorations::COLOR_PULSE | Decorations::PULSE_LIT) {
        Some(MaterialOverride::Pulse {
            color: render.pulse_color,
            roughness: render.pulse_roughness,
            metalness: render.pulse_metalness,
        })
    } else {
        None
    };
    let overlay = node.has(Decorations::OVERLAY).then_some(OverlayIcon::Alarm);
    NodeVisual { id: node.id, outline, material, overlay }
}

/// One entry per projected node, in projection order.
pub fn visuals_for(list: &RenderList, render: &RenderConfig) -> Vec<NodeVisual> {
    list.iter().map(|node| visual_for(node, render)).collect()
}
