use crate::ecs::{NodeId, NodeKind};
use crate::projection::{AnimationRole, RenderList, RenderNode};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// File name used for screenshots when the host does not pick one.
pub const DEFAULT_FILE: &str = "canvas.png";

/// One-shot screenshot latch. Requests made before the backend consumes one collapse
/// into a single capture.
#[derive(Debug, Default, Clone)]
pub struct CaptureTrigger {
    pending: bool,
}

impl CaptureTrigger {
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Writes a tightly packed RGBA8 frame buffer to a PNG file.
pub fn export_png(path: impl AsRef<Path>, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 {
        bail!("Cannot export an empty {width}x{height} frame to {}", path.display());
    }
    if rgba.len() != expected {
        bail!("Frame buffer holds {} bytes; {width}x{height} RGBA needs {expected}", rgba.len());
    }
    image::save_buffer(path, rgba, width, height, image::ColorType::Rgba8)
        .with_context(|| format!("Failed to write screenshot {}", path.display()))?;
    log::info!("[capture] wrote {}x{} screenshot to {}", width, height, path.display());
    Ok(())
}

/// Deterministic snapshot of one projected frame, used for docs/tests.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameCapture {
    pub nodes: Vec<FrameCaptureNode>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameCaptureNode {
    pub id: NodeId,
    pub name: String,
    pub depth: u32,
    pub kind: NodeKind,
    pub decorations: Vec<String>,
    pub role: AnimationRole,
    pub translation: [f32; 3],
}

impl From<&RenderNode> for FrameCaptureNode {
    fn from(node: &RenderNode) -> Self {
        Self {
            id: node.id,
            name: node.name.to_string(),
            depth: node.depth,
            kind: node.kind,
            decorations: node.decorations.labels(),
            role: node.role,
            translation: round3(node.world.w_axis.truncate().to_array()),
        }
    }
}

impl FrameCapture {
    pub fn from_render_list(list: &RenderList) -> Self {
        Self { nodes: list.iter().map(FrameCaptureNode::from).collect() }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize frame capture")
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).with_context(|| format!("Failed to write frame capture {}", path.display()))?;
        Ok(())
    }
}

// Rounded so captures diff cleanly across platforms.
fn round3(values: [f32; 3]) -> [f32; 3] {
    values.map(|v| (v * 1_000.0).round() / 1_000.0)
}
