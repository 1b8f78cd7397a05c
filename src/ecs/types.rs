use crate::mesh::MeshBounds;
use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a scene node. Survives transform edits, not reloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Identity reported for the synthetic root of an empty scene.
    pub const PLACEHOLDER: NodeId = NodeId(Uuid::nil());

    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_placeholder(self) -> bool {
        self.0.is_nil()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Leaf,
    Group,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Group => "group",
        }
    }
}

#[derive(Component, Clone, Debug)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: Arc<str>,
    pub kind: NodeKind,
}

impl SceneNode {
    /// Name usable for display and tag matching; unnamed nodes report `None`.
    pub fn label(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(self.name.as_ref())
        }
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform3D {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Component, Clone, Copy, Default)]
pub struct WorldTransform3D(pub Mat4);
#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);
#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);

/// Geometry extent in the node's local space.
#[derive(Component, Clone, Debug)]
pub struct LocalBounds(pub MeshBounds);

/// Marks a node driven by continuous rotation. `angle` accumulates every applied step.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Spin {
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillationPhase {
    Growing,
    Shrinking,
}

/// Triangle-wave scale state of the anchored oscillating node.
#[derive(Component, Clone, Copy, Debug)]
pub struct Oscillator {
    pub base_scale: Vec3,
    pub factor: f32,
    pub phase: OscillationPhase,
}

impl Oscillator {
    pub fn new(base_scale: Vec3, lower: f32) -> Self {
        Self { base_scale, factor: lower, phase: OscillationPhase::Growing }
    }

    /// Moves the factor one step toward the current bound, flipping direction on arrival.
    pub fn advance(&mut self, lower: f32, upper: f32, step: f32) -> f32 {
        let step = step.abs();
        let tolerance = step * 1e-3;
        self.factor = match self.phase {
            OscillationPhase::Growing => (self.factor + step).min(upper),
            OscillationPhase::Shrinking => (self.factor - step).max(lower),
        };
        if self.factor >= upper - tolerance {
            self.factor = upper;
            self.phase = OscillationPhase::Shrinking;
        } else if self.factor <= lower + tolerance {
            self.factor = lower;
            self.phase = OscillationPhase::Growing;
        }
        self.factor
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn get(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Identities of the nodes the animation systems drive, resolved once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationTargets {
    pub rotating: Vec<NodeId>,
    pub oscillating: Option<NodeId>,
}

impl AnimationTargets {
    pub fn is_rotating(&self, id: NodeId) -> bool {
        self.rotating.contains(&id)
    }

    pub fn is_oscillating(&self, id: NodeId) -> bool {
        self.oscillating == Some(id)
    }
}

#[derive(Resource, Clone, Copy)]
pub struct TimeDelta(pub f32);

/// External speed parameter. Text input is read the way a lenient integer prefix parser would.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveSpeed(pub i64);

impl DriveSpeed {
    pub fn parse(text: &str) -> Self {
        Self::parse_prefix(text).unwrap_or_default()
    }

    /// Leading optionally-signed integer of `text`, or `None` when there is none or it
    /// overflows.
    pub fn parse_prefix(text: &str) -> Option<Self> {
        let trimmed = text.trim_start();
        let (sign, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (-1, &trimmed[1..]),
            Some(b'+') => (1, &trimmed[1..]),
            _ => (1, trimmed),
        };
        let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
        if end == 0 {
            return None;
        }
        digits[..end].parse::<i64>().ok().map(|value| DriveSpeed(sign * value))
    }

    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct AnimationParams {
    pub rotation_axis: Axis,
    pub rotation_factor: f32,
    pub oscillation_axis: Axis,
    pub scale_lower: f32,
    pub scale_upper: f32,
    pub scale_step: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            rotation_axis: Axis::X,
            rotation_factor: 0.03,
            oscillation_axis: Axis::Y,
            scale_lower: 1.0,
            scale_upper: 2.0,
            scale_step: 0.05,
        }
    }
}

/// Fixed placement applied above the scene root.
#[derive(Resource, Clone, Copy)]
pub struct ModelPlacement(pub Mat4);

impl Default for ModelPlacement {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillationSample {
    pub factor: f32,
    pub phase: OscillationPhase,
    pub anchor_shift: f32,
}

/// Per-frame bookkeeping written by the animation systems.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub rotation_step: f32,
    pub spun: u32,
    pub oscillation: Option<OscillationSample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_parse_reads_integer_prefix() {
        assert_eq!(DriveSpeed::parse("75"), DriveSpeed(75));
        assert_eq!(DriveSpeed::parse("  42rpm"), DriveSpeed(42));
        assert_eq!(DriveSpeed::parse("12.9"), DriveSpeed(12));
        assert_eq!(DriveSpeed::parse("-8"), DriveSpeed(-8));
    }

    #[test]
    fn speed_parse_falls_back_to_zero() {
        assert_eq!(DriveSpeed::parse(""), DriveSpeed(0));
        assert_eq!(DriveSpeed::parse("fast"), DriveSpeed(0));
        assert_eq!(DriveSpeed::parse("-"), DriveSpeed(0));
        assert_eq!(DriveSpeed::parse("99999999999999999999999"), DriveSpeed(0));
        assert_eq!(DriveSpeed::parse("--5"), DriveSpeed(0));
        assert_eq!(DriveSpeed::parse_prefix("--5"), None);
        assert_eq!(DriveSpeed::parse_prefix("-0"), Some(DriveSpeed(0)));
    }

    #[test]
    fn oscillator_bounces_between_bounds() {
        let mut osc = Oscillator::new(Vec3::ONE, 1.0);
        for _ in 0..19 {
            osc.advance(1.0, 2.0, 0.05);
            assert_eq!(osc.phase, OscillationPhase::Growing);
        }
        assert_eq!(osc.advance(1.0, 2.0, 0.05), 2.0);
        assert_eq!(osc.phase, OscillationPhase::Shrinking);
        for _ in 0..20 {
            osc.advance(1.0, 2.0, 0.05);
        }
        assert_eq!(osc.factor, 1.0);
        assert_eq!(osc.phase, OscillationPhase::Growing);
    }

    #[test]
    fn unnamed_nodes_have_no_label() {
        let node = SceneNode { id: NodeId::new(), name: Arc::from(""), kind: NodeKind::Leaf };
        assert!(node.label().is_none());
        assert!(NodeId::PLACEHOLDER.is_placeholder());
    }
}
