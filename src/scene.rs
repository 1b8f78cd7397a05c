use crate::ecs::NodeKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Already-decoded scene hierarchy, as handed over by an asset importer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<NodeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub translation: Vec3Data,
    #[serde(default)]
    pub rotation: QuatData,
    #[serde(default = "Vec3Data::one")]
    pub scale: Vec3Data,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
}

impl Default for NodeDescription {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            kind: None,
            translation: Vec3Data::default(),
            rotation: QuatData::default(),
            scale: Vec3Data::one(),
            bounds: None,
            children: Vec::new(),
        }
    }
}

impl NodeDescription {
    pub fn group(name: impl Into<String>, children: Vec<NodeDescription>) -> Self {
        Self { name: name.into(), kind: Some(NodeKind::Group), children, ..Default::default() }
    }

    pub fn leaf(name: impl Into<String>, min: glam::Vec3, max: glam::Vec3) -> Self {
        Self {
            name: name.into(),
            kind: Some(NodeKind::Leaf),
            bounds: Some(BoundsData { min: min.into(), max: max.into() }),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: glam::Vec3) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_rotation(mut self, rotation: glam::Quat) -> Self {
        self.rotation = rotation.into();
        self
    }

    pub fn with_scale(mut self, scale: glam::Vec3) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn with_bounds(mut self, min: glam::Vec3, max: glam::Vec3) -> Self {
        self.bounds = Some(BoundsData { min: min.into(), max: max.into() });
        self
    }

    /// Leaves never carry children; a declared leaf with children is read as a group.
    pub fn resolved_kind(&self) -> NodeKind {
        if !self.children.is_empty() {
            return NodeKind::Group;
        }
        match self.kind {
            Some(kind) => kind,
            None if self.bounds.is_some() => NodeKind::Leaf,
            None => NodeKind::Group,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeDescription::node_count).sum::<usize>()
    }
}

impl SceneDescription {
    pub fn new(root: NodeDescription) -> Self {
        Self { root: Some(root) }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let scene = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))?;
        Ok(scene)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize scene")?;
        fs::write(path, json).with_context(|| format!("Failed to write scene file {}", path.display()))?;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, NodeDescription::node_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsData {
    pub min: Vec3Data,
    pub max: Vec3Data,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Data {
    fn one() -> Self {
        Self { x: 1.0, y: 1.0, z: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuatData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for QuatData {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

impl From<glam::Quat> for QuatData {
    fn from(value: glam::Quat) -> Self {
        Self { x: value.x, y: value.y, z: value.z, w: value.w }
    }
}

impl From<QuatData> for glam::Quat {
    fn from(value: QuatData) -> Self {
        glam::Vec4::new(value.x, value.y, value.z, value.w).try_normalize().map(glam::Quat::from_vec4).unwrap_or(glam::Quat::IDENTITY)
    }
}
