use crate::config::AssetConfig;
use crate::ecs::NodeKind;
use crate::mesh::MeshBounds;
use crate::scene::{BoundsData, NodeDescription, SceneDescription};
use anyhow::{anyhow, bail, Context, Result};
use glam::{Quat, Vec3};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetFormat {
    Gltf,
    Obj,
    SceneDescription,
}

impl AssetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gltf") | Some("glb") => Ok(AssetFormat::Gltf),
            Some("obj") => Ok(AssetFormat::Obj),
            Some("json") => Ok(AssetFormat::SceneDescription),
            Some(other) => Err(anyhow!("Unsupported asset extension '.{other}' for {}", path.display())),
            None => Err(anyhow!("Asset path {} has no extension", path.display())),
        }
    }
}

/// Asset reference handed to the loader: the main file plus the auxiliary material
/// file the OBJ family needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSource {
    pub main: PathBuf,
    pub material: Option<PathBuf>,
}

impl AssetSource {
    pub fn new(main: impl Into<PathBuf>) -> Self {
        Self { main: main.into(), material: None }
    }

    pub fn with_material(mut self, material: impl Into<PathBuf>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn from_config(config: &AssetConfig) -> Result<Self> {
        let main = config.source.clone().ok_or_else(|| anyhow!("No asset source configured"))?;
        Ok(Self { main, material: config.material.clone() })
    }

    pub fn format(&self) -> Result<AssetFormat> {
        AssetFormat::from_path(&self.main)
    }
}

/// Decodes the source into a complete scene description, or fails without a partial result.
pub fn load_scene(source: &AssetSource) -> Result<SceneDescription> {
    let scene = match source.format()? {
        AssetFormat::Gltf => import_gltf(&source.main)?,
        AssetFormat::SceneDescription => SceneDescription::load(&source.main)?,
        AssetFormat::Obj => {
            let Some(material) = source.material.as_ref() else {
                bail!("OBJ asset {} needs a material file", source.main.display());
            };
            bail!(
                "OBJ import is not available ({} with {}); convert the model to glTF",
                source.main.display(),
                material.display()
            );
        }
    };
    log::info!("[assets] loaded {} ({} nodes)", source.main.display(), scene.node_count());
    Ok(scene)
}

/// Reads the node hierarchy of a glTF file. Roots of the chosen scene are wrapped in one
/// group named after that scene.
pub fn import_gltf(path: impl AsRef<Path>) -> Result<SceneDescription> {
    let path_ref = path.as_ref();
    let (document, _buffers, _images) =
        gltf::import(path_ref).with_context(|| format!("Failed to import GLTF from {}", path_ref.display()))?;

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!("[assets] GLTF '{}' contains no scenes", path_ref.display());
        return Ok(SceneDescription::default());
    };
    if document.scenes().len() > 1 {
        log::warn!(
            "[assets] GLTF '{}' contains multiple scenes; only '{}' will be imported.",
            path_ref.display(),
            scene.name().unwrap_or("")
        );
    }

    let children = scene.nodes().map(|node| describe_node(&node)).collect();
    Ok(SceneDescription::new(NodeDescription::group(scene.name().unwrap_or(""), children)))
}

fn describe_node(node: &gltf::Node<'_>) -> NodeDescription {
    let (t, r, s) = node.transform().decomposed();
    let children: Vec<NodeDescription> = node.children().map(|child| describe_node(&child)).collect();
    let bounds = node.mesh().and_then(|mesh| mesh_bounds(&mesh));
    let kind = if node.mesh().is_some() && children.is_empty() { NodeKind::Leaf } else { NodeKind::Group };
    NodeDescription {
        id: None,
        name: node.name().unwrap_or("").to_string(),
        kind: Some(kind),
        translation: Vec3::from_array(t).into(),
        rotation: Quat::from_xyzw(r[0], r[1], r[2], r[3]).normalize().into(),
        scale: Vec3::from_array(s).into(),
        bounds: bounds.map(|b| BoundsData { min: b.min.into(), max: b.max.into() }),
        children,
    }
}

fn mesh_bounds(mesh: &gltf::Mesh<'_>) -> Option<MeshBounds> {
    mesh.primitives()
        .filter_map(|primitive| {
            let accessor = primitive.get(&gltf::Semantic::Positions)?;
            let min = vec3_from_json(accessor.min())?;
            let max = vec3_from_json(accessor.max())?;
            Some(MeshBounds::from_min_max(min, max))
        })
        .reduce(|a, b| a.union(&b))
}

fn vec3_from_json(value: Option<gltf::json::Value>) -> Option<Vec3> {
    let value = value?;
    let components: Vec<f32> =
        value.as_array()?.iter().map(|v| v.as_f64().map(|f| f as f32)).collect::<Option<_>>()?;
    match components.as_slice() {
        [x, y, z] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}
