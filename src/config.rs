use crate::ecs::{AnimationParams, Axis};
use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AssetConfig {
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub material: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "AnimationConfig::default_rotation_axis")]
    pub rotation_axis: Axis,
    #[serde(default = "AnimationConfig::default_rotation_factor")]
    pub rotation_factor: f32,
    #[serde(default = "AnimationConfig::default_oscillation_axis")]
    pub oscillation_axis: Axis,
    #[serde(default = "AnimationConfig::default_scale_lower")]
    pub scale_lower: f32,
    #[serde(default = "AnimationConfig::default_scale_upper")]
    pub scale_upper: f32,
    #[serde(default = "AnimationConfig::default_scale_step")]
    pub scale_step: f32,
    #[serde(default = "AnimationConfig::default_blink_interval_ms")]
    pub blink_interval_ms: u64,
    #[serde(default = "AnimationConfig::default_pulse_speed_threshold")]
    pub pulse_speed_threshold: i64,
}

/// Fixed node-name sets that opt nodes into animation and decoration rules.
#[derive(Debug, Clone, Deserialize)]
pub struct TagConfig {
    #[serde(default = "TagConfig::default_rotating")]
    pub rotating: Vec<String>,
    #[serde(default = "TagConfig::default_oscillating")]
    pub oscillating: String,
    #[serde(default = "TagConfig::default_alarm")]
    pub alarm: Vec<String>,
    #[serde(default = "TagConfig::default_wireframe")]
    pub wireframe: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_model_offset")]
    pub model_offset: [f32; 3],
    #[serde(default = "RenderConfig::default_outline_color")]
    pub outline_color: u32,
    #[serde(default = "RenderConfig::default_wireframe_opacity")]
    pub wireframe_opacity: f32,
    #[serde(default = "RenderConfig::default_pulse_color")]
    pub pulse_color: [f32; 3],
    #[serde(default = "RenderConfig::default_pulse_roughness")]
    pub pulse_roughness: f32,
    #[serde(default = "RenderConfig::default_pulse_metalness")]
    pub pulse_metalness: f32,
    #[serde(default = "RenderConfig::default_background")]
    pub background: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub tags: TagConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewerConfigOverrides {
    pub source: Option<PathBuf>,
    pub material: Option<PathBuf>,
    pub speed: Option<String>,
}

impl AnimationConfig {
    fn default_rotation_axis() -> Axis {
        Axis::X
    }

    const fn default_rotation_factor() -> f32 {
        0.03
    }

    fn default_oscillation_axis() -> Axis {
        Axis::Y
    }

    const fn default_scale_lower() -> f32 {
        1.0
    }

    const fn default_scale_upper() -> f32 {
        2.0
    }

    const fn default_scale_step() -> f32 {
        0.05
    }

    const fn default_blink_interval_ms() -> u64 {
        500
    }

    const fn default_pulse_speed_threshold() -> i64 {
        50
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    pub fn params(&self) -> AnimationParams {
        let lower = self.scale_lower.min(self.scale_upper);
        let upper = self.scale_lower.max(self.scale_upper);
        AnimationParams {
            rotation_axis: self.rotation_axis,
            rotation_factor: self.rotation_factor,
            oscillation_axis: self.oscillation_axis,
            scale_lower: lower,
            scale_upper: upper,
            scale_step: self.scale_step.abs(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_axis: Self::default_rotation_axis(),
            rotation_factor: Self::default_rotation_factor(),
            oscillation_axis: Self::default_oscillation_axis(),
            scale_lower: Self::default_scale_lower(),
            scale_upper: Self::default_scale_upper(),
            scale_step: Self::default_scale_step(),
            blink_interval_ms: Self::default_blink_interval_ms(),
            pulse_speed_threshold: Self::default_pulse_speed_threshold(),
        }
    }
}

impl TagConfig {
    fn default_rotating() -> Vec<String> {
        vec!["BigGear".to_string(), "SmallBottomGear".to_string()]
    }

    fn default_oscillating() -> String {
        "MiddleBottomGear".to_string()
    }

    fn default_alarm() -> Vec<String> {
        vec!["BigGear".to_string(), "MiddleBottomGear".to_string()]
    }

    fn default_wireframe() -> String {
        "Shell".to_string()
    }

    // Empty names never match: unnamed nodes stay out of every tagged set.
    fn matches(name: &str, candidate: &str) -> bool {
        !name.is_empty() && name == candidate
    }

    pub fn is_rotating(&self, name: &str) -> bool {
        self.rotating.iter().any(|candidate| Self::matches(name, candidate))
    }

    pub fn is_oscillating(&self, name: &str) -> bool {
        Self::matches(name, &self.oscillating)
    }

    pub fn is_alarm(&self, name: &str) -> bool {
        self.alarm.iter().any(|candidate| Self::matches(name, candidate))
    }

    pub fn is_wireframe(&self, name: &str) -> bool {
        Self::matches(name, &self.wireframe)
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            rotating: Self::default_rotating(),
            oscillating: Self::default_oscillating(),
            alarm: Self::default_alarm(),
            wireframe: Self::default_wireframe(),
        }
    }
}

impl RenderConfig {
    fn default_model_offset() -> [f32; 3] {
        [0.0, -0.18856, -0.2855]
    }

    const fn default_outline_color() -> u32 {
        0x15C5E8
    }

    const fn default_wireframe_opacity() -> f32 {
        0.1
    }

    fn default_pulse_color() -> [f32; 3] {
        [1.0, 0.0, 0.0]
    }

    const fn default_pulse_roughness() -> f32 {
        0.2
    }

    const fn default_pulse_metalness() -> f32 {
        1.0
    }

    fn default_background() -> String {
        "#f5efe6".to_string()
    }

    pub fn placement(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.model_offset))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            model_offset: Self::default_model_offset(),
            outline_color: Self::default_outline_color(),
            wireframe_opacity: Self::default_wireframe_opacity(),
            pulse_color: Self::default_pulse_color(),
            pulse_roughness: Self::default_pulse_roughness(),
            pulse_metalness: Self::default_pulse_metalness(),
            background: Self::default_background(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ViewerConfigOverrides) {
        if let Some(source) = overrides.source.as_ref() {
            self.asset.source = Some(source.clone());
        }
        if let Some(material) = overrides.material.as_ref() {
            self.asset.material = Some(material.clone());
        }
        if let Some(speed) = overrides.speed.as_ref() {
            self.speed = Some(speed.clone());
        }
    }

    pub fn speed_text(&self) -> &str {
        self.speed.as_deref().unwrap_or("0")
    }
}

impl ViewerConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.material.is_none() && self.speed.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.source.is_some() {
            fields.push("source");
        }
        if self.material.is_some() {
            fields.push("material");
        }
        if self.speed.is_some() {
            fields.push("speed");
        }
        fields
    }
}
