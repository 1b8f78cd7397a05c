use crate::config::ViewerConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

const SUPPORTED_FLAGS: &str =
    "--config, --scene, --material, --speed, --frames, --fps, --select, --capture, --realtime";

#[derive(Debug, Clone, PartialEq)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub material: Option<PathBuf>,
    pub speed: Option<String>,
    pub frames: u32,
    pub fps: f32,
    pub select: Option<String>,
    pub capture: Option<PathBuf>,
    pub realtime: bool,
}

impl Default for CliOverrides {
    fn default() -> Self {
        Self {
            config: None,
            scene: None,
            material: None,
            speed: None,
            frames: 60,
            fps: 60.0,
            select: None,
            capture: None,
            realtime: false,
        }
    }
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Supported flags: {SUPPORTED_FLAGS}.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "scene" => overrides.scene = Some(PathBuf::from(value)),
                "material" => overrides.material = Some(PathBuf::from(value)),
                "speed" => overrides.speed = Some(value),
                "frames" => {
                    overrides.frames = value.parse::<u32>().with_context(|| format!("Invalid frames '{value}'"))?;
                }
                "fps" => {
                    let fps = value.parse::<f32>().with_context(|| format!("Invalid fps '{value}'"))?;
                    if !(fps.is_finite() && fps > 0.0) {
                        bail!("Invalid fps '{value}'. Use a positive number.");
                    }
                    overrides.fps = fps;
                }
                "select" => overrides.select = Some(value),
                "capture" => overrides.capture = Some(PathBuf::from(value)),
                "realtime" => overrides.realtime = parse_bool_flag("realtime", &value)?,
                _ => bail!("Unknown flag '{flag}'. Supported flags: {SUPPORTED_FLAGS}."),
            }
        }
        Ok(overrides)
    }

    pub fn config_overrides(&self) -> ViewerConfigOverrides {
        ViewerConfigOverrides {
            source: self.scene.clone(),
            material: self.material.clone(),
            speed: self.speed.clone(),
        }
    }

    pub fn frame_delta(&self) -> f32 {
        1.0 / self.fps
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scene_speed_and_frames() {
        let args = ["viewer", "--scene", "fixtures/gearbox.gltf", "--speed", "75", "--frames", "20"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.scene, Some(PathBuf::from("fixtures/gearbox.gltf")));
        assert_eq!(overrides.speed.as_deref(), Some("75"));
        assert_eq!(overrides.frames, 20);
        assert_eq!(overrides.fps, 60.0);
        assert!(!overrides.realtime);
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["viewer", "--select", "Shell", "--select", "BigGear", "--realtime", "on", "--realtime", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.select.as_deref(), Some("BigGear"));
        assert!(!overrides.realtime);
    }

    #[test]
    fn speed_text_is_passed_through_unparsed() {
        let overrides = CliOverrides::parse(["viewer", "--speed", "fast"]).expect("parse overrides");
        let config = overrides.config_overrides();
        assert_eq!(config.speed.as_deref(), Some("fast"));
        assert_eq!(config.applied_fields(), vec!["speed"]);
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["viewer", "--frames"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_bad_numbers_and_unknown_flags() {
        assert!(CliOverrides::parse(["viewer", "--fps", "0"]).is_err());
        assert!(CliOverrides::parse(["viewer", "--frames", "-3"]).is_err());
        let err = CliOverrides::parse(["viewer", "--width", "800"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
    }
}
