use crate::assets::AssetSource;
use crate::cli::CliOverrides;
use crate::config::ViewerConfig;
use crate::projection::RenderList;
use crate::time::Time;
use crate::viewer::{FrameReport, Viewer};
use anyhow::Result;
use std::fmt::Write as _;
use std::thread;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/viewer.json";

/// Runs the viewer core without a window: load, select, tick `frames` times, then print
/// the display tree and the final projection.
pub fn run_with_overrides(cli: CliOverrides) -> Result<()> {
    let mut config = match cli.config.as_ref() {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        log::info!("[config] command-line overrides: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let mut viewer = Viewer::new(config);
    if viewer.config().asset.source.is_some() {
        let source = AssetSource::from_config(&viewer.config().asset)?;
        viewer.load_asset(&source)?;
    } else {
        log::warn!("[assets] no scene given; running with an empty scene");
    }

    if let Some(name) = cli.select.as_deref() {
        viewer.pick_by_name(name);
    }

    let delta = cli.frame_delta();
    let mut simulated = Duration::ZERO;
    let mut time = Time::new();
    let mut last: Option<FrameReport> = None;
    for _ in 0..cli.frames {
        let (dt, elapsed) = if cli.realtime {
            thread::sleep(Duration::from_secs_f32(delta));
            time.tick();
            (time.delta_seconds(), time.elapsed())
        } else {
            simulated += Duration::from_secs_f32(delta);
            (delta, simulated)
        };
        last = Some(viewer.tick(dt, elapsed));
        for event in viewer.drain_events() {
            log::debug!("[viewer] {event}");
        }
    }
    if let Some(report) = last {
        log::info!(
            "[viewer] {} frames, step {:.5} rad, {} spun, blink lit={}",
            cli.frames,
            report.rotation_step,
            report.spun,
            report.blink_lit
        );
    }

    let list = viewer.project();
    print!("{}", viewer.display_tree().outline());
    print!("{}", summarize(&list));

    if let Some(path) = cli.capture.as_ref() {
        viewer.capture_frame().save_json(path)?;
        log::info!("[capture] frame capture written to {}", path.display());
    }
    Ok(())
}

/// One line per projected node: indentation by depth, name, kind, role and decorations.
pub fn summarize(list: &RenderList) -> String {
    let mut out = String::new();
    for node in list.iter() {
        let name = if node.name.is_empty() { "<unnamed>" } else { node.name.as_ref() };
        let _ = writeln!(
            out,
            "{:indent$}{} [{}] {:?} {}",
            "",
            name,
            node.kind.as_str(),
            node.role,
            node.decorations.labels().join("|"),
            indent = node.depth as usize * 2
        );
    }
    out
}
