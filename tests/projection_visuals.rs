use gearbox_viewer::config::ViewerConfig;
use gearbox_viewer::ecs::NodeKind;
use gearbox_viewer::projection::{AnimationRole, Decorations};
use gearbox_viewer::scene::{NodeDescription, SceneDescription};
use gearbox_viewer::visuals::{MaterialOverride, OverlayIcon};
use gearbox_viewer::Viewer;
use glam::Vec3;
use std::time::Duration;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/gearbox.scene.json");

fn loaded_viewer() -> Viewer {
    let scene = SceneDescription::load(FIXTURE).expect("fixture scene should load");
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_description(&scene);
    viewer
}

/// Ticks at 100 ms until the blink reaches `lit`.
fn tick_until_blink(viewer: &mut Viewer, lit: bool) {
    for step in 0..20u64 {
        viewer.tick(0.1, Duration::from_millis(step * 100));
        if viewer.blink_lit() == lit {
            return;
        }
    }
    panic!("blink never reached lit={lit}");
}

#[test]
fn shell_chain_is_wireframe_regardless_of_siblings() {
    let scene = SceneDescription::new(NodeDescription::group(
        "",
        vec![
            NodeDescription::group("Shell", vec![NodeDescription::leaf("Pane", Vec3::ZERO, Vec3::ONE)]),
            NodeDescription::group("Sibling", vec![NodeDescription::leaf("Other", Vec3::ZERO, Vec3::ONE)]),
        ],
    ));
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_description(&scene);
    let list = viewer.project();
    assert!(list.by_name("Pane").expect("pane").has(Decorations::WIREFRAME));
    assert!(!list.by_name("Other").expect("other").has(Decorations::WIREFRAME));

    let visuals = viewer.visuals(&list);
    let pane = list.by_name("Pane").expect("pane");
    let visual = visuals.iter().find(|visual| visual.id == pane.id).expect("pane visual");
    assert_eq!(visual.material, Some(MaterialOverride::Wireframe { opacity: 0.1 }));
}

#[test]
fn every_node_is_projected_in_stored_order() {
    let viewer = loaded_viewer();
    let list = viewer.project();
    let names: Vec<&str> = list.iter().map(|node| node.name.as_ref()).collect();
    assert_eq!(
        names,
        vec!["", "Shell", "ShellPanel", "BigGear", "BigGearTeeth", "SmallBottomGear", "MiddleBottomGear", ""]
    );
    assert_eq!(list.get(0).map(|node| node.kind), Some(NodeKind::Group));
    assert_eq!(list.by_name("BigGear").map(|node| node.role), Some(AnimationRole::Rotating));
    assert_eq!(list.by_name("MiddleBottomGear").map(|node| node.role), Some(AnimationRole::Oscillating));
    assert_eq!(list.by_name("Shell").map(|node| node.role), Some(AnimationRole::Static));
}

#[test]
fn alarm_overlays_follow_names_only() {
    let viewer = loaded_viewer();
    let list = viewer.project();
    let overlaid: Vec<&str> =
        list.iter().filter(|node| node.has(Decorations::OVERLAY)).map(|node| node.name.as_ref()).collect();
    assert_eq!(overlaid, vec!["BigGear", "MiddleBottomGear"]);
    let visuals = viewer.visuals(&list);
    assert_eq!(visuals.iter().filter(|visual| visual.overlay == Some(OverlayIcon::Alarm)).count(), 2);
    let unnamed_leaf = list.get(list.len() - 1).expect("unnamed leaf");
    assert!(unnamed_leaf.decorations.is_empty());
}

#[test]
fn pulse_applies_below_rotating_nodes_when_fast_and_lit() {
    let mut viewer = loaded_viewer();
    viewer.set_speed_text("75");
    tick_until_blink(&mut viewer, true);
    let list = viewer.project();
    let teeth = list.by_name("BigGearTeeth").expect("teeth");
    assert!(teeth.has(Decorations::COLOR_PULSE | Decorations::PULSE_LIT));
    assert!(!list.by_name("SmallBottomGear").expect("small gear").has(Decorations::COLOR_PULSE));
    assert!(!list.by_name("ShellPanel").expect("panel").has(Decorations::COLOR_PULSE));

    let visuals = viewer.visuals(&list);
    let visual = visuals.iter().find(|visual| visual.id == teeth.id).expect("teeth visual");
    assert!(matches!(visual.material, Some(MaterialOverride::Pulse { color, .. }) if color == [1.0, 0.0, 0.0]));

    tick_until_blink(&mut viewer, false);
    let dark = viewer.project();
    let teeth = dark.by_name("BigGearTeeth").expect("teeth");
    assert!(teeth.has(Decorations::COLOR_PULSE));
    assert!(!teeth.has(Decorations::PULSE_LIT));
}

#[test]
fn slow_speed_never_pulses() {
    let mut viewer = loaded_viewer();
    viewer.set_speed(50);
    tick_until_blink(&mut viewer, true);
    let list = viewer.project();
    assert!(list.iter().all(|node| !node.has(Decorations::COLOR_PULSE)));
}

#[test]
fn selection_outlines_one_node() {
    let mut viewer = loaded_viewer();
    let shell = viewer.graph().find_by_name("Shell").expect("shell");
    viewer.tree_select(shell);
    let list = viewer.project();
    let visuals = viewer.visuals(&list);
    let outlined: Vec<_> = visuals.iter().filter(|visual| visual.outline.is_some()).collect();
    assert_eq!(outlined.len(), 1);
    assert_eq!(outlined[0].id, shell);
    assert_eq!(outlined[0].outline, Some(0x15C5E8));
    assert!(outlined[0].material.is_none(), "groups never take material overrides");
}

#[test]
fn world_matrices_include_model_offset() {
    let viewer = loaded_viewer();
    let list = viewer.project();
    let root = list.get(0).expect("root");
    let offset = root.world.w_axis.truncate();
    assert!((offset - Vec3::new(0.0, -0.18856, -0.2855)).length() < 1e-6);
    let gear = list.by_name("BigGear").expect("gear");
    let gear_origin = gear.world.w_axis.truncate();
    assert!((gear_origin - Vec3::new(0.0, 0.5 - 0.18856, -0.2855)).length() < 1e-5);
}
