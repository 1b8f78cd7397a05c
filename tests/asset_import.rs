use gearbox_viewer::assets::{import_gltf, AssetSource};
use gearbox_viewer::config::ViewerConfig;
use gearbox_viewer::ecs::NodeKind;
use gearbox_viewer::events::ViewerEvent;
use gearbox_viewer::scene::{NodeDescription, SceneDescription};
use gearbox_viewer::Viewer;
use glam::Vec3;

const GLTF_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/gearbox.gltf");
const SCENE_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/gearbox.scene.json");

fn find<'a>(node: &'a NodeDescription, name: &str) -> Option<&'a NodeDescription> {
    if node.name == name {
        return Some(node);
    }
    node.children.iter().find_map(|child| find(child, name))
}

#[test]
fn gltf_hierarchy_is_wrapped_in_a_scene_group() {
    let scene = import_gltf(GLTF_FIXTURE).expect("fixture glTF should import");
    let root = scene.root.as_ref().expect("scene root");
    assert_eq!(root.name, "Gearbox");
    assert_eq!(root.resolved_kind(), NodeKind::Group);
    let names: Vec<&str> = root.children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, vec!["Shell", "BigGear", "SmallBottomGear", "MiddleBottomGear", ""]);
    assert_eq!(scene.node_count(), 8);
}

#[test]
fn gltf_kinds_and_bounds_are_decided_at_import() {
    let scene = import_gltf(GLTF_FIXTURE).expect("fixture glTF should import");
    let root = scene.root.as_ref().expect("scene root");
    let shell = find(root, "Shell").expect("shell");
    assert_eq!(shell.resolved_kind(), NodeKind::Group);
    assert!(shell.bounds.is_none());

    let panel = find(root, "ShellPanel").expect("panel");
    assert_eq!(panel.resolved_kind(), NodeKind::Leaf);
    let bounds = panel.bounds.as_ref().expect("panel bounds");
    assert_eq!(Vec3::from(bounds.min), Vec3::new(-0.5, -0.5, 0.0));
    assert_eq!(Vec3::from(bounds.max), Vec3::new(0.5, 0.5, 0.0));

    let gear = find(root, "BigGear").expect("gear");
    assert_eq!(gear.resolved_kind(), NodeKind::Group, "a mesh node with children stays a group");
    assert!(gear.bounds.is_some());

    let middle = find(root, "MiddleBottomGear").expect("middle gear");
    assert_eq!(Vec3::from(middle.translation), Vec3::new(0.0, -0.5, 0.0));
    let hub = find(root, "BigGearHub").expect("hub");
    assert_eq!(Vec3::from(hub.scale), Vec3::splat(0.5));
}

#[test]
fn viewer_loads_gltf_assets_and_tags_targets() {
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_asset(&AssetSource::new(GLTF_FIXTURE)).expect("load glTF asset");
    assert_eq!(viewer.targets().rotating.len(), 2);
    assert!(viewer.targets().oscillating.is_some());
    assert_eq!(viewer.display_tree().label, "Gearbox");
    let events = viewer.drain_events();
    assert!(events.contains(&ViewerEvent::SceneLoaded { nodes: 8, rotating: 2, oscillating: true }));
}

#[test]
fn failed_loads_keep_the_current_scene() {
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_asset(&AssetSource::new(SCENE_FIXTURE)).expect("load scene description");
    let gear = viewer.graph().find_by_name("BigGear").expect("gear");
    viewer.pick(gear);

    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.gltf");
    assert!(viewer.load_asset(&AssetSource::new(&missing)).is_err());
    assert!(viewer.load_asset(&AssetSource::new("gearbox.obj").with_material("gearbox.mtl")).is_err());
    assert_eq!(viewer.current_selection(), Some(gear));
    assert_eq!(viewer.graph().len(), 8);
}

#[test]
fn scene_description_round_trips_through_disk() {
    let scene = SceneDescription::load(SCENE_FIXTURE).expect("fixture scene should load");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("copy.scene.json");
    scene.save(&path).expect("scene save should succeed");
    let loaded = SceneDescription::load(&path).expect("scene load should succeed");
    assert_eq!(loaded.node_count(), scene.node_count());
    let root = loaded.root.as_ref().expect("root");
    let middle = find(root, "MiddleBottomGear").expect("middle gear");
    assert_eq!(Vec3::from(middle.translation), Vec3::new(0.0, -0.5, 0.0));
    assert_eq!(middle.resolved_kind(), NodeKind::Leaf);
}
