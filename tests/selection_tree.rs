use gearbox_viewer::config::ViewerConfig;
use gearbox_viewer::ecs::{NodeId, SceneGraph};
use gearbox_viewer::events::ViewerEvent;
use gearbox_viewer::scene::SceneDescription;
use gearbox_viewer::selection::{SelectionChange, SelectionSource};
use gearbox_viewer::tree::{synthesize, DisplayTreeNode, ROOT_LABEL};
use gearbox_viewer::Viewer;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/gearbox.scene.json");

fn loaded_viewer() -> Viewer {
    let scene = SceneDescription::load(FIXTURE).expect("fixture scene should load");
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_description(&scene);
    viewer
}

#[test]
fn at_most_one_node_is_selected_after_every_call() {
    let mut viewer = loaded_viewer();
    let ids = viewer.default_expanded();
    assert_eq!(ids.len(), 8);

    // Deterministic mixed sequence of picks and tree clicks, including repeats.
    let mut state: u32 = 0x2545_f491;
    for _ in 0..200 {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let id = ids[(state >> 8) as usize % ids.len()];
        if state & 1 == 0 {
            viewer.pick(id);
        } else {
            viewer.tree_select(id);
        }
        let selected: Vec<NodeId> = viewer.selection().selected().collect();
        assert!(selected.len() <= 1, "more than one selection: {selected:?}");
        assert_eq!(selected.first().copied(), viewer.current_selection());
    }
}

#[test]
fn repeated_pick_is_idempotent() {
    let mut viewer = loaded_viewer();
    let gear = viewer.graph().find_by_name("BigGear").expect("gear present");
    assert!(matches!(viewer.pick(gear), SelectionChange::Changed { previous: None, .. }));
    let snapshot = viewer.selection().clone();
    assert_eq!(viewer.pick(gear), SelectionChange::Unchanged);
    assert_eq!(viewer.selection(), &snapshot);
}

#[test]
fn pick_on_unnamed_node_changes_nothing() {
    let mut viewer = loaded_viewer();
    let unnamed = viewer
        .graph()
        .walk()
        .into_iter()
        .filter_map(|entity| viewer.graph().node(entity))
        .filter(|node| node.name.is_empty())
        .map(|node| node.id)
        .nth(1)
        .expect("fixture has an unnamed leaf besides the root");
    let shell = viewer.graph().find_by_name("Shell").expect("shell present");
    viewer.tree_select(shell);
    let snapshot = viewer.selection().clone();
    assert_eq!(viewer.pick(unnamed), SelectionChange::Ignored);
    assert_eq!(viewer.selection(), &snapshot);
    assert_eq!(viewer.current_selection(), Some(shell));
    // The tree widget can still reach it.
    assert!(matches!(viewer.tree_select(unnamed), SelectionChange::Changed { .. }));
}

#[test]
fn stale_tree_ids_are_ignored() {
    let mut viewer = loaded_viewer();
    assert_eq!(viewer.tree_select(NodeId::new()), SelectionChange::Ignored);
    assert_eq!(viewer.selection().selected_count(), 0);
}

#[test]
fn selection_changes_are_reported_as_events() {
    let mut viewer = loaded_viewer();
    viewer.drain_events();
    let shell = viewer.graph().find_by_name("Shell").expect("shell");
    let gear = viewer.graph().find_by_name("BigGear").expect("gear");
    viewer.tree_select(shell);
    viewer.pick(gear);
    viewer.pick(gear);
    let events = viewer.drain_events();
    assert_eq!(
        events,
        vec![
            ViewerEvent::SelectionChanged { previous: None, current: shell, source: SelectionSource::Tree },
            ViewerEvent::SelectionChanged { previous: Some(shell), current: gear, source: SelectionSource::Pick },
        ]
    );
}

#[test]
fn synthesis_is_deterministic_over_one_snapshot() {
    let scene = SceneDescription::load(FIXTURE).expect("fixture scene should load");
    let graph = SceneGraph::from_description(&scene);
    let first = synthesize(&graph);
    let second = synthesize(&graph);
    assert_eq!(first.display, second.display);
    assert_eq!(first.selection.keys(), second.selection.keys());
    assert_eq!(first.display.label, ROOT_LABEL);
    let labels: Vec<&str> = first.display.children().iter().map(|child| child.label.as_str()).collect();
    assert_eq!(labels, vec!["Shell", "BigGear", "SmallBottomGear", "MiddleBottomGear", ""]);
    assert_eq!(first.display.count(), first.selection.len());
}

#[test]
fn reload_resets_selection_and_tree() {
    let mut viewer = loaded_viewer();
    let gear = viewer.graph().find_by_name("BigGear").expect("gear");
    viewer.pick(gear);
    let scene = SceneDescription::load(FIXTURE).expect("fixture scene should load");
    viewer.load_description(&scene);
    assert_eq!(viewer.current_selection(), None);
    assert_eq!(viewer.selection().selected_count(), 0);
    assert!(!viewer.selection().contains(gear), "identities are fresh after a reload");
}

#[test]
fn empty_scene_exposes_placeholder_root() {
    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.load_description(&SceneDescription::default());
    assert_eq!(viewer.display_tree(), &DisplayTreeNode::placeholder());
    assert!(viewer.default_expanded().is_empty());
    assert!(viewer.project().is_empty());
    assert_eq!(viewer.tree_select(NodeId::PLACEHOLDER), SelectionChange::Ignored);
}
