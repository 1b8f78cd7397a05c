use super::systems::{sys_oscillate_anchored, sys_spin_gears};
use super::transform::{sys_propagate_scene_transforms, TransformPropagationScratch, TransformPropagationStats};
use super::types::*;
use crate::config::TagConfig;
use crate::mesh::MeshBounds;
use crate::scene::{NodeDescription, SceneDescription};
use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::sync::Arc;

/// Live scene hierarchy for one loaded asset, backed by an ECS world.
///
/// Nodes are spawned once from a [`SceneDescription`]; afterwards only transforms and
/// animation components change. A reload builds a fresh graph instead of diffing.
pub struct SceneGraph {
    pub world: World,
    root: Option<Entity>,
    index: HashMap<NodeId, Entity>,
    schedule_frame: Schedule,
    schedule_sync: Schedule,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl SceneGraph {
    pub fn empty() -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(DriveSpeed::default());
        world.insert_resource(AnimationParams::default());
        world.insert_resource(ModelPlacement::default());
        world.insert_resource(FrameStats::default());
        world.insert_resource(TransformPropagationScratch::default());
        world.insert_resource(TransformPropagationStats::default());

        let mut schedule_frame = Schedule::default();
        schedule_frame.add_systems((sys_spin_gears, sys_oscillate_anchored, sys_propagate_scene_transforms).chain());

        let mut schedule_sync = Schedule::default();
        schedule_sync.add_systems(sys_propagate_scene_transforms);

        Self { world, root: None, index: HashMap::new(), schedule_frame, schedule_sync }
    }

    pub fn from_description(scene: &SceneDescription) -> Self {
        let mut graph = Self::empty();
        if let Some(root) = scene.root.as_ref() {
            let entity = graph.spawn_node(root, None);
            graph.root = Some(entity);
        }
        graph.sync_transforms();
        graph
    }

    fn spawn_node(&mut self, desc: &NodeDescription, parent: Option<Entity>) -> Entity {
        let id = desc.id.map(NodeId).unwrap_or_default();
        let kind = desc.resolved_kind();
        let transform = Transform3D {
            translation: desc.translation.into(),
            rotation: desc.rotation.into(),
            scale: desc.scale.into(),
        };
        let node = SceneNode { id, name: Arc::from(desc.name.as_str()), kind };
        let entity = self.world.spawn((node, transform, WorldTransform3D::default())).id();
        if let Some(bounds) = desc.bounds.as_ref() {
            let local = MeshBounds::from_min_max(bounds.min.into(), bounds.max.into());
            self.world.entity_mut(entity).insert(LocalBounds(local));
        }
        if let Some(parent) = parent {
            self.world.entity_mut(entity).insert(Parent(parent));
        }
        if self.index.insert(id, entity).is_some() {
            log::warn!("[scene] duplicate node id {id}; later node shadows the earlier one");
        }
        if kind == NodeKind::Group && !desc.children.is_empty() {
            let children: Vec<Entity> =
                desc.children.iter().map(|child| self.spawn_node(child, Some(entity))).collect();
            self.world.entity_mut(entity).insert(Children(children));
        }
        entity
    }

    pub fn root(&self) -> Option<Entity> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn entity(&self, id: NodeId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, entity: Entity) -> Option<&SceneNode> {
        self.world.get::<SceneNode>(entity)
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.entity(id).and_then(|entity| self.node(entity))
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.world.get::<Children>(entity).map(|children| children.0.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<Parent>(entity).map(|parent| parent.0)
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform3D) -> bool {
        match self.world.get_mut::<Transform3D>(entity) {
            Some(mut current) => {
                *current = transform;
                true
            }
            None => false,
        }
    }

    pub fn world_transform(&self, entity: Entity) -> Mat4 {
        self.world.get::<WorldTransform3D>(entity).map(|world| world.0).unwrap_or(Mat4::IDENTITY)
    }

    pub fn world_bounds(&self, entity: Entity) -> Option<MeshBounds> {
        super::transform::subtree_world_bounds(&self.world, entity)
    }

    /// Every node in depth-first pre-order, children in stored order.
    pub fn walk(&self) -> Vec<Entity> {
        let mut order = Vec::with_capacity(self.index.len());
        let mut stack: Vec<Entity> = self.root.into_iter().collect();
        while let Some(entity) = stack.pop() {
            order.push(entity);
            stack.extend(self.children(entity).iter().rev().copied());
        }
        order
    }

    /// First node in traversal order carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        if name.is_empty() {
            return None;
        }
        self.walk()
            .into_iter()
            .filter_map(|entity| self.node(entity))
            .find(|node| node.name.as_ref() == name)
            .map(|node| node.id)
    }

    pub fn set_speed(&mut self, speed: DriveSpeed) {
        self.world.insert_resource(speed);
    }

    pub fn speed(&self) -> DriveSpeed {
        self.world.get_resource::<DriveSpeed>().copied().unwrap_or_default()
    }

    pub fn set_animation_params(&mut self, params: AnimationParams) {
        self.world.insert_resource(params);
    }

    pub fn animation_params(&self) -> AnimationParams {
        self.world.get_resource::<AnimationParams>().copied().unwrap_or_default()
    }

    pub fn set_placement(&mut self, placement: Mat4) {
        self.world.insert_resource(ModelPlacement(placement));
        self.sync_transforms();
    }

    /// Runs one animation frame: spin, anchored oscillation, then world transform propagation.
    pub fn update(&mut self, dt: f32) -> FrameStats {
        self.world.resource_mut::<TimeDelta>().0 = dt;
        *self.world.resource_mut::<FrameStats>() = FrameStats::default();
        self.schedule_frame.run(&mut self.world);
        *self.world.resource::<FrameStats>()
    }

    pub fn sync_transforms(&mut self) {
        self.schedule_sync.run(&mut self.world);
    }

    pub fn propagation_stats(&self) -> TransformPropagationStats {
        *self.world.resource::<TransformPropagationStats>()
    }

    pub fn oscillation_state(&self, entity: Entity) -> Option<Oscillator> {
        self.world.get::<Oscillator>(entity).copied()
    }

    pub fn spin_angle(&self, entity: Entity) -> Option<f32> {
        self.world.get::<Spin>(entity).map(|spin| spin.angle)
    }

    /// Attaches animation components to the nodes named by `tags`, resolving each name
    /// to a handle once so frame updates never match names.
    pub fn tag_animation_targets(&mut self, tags: &TagConfig) -> AnimationTargets {
        let lower = self.animation_params().scale_lower;
        let mut targets = AnimationTargets::default();
        for entity in self.walk() {
            let Some((id, name)) = self.node(entity).map(|node| (node.id, node.name.clone())) else {
                continue;
            };
            if tags.is_rotating(&name) {
                self.world.entity_mut(entity).insert(Spin::default());
                targets.rotating.push(id);
            }
            if tags.is_oscillating(&name) {
                if targets.oscillating.is_some() {
                    log::warn!("[animation] several nodes named '{name}'; only the first oscillates");
                    continue;
                }
                let axis = self.animation_params().oscillation_axis;
                let mut base_scale = Vec3::ONE;
                if let Some(mut transform) = self.transform(entity) {
                    base_scale = transform.scale;
                    // The cycle starts at the lower bound; the first frame then steps upward.
                    axis.set(&mut transform.scale, axis.get(base_scale) * lower);
                    self.set_transform(entity, transform);
                }
                self.world.entity_mut(entity).insert(Oscillator::new(base_scale, lower));
                targets.oscillating = Some(id);
            }
        }
        if targets.oscillating.is_some() {
            self.sync_transforms();
        }
        if targets.rotating.is_empty() {
            log::debug!("[animation] no rotating nodes in this scene");
        }
        if targets.oscillating.is_none() {
            log::debug!("[animation] no '{}' node in this scene", tags.oscillating);
        }
        targets
    }
}
