use super::{Children, LocalBounds, ModelPlacement, Parent, Transform3D, WorldTransform3D};
use crate::mesh::MeshBounds;
use bevy_ecs::prelude::*;
use glam::Mat4;
use smallvec::SmallVec;

#[derive(Resource, Default)]
pub struct TransformPropagationScratch {
    pub stack: SmallVec<[(Entity, Mat4); 128]>,
}

#[derive(Resource, Clone, Copy, Default)]
pub struct TransformPropagationStats {
    pub root_entities: u32,
    pub processed_entities: u32,
    pub max_stack_size: u32,
}

pub fn sys_propagate_scene_transforms(
    placement: Res<ModelPlacement>,
    mut nodes: Query<(Entity, &Transform3D, Option<&Children>, &mut WorldTransform3D)>,
    roots: Query<Entity, (With<WorldTransform3D>, Without<Parent>)>,
    mut scratch: ResMut<TransformPropagationScratch>,
    mut stats: ResMut<TransformPropagationStats>,
) {
    let mut stack = std::mem::take(&mut scratch.stack);
    stack.clear();
    let mut processed = 0u32;
    let mut root_count = 0u32;
    let mut max_stack = 0usize;

    for root in roots.iter() {
        stack.push((root, placement.0));
        root_count += 1;
        while let Some((entity, parent_world)) = stack.pop() {
            let Ok((_, transform, children, mut world)) = nodes.get_mut(entity) else {
                continue;
            };
            let world_mat = parent_world * transform.matrix();
            world.0 = world_mat;
            processed += 1;
            if let Some(children) = children {
                for &child in children.0.iter().rev() {
                    stack.push((child, world_mat));
                }
                max_stack = max_stack.max(stack.len());
            }
        }
    }

    scratch.stack = stack;
    stats.root_entities = root_count;
    stats.processed_entities = processed;
    stats.max_stack_size = max_stack as u32;
}

/// World matrix of `entity` read straight from the local transforms up its parent chain.
pub fn world_matrix(world: &World, entity: Entity) -> Mat4 {
    let mut chain: SmallVec<[Mat4; 16]> = SmallVec::new();
    let mut cursor = Some(entity);
    while let Some(current) = cursor {
        let local = world.get::<Transform3D>(current).map(Transform3D::matrix).unwrap_or(Mat4::IDENTITY);
        chain.push(local);
        cursor = world.get::<Parent>(current).map(|parent| parent.0);
    }
    let placement = world.get_resource::<ModelPlacement>().map(|p| p.0).unwrap_or(Mat4::IDENTITY);
    chain.iter().rev().fold(placement, |acc, local| acc * *local)
}

/// World matrix of the space `entity`'s local transform lives in.
pub fn parent_world_matrix(world: &World, entity: Entity) -> Mat4 {
    match world.get::<Parent>(entity) {
        Some(parent) => world_matrix(world, parent.0),
        None => world.get_resource::<ModelPlacement>().map(|p| p.0).unwrap_or(Mat4::IDENTITY),
    }
}

/// World-space box around every piece of geometry at or below `entity`.
pub fn subtree_world_bounds(world: &World, entity: Entity) -> Option<MeshBounds> {
    let mut stack: SmallVec<[(Entity, Mat4); 32]> = SmallVec::new();
    stack.push((entity, world_matrix(world, entity)));
    let mut bounds: Option<MeshBounds> = None;
    while let Some((current, current_world)) = stack.pop() {
        if let Some(local) = world.get::<LocalBounds>(current) {
            let placed = local.0.transformed(&current_world);
            bounds = Some(match bounds {
                Some(existing) => existing.union(&placed),
                None => placed,
            });
        }
        if let Some(children) = world.get::<Children>(current) {
            for &child in children.0.iter().rev() {
                let local = world.get::<Transform3D>(child).map(Transform3D::matrix).unwrap_or(Mat4::IDENTITY);
                stack.push((child, current_world * local));
            }
        }
    }
    bounds
}
