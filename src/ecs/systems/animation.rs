use crate::ecs::transform::{parent_world_matrix, subtree_world_bounds};
use crate::ecs::{
    AnimationParams, DriveSpeed, FrameStats, OscillationSample, Oscillator, Spin, TimeDelta, Transform3D,
};
use bevy_ecs::prelude::{Entity, Query, Res, ResMut, With, World};
use glam::Quat;
use std::f32::consts::FRAC_PI_2;

/// Angle in radians a rotating node advances for one frame.
pub fn spin_step(speed: DriveSpeed, delta: f32, factor: f32) -> f32 {
    speed.as_f32() * delta * FRAC_PI_2 * factor
}

pub fn sys_spin_gears(
    dt: Res<TimeDelta>,
    speed: Res<DriveSpeed>,
    params: Res<AnimationParams>,
    mut stats: ResMut<FrameStats>,
    mut gears: Query<(&mut Transform3D, &mut Spin)>,
) {
    let step = spin_step(*speed, dt.0, params.rotation_factor);
    stats.rotation_step = step;
    stats.spun = 0;
    let axis = params.rotation_axis.unit();
    for (mut transform, mut spin) in &mut gears {
        spin.angle += step;
        // Pre-multiplied: the axis is fixed in the parent frame, like an Euler angle increment.
        transform.rotation = (Quat::from_axis_angle(axis, step) * transform.rotation).normalize();
        stats.spun += 1;
    }
}

/// Steps the oscillating node's scale and shifts it so the upper edge of its world
/// extent on the oscillation axis stays where it was before the step.
pub fn sys_oscillate_anchored(world: &mut World) {
    let params = *world.resource::<AnimationParams>();
    let mut targets = world.query_filtered::<Entity, (With<Oscillator>, With<Transform3D>)>();
    let first = targets.iter(world).next();
    let Some(entity) = first else {
        world.resource_mut::<FrameStats>().oscillation = None;
        return;
    };
    let axis = params.oscillation_axis;

    let before = subtree_world_bounds(world, entity);
    let (factor, phase, base) = {
        let Some(mut osc) = world.get_mut::<Oscillator>(entity) else {
            return;
        };
        let factor = osc.advance(params.scale_lower, params.scale_upper, params.scale_step);
        (factor, osc.phase, osc.base_scale)
    };
    if let Some(mut transform) = world.get_mut::<Transform3D>(entity) {
        axis.set(&mut transform.scale, axis.get(base) * factor);
    }
    let after = subtree_world_bounds(world, entity);

    let anchor_shift = match (before, after) {
        (Some(before), Some(after)) => axis.get(before.max) - axis.get(after.max),
        _ => 0.0,
    };
    if anchor_shift != 0.0 {
        let to_parent = parent_world_matrix(world, entity).inverse();
        let local_shift = to_parent.transform_vector3(axis.unit() * anchor_shift);
        if local_shift.is_finite() {
            if let Some(mut transform) = world.get_mut::<Transform3D>(entity) {
                transform.translation += local_shift;
            }
        }
    }

    world.resource_mut::<FrameStats>().oscillation = Some(OscillationSample { factor, phase, anchor_shift });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_step_is_linear_in_speed_and_delta() {
        let step = spin_step(DriveSpeed(50), 1.0 / 60.0, 0.03);
        let expected = 50.0 * (1.0 / 60.0) * FRAC_PI_2 * 0.03;
        assert!((step - expected).abs() < 1e-7);
        assert!((spin_step(DriveSpeed(100), 1.0 / 60.0, 0.03) - 2.0 * step).abs() < 1e-7);
        assert_eq!(spin_step(DriveSpeed(0), 0.5, 0.03), 0.0);
        assert_eq!(spin_step(DriveSpeed(0), 1.0 / 240.0, 0.03), 0.0);
    }
}
