//! Cluster spheres: each sphere wraps the current positions of its member nodes.
//!
//! Bounds are recomputed every tick after the layout step so the shells follow
//! their members as the graph settles.

use bevy::prelude::*;

use crate::core::scene::SpaceScene;

/// Spheres never shrink below this radius, so single-member clusters stay visible.
const MIN_RADIUS: f32 = 1.0;

/// Mean center and max member distance (floored at 1.0). Empty input yields a unit sphere at the origin.
pub fn compute_bounding_sphere(positions: &[Vec3]) -> (Vec3, f32) {
    if positions.is_empty() {
        return (Vec3::ZERO, MIN_RADIUS);
    }
    let center = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
    let radius = positions
        .iter()
        .map(|p| p.distance(center))
        .fold(MIN_RADIUS, f32::max);
    (center, radius)
}

/// Refresh center and radius of every live sphere from its live members.
pub fn refresh_cluster_bounds(scene: &mut SpaceScene) {
    let (nodes, spheres) = scene.cluster_parts_mut();
    let mut positions = Vec::new();
    for (_, sphere) in spheres.iter_mut() {
        positions.clear();
        positions.extend(
            sphere
                .members
                .iter()
                .filter_map(|slot| nodes.get(*slot).map(|n| n.position)),
        );
        let (center, radius) = compute_bounding_sphere(&positions);
        sphere.center = center;
        sphere.radius = radius;
    }
}

pub fn cluster_bounds_system(mut scene: ResMut<SpaceScene>) {
    refresh_cluster_bounds(&mut scene);
}
