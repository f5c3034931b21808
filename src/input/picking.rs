//! Node picking: ray against bounding spheres, nearest hit wins.

use bevy::prelude::*;

use crate::core::config::SpaceConfig;
use crate::core::scene::SpaceScene;
use crate::core::slots::Slot;
use crate::render::camera::SpaceCamera;

/// Smallest non-negative ray parameter at which `ray` meets the sphere, if any.
/// A ray starting inside the sphere hits at its exit point.
pub fn ray_sphere(ray: &Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(*ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let near = -b - sqrt;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt;
    (far >= 0.0).then_some(far)
}

/// Nearest visible node hit by `ray`. Nodes with `lod == 0` are not pickable.
pub fn pick_node(scene: &SpaceScene, config: &SpaceConfig, ray: &Ray3d) -> Option<Slot> {
    scene
        .nodes()
        .iter()
        .filter(|(_, node)| node.lod != 0.0)
        .filter_map(|(slot, node)| {
            ray_sphere(ray, node.position, node.bounding_radius(config.node_icon_size))
                .map(|t| (slot, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _)| slot)
}

/// Pick through the camera at pixel `(x, y)`. The ray is kept as `camera.last_pick`.
pub fn pick_node_at_screen(
    scene: &SpaceScene,
    config: &SpaceConfig,
    camera: &mut SpaceCamera,
    x: f32,
    y: f32,
) -> Option<Slot> {
    let ray = camera.create_ray(x, y)?;
    camera.last_pick = Some(ray);
    pick_node(scene, config, &ray)
}
