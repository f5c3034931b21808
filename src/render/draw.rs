//! Per-frame draw list honouring the view toggles. The renderer consumes it as-is.

use bevy::prelude::*;

use super::camera::SpaceCamera;
use crate::core::config::{LinkMode, NodeShapes, SpaceConfig};
use crate::core::marks::mark_color;
use crate::core::scene::SpaceScene;
use crate::core::slots::Slot;
use crate::spatial::SceneOctree;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Node {
        slot: Slot,
        position: Vec3,
        radius: f32,
        /// Fill color, absent when shapes are hidden.
        color: Option<Color>,
        /// Mark halo, absent for unmarked nodes or when marks are hidden.
        mark: Option<Color>,
        label: Option<String>,
        icon: Option<String>,
    },
    Link {
        slot: Slot,
        from: Vec3,
        to: Vec3,
        colors: [Color; 2],
        width: f32,
        activity: Option<f32>,
    },
    Sphere {
        slot: Slot,
        center: Vec3,
        radius: f32,
        color: Color,
        label: String,
    },
    /// Root box of the spatial index.
    DebugBox { min: Vec3, max: Vec3 },
    /// Last picking ray, cut at the far plane.
    DebugRay { origin: Vec3, end: Vec3 },
}

#[derive(Debug, Default, Clone)]
pub struct DrawFrame {
    pub items: Vec<DrawItem>,
}

impl DrawFrame {
    pub fn nodes(&self) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(|i| matches!(i, DrawItem::Node { .. }))
    }

    pub fn links(&self) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(|i| matches!(i, DrawItem::Link { .. }))
    }

    pub fn spheres(&self) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(|i| matches!(i, DrawItem::Sphere { .. }))
    }
}

/// Node slots to draw: octree-culled when an index exists, otherwise every live node
/// tested against the frustum.
pub fn visible_node_slots(scene: &SpaceScene, config: &SpaceConfig, camera: &SpaceCamera, octree: &SceneOctree) -> Vec<Slot> {
    let frustum = camera.frustum();
    if let Some(visible) = octree.visible_nodes(scene, &frustum) {
        return visible;
    }
    scene
        .nodes()
        .iter()
        .filter(|(_, n)| frustum.intersects_sphere(n.position, n.bounding_radius(config.node_icon_size)))
        .map(|(slot, _)| slot)
        .collect()
}

pub fn build_draw_frame(
    scene: &SpaceScene,
    config: &SpaceConfig,
    camera: &SpaceCamera,
    octree: &SceneOctree,
) -> DrawFrame {
    let mut frame = DrawFrame::default();
    let show_colors = matches!(config.show_node_shapes, NodeShapes::All | NodeShapes::Colors);
    let show_marks = matches!(config.show_node_shapes, NodeShapes::All | NodeShapes::Marks);

    if config.show_spheres {
        for (slot, sphere) in scene.spheres().iter() {
            frame.items.push(DrawItem::Sphere {
                slot,
                center: sphere.center,
                radius: sphere.radius,
                color: sphere.color,
                label: sphere.label.clone(),
            });
        }
    }

    if config.show_edges {
        for (slot, link) in scene.links().iter() {
            if link.lod == 0.0 {
                continue;
            }
            let (Some(n1), Some(n2)) = (scene.nodes().get(link.node1), scene.nodes().get(link.node2)) else {
                continue;
            };
            let colors = match config.link_mode {
                LinkMode::NodeColor => [n1.color, n2.color],
                LinkMode::LinkColor => link.colors,
            };
            frame.items.push(DrawItem::Link {
                slot,
                from: n1.position,
                to: n2.position,
                colors,
                width: config.edge_size,
                activity: config.show_edge_activity.then_some(link.activity),
            });
        }
    }

    for slot in visible_node_slots(scene, config, camera, octree) {
        let Some(node) = scene.nodes().get(slot) else {
            continue;
        };
        if node.lod == 0.0 {
            continue;
        }
        frame.items.push(DrawItem::Node {
            slot,
            position: node.position,
            radius: node.bounding_radius(config.node_icon_size),
            color: show_colors.then_some(node.color),
            mark: (show_marks && node.mark != 0).then(|| mark_color(node.mark)),
            label: config.show_node_labels.then(|| node.label.clone()),
            icon: node.icon.clone(),
        });
    }

    if config.show_debug {
        if let Some(tree) = octree.0.as_ref() {
            let half = tree.half_extents();
            frame.items.push(DrawItem::DebugBox {
                min: tree.center() - half,
                max: tree.center() + half,
            });
        }
        if let Some(ray) = camera.last_pick {
            frame.items.push(DrawItem::DebugRay {
                origin: ray.origin,
                end: ray.get_point(camera.far),
            });
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::AttributeType;
    use crate::core::identity::{LinkId, NodeId, SphereId};

    fn scene() -> (SpaceScene, SpaceConfig) {
        let config = SpaceConfig::default();
        let mut scene = SpaceScene::new(5);
        scene.add_node(NodeId(1), "a", &config).unwrap();
        scene.add_node(NodeId(2), "b", &config).unwrap();
        scene.add_link(LinkId(1), NodeId(1), NodeId(2)).unwrap();
        scene.add_sphere(SphereId(1), "s").unwrap();
        scene
            .set_node_attribute(NodeId(1), "space:color", AttributeType::Vec3, "1 0 0")
            .unwrap();
        scene
            .set_link_attribute(LinkId(1), "space:color", AttributeType::Vec4, "0 0 1 1")
            .unwrap();
        (scene, config)
    }

    #[test]
    fn default_frame_has_everything() {
        let (scene, config) = scene();
        let frame = build_draw_frame(&scene, &config, &SpaceCamera::default(), &SceneOctree::default());
        assert_eq!(frame.nodes().count(), 2);
        assert_eq!(frame.links().count(), 1);
        assert_eq!(frame.spheres().count(), 1);
    }

    #[test]
    fn link_colors_follow_link_mode() {
        let (scene, mut config) = scene();
        let camera = SpaceCamera::default();
        let octree = SceneOctree::default();

        let frame = build_draw_frame(&scene, &config, &camera, &octree);
        let Some(DrawItem::Link { colors, .. }) = frame.links().next() else {
            panic!("no link drawn");
        };
        assert_eq!(colors[0], Color::srgb(1.0, 0.0, 0.0));

        config.link_mode = LinkMode::LinkColor;
        let frame = build_draw_frame(&scene, &config, &camera, &octree);
        let Some(DrawItem::Link { colors, .. }) = frame.links().next() else {
            panic!("no link drawn");
        };
        assert_eq!(colors[0], Color::srgba(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn toggles_hide_items() {
        let (mut scene, mut config) = scene();
        scene.set_node_mark(NodeId(2), 3).unwrap();
        config.show_edges = false;
        config.show_spheres = false;
        config.show_node_labels = false;
        config.show_node_shapes = NodeShapes::Marks;

        let frame = build_draw_frame(&scene, &config, &SpaceCamera::default(), &SceneOctree::default());
        assert_eq!(frame.links().count(), 0);
        assert_eq!(frame.spheres().count(), 0);
        for item in frame.nodes() {
            let DrawItem::Node { slot, color, mark, label, .. } = item else {
                unreachable!();
            };
            assert!(color.is_none());
            assert!(label.is_none());
            assert_eq!(mark.is_some(), *slot == scene.node_slot(NodeId(2)).unwrap());
        }
    }

    #[test]
    fn debug_box_needs_an_index() {
        let (scene, mut config) = scene();
        config.show_debug = true;
        let camera = SpaceCamera::default();
        let mut octree = SceneOctree::default();

        let frame = build_draw_frame(&scene, &config, &camera, &octree);
        assert!(!frame.items.iter().any(|i| matches!(i, DrawItem::DebugBox { .. })));

        octree.rebuild(&scene, &config).unwrap();
        let frame = build_draw_frame(&scene, &config, &camera, &octree);
        assert!(frame.items.iter().any(|i| matches!(i, DrawItem::DebugBox { .. })));
    }

    #[test]
    fn debug_ray_follows_last_pick() {
        let (scene, mut config) = scene();
        let mut camera = SpaceCamera::default();
        let octree = SceneOctree::default();
        let is_ray = |i: &DrawItem| matches!(i, DrawItem::DebugRay { .. });

        config.show_debug = true;
        assert!(!build_draw_frame(&scene, &config, &camera, &octree).items.iter().any(is_ray));

        let ray = camera.create_ray(10.0, 20.0).unwrap();
        camera.last_pick = Some(ray);
        let frame = build_draw_frame(&scene, &config, &camera, &octree);
        let Some(DrawItem::DebugRay { origin, end }) = frame.items.iter().find(|i| is_ray(*i)) else {
            panic!("no debug ray");
        };
        assert_eq!(*origin, ray.origin);
        assert!((end.distance(*origin) - camera.far).abs() < 1e-2);

        config.show_debug = false;
        assert!(!build_draw_frame(&scene, &config, &camera, &octree).items.iter().any(is_ray));
    }

    #[test]
    fn nodes_behind_camera_are_culled() {
        let (mut scene, config) = scene();
        scene
            .set_node_attribute(NodeId(2), "space:position", AttributeType::Vec3, "0 0 -50")
            .unwrap();
        let frame = build_draw_frame(&scene, &config, &SpaceCamera::default(), &SceneOctree::default());
        assert_eq!(frame.nodes().count(), 1);
    }
}
