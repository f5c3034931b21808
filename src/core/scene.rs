//! The render-local scene: slot arrays of nodes, links and cluster spheres, plus the
//! identity maps that translate graph-model IDs into slots.
//!
//! Every handler here validates before it mutates, so a failed call leaves the scene
//! exactly as it was.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::components::{tint_color, ClusterSphere, SimulationLink, SimulationNode};
use super::config::SpaceConfig;
use super::error::{EntityKind, Result, SpaceError};
use super::identity::{ExternalId, IdentityMap, LinkId, NodeId, SphereId};
use super::marks::mark_color;
use super::slots::{Slot, SlotArray};

#[derive(Resource)]
pub struct SpaceScene {
    nodes: SlotArray<SimulationNode>,
    links: SlotArray<SimulationLink>,
    spheres: SlotArray<ClusterSphere>,
    node_map: IdentityMap<NodeId>,
    link_map: IdentityMap<LinkId>,
    sphere_map: IdentityMap<SphereId>,
    /// Placement randomness for new nodes.
    rng: ChaCha8Rng,
}

impl Default for SpaceScene {
    fn default() -> Self {
        Self::new(0)
    }
}

fn ensure_free<R: ExternalId>(map: &IdentityMap<R>, id: R) -> Result<()> {
    if map.contains_remote_id(id) {
        return Err(SpaceError::DuplicateId {
            kind: R::KIND,
            id: id.raw(),
        });
    }
    Ok(())
}

impl SpaceScene {
    pub fn new(seed: u64) -> Self {
        Self {
            nodes: SlotArray::new(),
            links: SlotArray::new(),
            spheres: SlotArray::new(),
            node_map: IdentityMap::new(),
            link_map: IdentityMap::new(),
            sphere_map: IdentityMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    // ----- Lookups -----

    pub fn nodes(&self) -> &SlotArray<SimulationNode> {
        &self.nodes
    }

    pub fn links(&self) -> &SlotArray<SimulationLink> {
        &self.links
    }

    pub fn spheres(&self) -> &SlotArray<ClusterSphere> {
        &self.spheres
    }

    pub fn node_map(&self) -> &IdentityMap<NodeId> {
        &self.node_map
    }

    pub fn link_map(&self) -> &IdentityMap<LinkId> {
        &self.link_map
    }

    pub fn sphere_map(&self) -> &IdentityMap<SphereId> {
        &self.sphere_map
    }

    pub fn node_slot(&self, id: NodeId) -> Result<Slot> {
        self.node_map.get_local_id(id)
    }

    pub fn link_slot(&self, id: LinkId) -> Result<Slot> {
        self.link_map.get_local_id(id)
    }

    pub fn sphere_slot(&self, id: SphereId) -> Result<Slot> {
        self.sphere_map.get_local_id(id)
    }

    pub fn node_id(&self, slot: Slot) -> Option<NodeId> {
        self.node_map.get_remote_id(slot)
    }

    pub fn node(&self, id: NodeId) -> Result<&SimulationNode> {
        let slot = self.node_slot(id)?;
        self.nodes.get(slot).ok_or(SpaceError::NotFound {
            kind: EntityKind::Node,
            id: id.0,
        })
    }

    pub fn link(&self, id: LinkId) -> Result<&SimulationLink> {
        let slot = self.link_slot(id)?;
        self.links.get(slot).ok_or(SpaceError::NotFound {
            kind: EntityKind::Link,
            id: id.0,
        })
    }

    pub fn sphere(&self, id: SphereId) -> Result<&ClusterSphere> {
        let slot = self.sphere_slot(id)?;
        self.spheres.get(slot).ok_or(SpaceError::NotFound {
            kind: EntityKind::Sphere,
            id: id.0,
        })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut SimulationNode> {
        let slot = self.node_slot(id)?;
        self.nodes.get_mut(slot).ok_or(SpaceError::NotFound {
            kind: EntityKind::Node,
            id: id.0,
        })
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> Result<&mut SimulationLink> {
        let slot = self.link_slot(id)?;
        self.links.get_mut(slot).ok_or(SpaceError::NotFound {
            kind: EntityKind::Link,
            id: id.0,
        })
    }

    /// Node storage for force integration alongside the links the forces read.
    pub fn layout_parts_mut(&mut self) -> (&mut SlotArray<SimulationNode>, &SlotArray<SimulationLink>) {
        (&mut self.nodes, &self.links)
    }

    /// Sphere storage for bounds refresh alongside the node positions it reads.
    pub fn cluster_parts_mut(&mut self) -> (&SlotArray<SimulationNode>, &mut SlotArray<ClusterSphere>) {
        (&self.nodes, &mut self.spheres)
    }

    /// Axis-aligned bounds `(min, max)` of all live node positions.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.nodes.iter().map(|(_, n)| n.position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    // ----- Nodes -----

    pub fn add_node(&mut self, id: NodeId, label: &str, config: &SpaceConfig) -> Result<Slot> {
        ensure_free(&self.node_map, id)?;
        let slot = self.push_node_around(id, label, Vec3::ZERO, config.spawn_radius)?;
        debug!("[SPACE] Node {} added at slot {}", id, slot);
        Ok(slot)
    }

    /// Place a new node at a random offset within `radius` of `anchor` and register it.
    fn push_node_around(&mut self, id: NodeId, label: &str, anchor: Vec3, radius: f32) -> Result<Slot> {
        let a: f32 = self.rng.gen_range(0.0..TAU);
        let b: f32 = self.rng.gen_range(0.0..TAU);
        let r = radius * (0.8 + self.rng.gen::<f32>() / 5.0);
        let offset = Vec3::new(r * a.sin() * b.cos(), r * a.cos(), r * a.sin() * b.sin());

        let slot = self.nodes.add(SimulationNode::new(label, anchor + offset));
        if let Err(err) = self.node_map.add_remote_id(id, slot) {
            self.nodes.remove(slot);
            return Err(err);
        }
        Ok(slot)
    }

    /// Remove a node, every link touching it, and its membership in every sphere.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let slot = self.node_slot(id)?;

        let incident: Vec<Slot> = self
            .links
            .iter()
            .filter(|(_, link)| link.touches(slot))
            .map(|(link_slot, _)| link_slot)
            .collect();
        for link_slot in incident {
            self.links.remove(link_slot);
            self.link_map.remove_local_id(link_slot);
            debug!("[SPACE] Link {} removed with node {}", link_slot, id);
        }

        for (_, sphere) in self.spheres.iter_mut() {
            sphere.members.retain(|member| *member != slot);
        }

        self.nodes.remove(slot);
        self.node_map.erase_remote_id(id, slot)
    }

    pub fn set_node_label(&mut self, id: NodeId, label: &str) -> Result<()> {
        self.node_mut(id)?.label = label.to_string();
        Ok(())
    }

    pub fn set_node_mark(&mut self, id: NodeId, mark: u32) -> Result<()> {
        self.node_mut(id)?.mark = mark;
        Ok(())
    }

    pub fn set_node_weight(&mut self, id: NodeId, weight: f32) -> Result<()> {
        self.node_mut(id)?.size = weight;
        Ok(())
    }

    // ----- Links -----

    pub fn add_link(&mut self, id: LinkId, from: NodeId, to: NodeId) -> Result<Slot> {
        ensure_free(&self.link_map, id)?;
        let node1 = self.node_slot(from)?;
        let node2 = self.node_slot(to)?;
        self.push_link(id, node1, node2)
    }

    fn push_link(&mut self, id: LinkId, node1: Slot, node2: Slot) -> Result<Slot> {
        let slot = self.links.add(SimulationLink::new(node1, node2));
        if let Err(err) = self.link_map.add_remote_id(id, slot) {
            self.links.remove(slot);
            return Err(err);
        }
        Ok(slot)
    }

    pub fn remove_link(&mut self, id: LinkId) -> Result<()> {
        let slot = self.link_slot(id)?;
        self.links.remove(slot);
        self.link_map.erase_remote_id(id, slot)
    }

    /// Create `node_id` near the existing `neighbor` and connect them with `link_id`.
    pub fn add_neighbor(
        &mut self,
        node_id: NodeId,
        link_id: LinkId,
        label: &str,
        neighbor: NodeId,
        config: &SpaceConfig,
    ) -> Result<(Slot, Slot)> {
        let anchor = self.node(neighbor)?.position;
        let neighbor_slot = self.node_slot(neighbor)?;
        ensure_free(&self.node_map, node_id)?;
        ensure_free(&self.link_map, link_id)?;

        let node_slot = self.push_node_around(node_id, label, anchor, config.spawn_radius)?;
        let link_slot = self.push_link(link_id, neighbor_slot, node_slot)?;
        Ok((node_slot, link_slot))
    }

    // ----- Spheres -----

    pub fn add_sphere(&mut self, id: SphereId, label: &str) -> Result<Slot> {
        ensure_free(&self.sphere_map, id)?;
        let slot = self.spheres.add(ClusterSphere::new(label));
        if let Err(err) = self.sphere_map.add_remote_id(id, slot) {
            self.spheres.remove(slot);
            return Err(err);
        }
        Ok(slot)
    }

    pub fn remove_sphere(&mut self, id: SphereId) -> Result<()> {
        let slot = self.sphere_slot(id)?;
        self.spheres.remove(slot);
        self.sphere_map.erase_remote_id(id, slot)
    }

    pub fn set_sphere_mark(&mut self, id: SphereId, mark: u32) -> Result<()> {
        let slot = self.sphere_slot(id)?;
        if let Some(sphere) = self.spheres.get_mut(slot) {
            sphere.mark = mark;
            sphere.color = mark_color(mark);
        }
        Ok(())
    }

    /// Add a node to a sphere's membership. Tagging twice is a no-op.
    pub fn tag_node(&mut self, node: NodeId, sphere: SphereId) -> Result<()> {
        let node_slot = self.node_slot(node)?;
        let sphere_slot = self.sphere_slot(sphere)?;
        if let Some(sphere) = self.spheres.get_mut(sphere_slot) {
            if !sphere.members.contains(&node_slot) {
                sphere.members.push(node_slot);
            }
        }
        Ok(())
    }

    // ----- Whole-scene operations -----

    /// Darken nodes by relative degree: `0.3 + 0.7 * degree / max_degree`.
    pub fn apply_degree_tint(&mut self) {
        let mut degrees = vec![0u32; self.nodes.size()];
        let mut max_degree = 0;
        for (_, link) in self.links.iter() {
            for end in [link.node1, link.node2] {
                if let Some(d) = degrees.get_mut(end) {
                    *d += 1;
                    max_degree = max_degree.max(*d);
                }
            }
        }

        for (slot, node) in self.nodes.iter_mut() {
            let tint = if max_degree == 0 {
                1.0
            } else {
                0.3 + 0.7 * degrees[slot] as f32 / max_degree as f32
            };
            node.color = tint_color(node.color, tint);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.spheres.clear();
        self.node_map.clear();
        self.link_map.clear();
        self.sphere_map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::color_to_vec4;

    fn scene_with_nodes(n: u64) -> (SpaceScene, SpaceConfig) {
        let config = SpaceConfig::default();
        let mut scene = SpaceScene::new(7);
        for i in 0..n {
            scene.add_node(NodeId(i), &format!("n{i}"), &config).unwrap();
        }
        (scene, config)
    }

    #[test]
    fn added_nodes_land_inside_spawn_radius() {
        let (scene, config) = scene_with_nodes(50);
        for (_, node) in scene.nodes().iter() {
            let d = node.position.length();
            assert!(d <= config.spawn_radius + 1e-4, "distance {d}");
            assert!(d >= 0.8 * config.spawn_radius - 1e-4, "distance {d}");
        }
    }

    #[test]
    fn duplicate_node_leaves_scene_untouched() {
        let (mut scene, config) = scene_with_nodes(2);
        let err = scene.add_node(NodeId(1), "again", &config).unwrap_err();
        assert!(matches!(err, SpaceError::DuplicateId { id: 1, .. }));
        assert_eq!(scene.nodes().live_count(), 2);
        assert_eq!(scene.node(NodeId(1)).unwrap().label, "n1");
    }

    #[test]
    fn removed_id_does_not_resolve_to_recycled_slot() {
        let (mut scene, config) = scene_with_nodes(3);
        let old_slot = scene.node_slot(NodeId(1)).unwrap();
        scene.remove_node(NodeId(1)).unwrap();

        let new_slot = scene.add_node(NodeId(99), "b", &config).unwrap();
        assert_eq!(new_slot, old_slot);
        assert!(matches!(
            scene.node_slot(NodeId(1)),
            Err(SpaceError::NotFound { id: 1, .. })
        ));
        assert_eq!(scene.node_id(new_slot), Some(NodeId(99)));
    }

    #[test]
    fn remove_node_cascades_links_and_membership() {
        let (mut scene, _) = scene_with_nodes(3);
        scene.add_link(LinkId(10), NodeId(0), NodeId(1)).unwrap();
        scene.add_link(LinkId(11), NodeId(1), NodeId(2)).unwrap();
        scene.add_link(LinkId(12), NodeId(0), NodeId(2)).unwrap();
        scene.add_sphere(SphereId(5), "cluster").unwrap();
        scene.tag_node(NodeId(1), SphereId(5)).unwrap();
        scene.tag_node(NodeId(2), SphereId(5)).unwrap();

        let removed = scene.node_slot(NodeId(1)).unwrap();
        scene.remove_node(NodeId(1)).unwrap();

        assert_eq!(scene.links().live_count(), 1);
        assert!(!scene.link_map().contains_remote_id(LinkId(10)));
        assert!(!scene.link_map().contains_remote_id(LinkId(11)));
        assert!(scene.link_map().contains_remote_id(LinkId(12)));
        for (_, link) in scene.links().iter() {
            assert!(scene.nodes().is_live(link.node1));
            assert!(scene.nodes().is_live(link.node2));
        }
        let sphere = scene.sphere(SphereId(5)).unwrap();
        assert!(!sphere.members.contains(&removed));
        assert_eq!(sphere.members.len(), 1);
    }

    #[test]
    fn remove_unknown_node_is_not_found() {
        let (mut scene, _) = scene_with_nodes(1);
        assert!(matches!(
            scene.remove_node(NodeId(42)),
            Err(SpaceError::NotFound { id: 42, .. })
        ));
        assert_eq!(scene.nodes().live_count(), 1);
    }

    #[test]
    fn link_with_unknown_endpoint_allocates_nothing() {
        let (mut scene, _) = scene_with_nodes(1);
        let err = scene.add_link(LinkId(1), NodeId(0), NodeId(8)).unwrap_err();
        assert!(matches!(err, SpaceError::NotFound { id: 8, .. }));
        assert_eq!(scene.links().size(), 0);
        assert!(scene.link_map().is_empty());
    }

    #[test]
    fn remove_link_then_not_found() {
        let (mut scene, _) = scene_with_nodes(2);
        scene.add_link(LinkId(1), NodeId(0), NodeId(1)).unwrap();
        scene.remove_link(LinkId(1)).unwrap();
        assert!(scene.links().is_empty());
        assert!(matches!(
            scene.remove_link(LinkId(1)),
            Err(SpaceError::NotFound { .. })
        ));
    }

    #[test]
    fn add_neighbor_places_near_anchor_and_links() {
        let (mut scene, config) = scene_with_nodes(1);
        let anchor = scene.node(NodeId(0)).unwrap().position;
        let (node_slot, link_slot) = scene
            .add_neighbor(NodeId(1), LinkId(1), "child", NodeId(0), &config)
            .unwrap();

        let node = scene.nodes().get(node_slot).unwrap();
        assert!(node.position.distance(anchor) <= config.spawn_radius + 1e-4);
        let link = scene.links().get(link_slot).unwrap();
        assert_eq!(link.node1, scene.node_slot(NodeId(0)).unwrap());
        assert_eq!(link.node2, node_slot);
    }

    #[test]
    fn add_neighbor_rejects_taken_link_id_without_creating_node() {
        let (mut scene, config) = scene_with_nodes(2);
        scene.add_link(LinkId(1), NodeId(0), NodeId(1)).unwrap();
        let err = scene
            .add_neighbor(NodeId(5), LinkId(1), "x", NodeId(0), &config)
            .unwrap_err();
        assert!(matches!(err, SpaceError::DuplicateId { id: 1, .. }));
        assert!(!scene.node_map().contains_remote_id(NodeId(5)));
        assert_eq!(scene.nodes().live_count(), 2);
    }

    #[test]
    fn sphere_mark_sets_palette_color() {
        let (mut scene, _) = scene_with_nodes(0);
        scene.add_sphere(SphereId(1), "s").unwrap();
        scene.set_sphere_mark(SphereId(1), 3).unwrap();
        let sphere = scene.sphere(SphereId(1)).unwrap();
        assert_eq!(sphere.mark, 3);
        assert_eq!(color_to_vec4(sphere.color), color_to_vec4(mark_color(3)));
        assert!(scene.set_sphere_mark(SphereId(2), 1).is_err());
    }

    #[test]
    fn degree_tint_keeps_hub_brightest() {
        let (mut scene, _) = scene_with_nodes(3);
        scene.add_link(LinkId(1), NodeId(0), NodeId(1)).unwrap();
        scene.add_link(LinkId(2), NodeId(0), NodeId(2)).unwrap();
        scene.apply_degree_tint();

        let hub = color_to_vec4(scene.node(NodeId(0)).unwrap().color);
        let leaf = color_to_vec4(scene.node(NodeId(1)).unwrap().color);
        assert!(hub.x > leaf.x);
        assert!((leaf.x - hub.x * 0.65).abs() < 1e-4);
    }

    #[test]
    fn bounding_box_spans_live_nodes() {
        let (scene, _) = scene_with_nodes(0);
        assert!(scene.bounding_box().is_none());

        let (scene, _) = scene_with_nodes(10);
        let (min, max) = scene.bounding_box().unwrap();
        for (_, node) in scene.nodes().iter() {
            assert!(node.position.cmpge(min).all());
            assert!(node.position.cmple(max).all());
        }
    }
}
