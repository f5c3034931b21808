//! Force contributors. Each adds a directional delta to every unlocked live node;
//! the solver composes them additively once per step.

use bevy::prelude::*;

use crate::core::components::{SimulationLink, SimulationNode};
use crate::core::slots::{Slot, SlotArray};

/// Min distance below which a pair contributes no force (direction is undefined).
const MIN_DIST: f32 = 0.01;

pub trait ForceField: Send + Sync {
    fn apply(&mut self, nodes: &mut SlotArray<SimulationNode>, links: &SlotArray<SimulationLink>);
}

/// Ideal node spacing for `count` nodes filling `volume`: `k = cbrt(volume / count)`.
pub fn ideal_distance(volume: f32, count: usize) -> f32 {
    (volume / count.max(1) as f32).cbrt()
}

fn push_direction(nodes: &mut SlotArray<SimulationNode>, slot: Slot, delta: Vec3) {
    if let Some(node) = nodes.get_mut(slot) {
        if !node.locked {
            node.direction += delta;
        }
    }
}

/// Pairwise repulsion `f_r(d) = k² / d` between every pair of live nodes.
///
/// O(n²). Locked nodes still push others away but never move themselves.
pub struct NodeRepulsion {
    pub volume: f32,
}

impl ForceField for NodeRepulsion {
    fn apply(&mut self, nodes: &mut SlotArray<SimulationNode>, _links: &SlotArray<SimulationLink>) {
        let bodies: Vec<(Slot, Vec3)> = nodes.iter().map(|(slot, n)| (slot, n.position)).collect();
        if bodies.len() < 2 {
            return;
        }
        let k = ideal_distance(self.volume, bodies.len());
        let k2 = k * k;

        let mut deltas = vec![Vec3::ZERO; bodies.len()];
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let delta = bodies[i].1 - bodies[j].1;
                let d = delta.length();
                if d < MIN_DIST {
                    continue;
                }
                let push = delta / d * (k2 / d);
                deltas[i] += push;
                deltas[j] -= push;
            }
        }

        for ((slot, _), delta) in bodies.iter().zip(deltas) {
            push_direction(nodes, *slot, delta);
        }
    }
}

/// Spring-like pull `f_a(d) = d² / k` between the two ends of every link.
pub struct LinkAttraction {
    pub volume: f32,
}

impl ForceField for LinkAttraction {
    fn apply(&mut self, nodes: &mut SlotArray<SimulationNode>, links: &SlotArray<SimulationLink>) {
        let k = ideal_distance(self.volume, nodes.live_count());

        for (_, link) in links.iter() {
            let (Some(n1), Some(n2)) = (nodes.get(link.node1), nodes.get(link.node2)) else {
                continue;
            };
            let delta = n2.position - n1.position;
            let d = delta.length();
            if d < MIN_DIST {
                continue;
            }
            let pull = delta / d * (d * d / k);
            push_direction(nodes, link.node1, pull);
            push_direction(nodes, link.node2, -pull);
        }
    }
}

/// Weak global pull toward `center` keeping the graph from drifting away.
pub struct DustAttractor {
    pub center: Vec3,
    pub strength: f32,
    pub min_radius: f32,
    radius: f32,
}

impl DustAttractor {
    pub fn new(center: Vec3, strength: f32, min_radius: f32) -> Self {
        Self {
            center,
            strength,
            min_radius,
            radius: min_radius,
        }
    }

    /// Radius of the node cloud around the center at the last application.
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl ForceField for DustAttractor {
    fn apply(&mut self, nodes: &mut SlotArray<SimulationNode>, _links: &SlotArray<SimulationLink>) {
        let mut radius = self.min_radius;
        for (_, node) in nodes.iter_mut() {
            let offset = self.center - node.position;
            radius = radius.max(offset.length());
            if !node.locked {
                node.direction += offset * self.strength;
            }
        }
        self.radius = radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes_at(positions: &[Vec3]) -> SlotArray<SimulationNode> {
        let mut nodes = SlotArray::new();
        for (i, p) in positions.iter().enumerate() {
            nodes.add(SimulationNode::new(format!("n{i}"), *p));
        }
        nodes
    }

    #[test]
    fn ideal_distance_shrinks_with_count() {
        assert!((ideal_distance(8000.0, 1) - 20.0).abs() < 1e-4);
        assert!((ideal_distance(8000.0, 8) - 10.0).abs() < 1e-4);
        assert_eq!(ideal_distance(8000.0, 0), ideal_distance(8000.0, 1));
    }

    #[test]
    fn repulsion_pushes_pair_apart_symmetrically() {
        let mut nodes = nodes_at(&[Vec3::ZERO, Vec3::X]);
        let links = SlotArray::new();
        NodeRepulsion { volume: 8000.0 }.apply(&mut nodes, &links);

        let d0 = nodes.get(0).unwrap().direction;
        let d1 = nodes.get(1).unwrap().direction;
        assert!(d0.x < 0.0);
        assert!(d1.x > 0.0);
        assert!((d0 + d1).length() < 1e-3);
    }

    #[test]
    fn locked_node_repels_but_does_not_accumulate() {
        let mut nodes = nodes_at(&[Vec3::ZERO, Vec3::X]);
        nodes.get_mut(0).unwrap().locked = true;
        let links = SlotArray::new();
        NodeRepulsion { volume: 8000.0 }.apply(&mut nodes, &links);

        assert_eq!(nodes.get(0).unwrap().direction, Vec3::ZERO);
        assert!(nodes.get(1).unwrap().direction.x > 0.0);
    }

    #[test]
    fn coincident_nodes_contribute_nothing() {
        let mut nodes = nodes_at(&[Vec3::ONE, Vec3::ONE]);
        let links = SlotArray::new();
        NodeRepulsion { volume: 8000.0 }.apply(&mut nodes, &links);
        assert_eq!(nodes.get(0).unwrap().direction, Vec3::ZERO);
    }

    #[test]
    fn attraction_pulls_link_ends_together() {
        let mut nodes = nodes_at(&[Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), Vec3::new(9.0, 0.0, 0.0)]);
        let mut links = SlotArray::new();
        links.add(SimulationLink::new(0, 1));
        LinkAttraction { volume: 8000.0 }.apply(&mut nodes, &links);

        assert!(nodes.get(0).unwrap().direction.y > 0.0);
        assert!(nodes.get(1).unwrap().direction.y < 0.0);
        assert_eq!(nodes.get(2).unwrap().direction, Vec3::ZERO);
    }

    #[test]
    fn attraction_skips_links_to_retired_nodes() {
        let mut nodes = nodes_at(&[Vec3::ZERO, Vec3::X]);
        let mut links = SlotArray::new();
        links.add(SimulationLink::new(0, 1));
        nodes.remove(1);
        LinkAttraction { volume: 8000.0 }.apply(&mut nodes, &links);
        assert_eq!(nodes.get(0).unwrap().direction, Vec3::ZERO);
    }

    #[test]
    fn attractor_pulls_toward_center_and_tracks_radius() {
        let mut nodes = nodes_at(&[Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, -2.0, 0.0)]);
        let links = SlotArray::new();
        let mut attractor = DustAttractor::new(Vec3::ZERO, 0.1, 5.0);
        attractor.apply(&mut nodes, &links);

        assert!(nodes.get(0).unwrap().direction.x < 0.0);
        assert!(nodes.get(1).unwrap().direction.y > 0.0);
        assert_eq!(attractor.radius(), 10.0);
    }

    #[test]
    fn attractor_radius_is_floored() {
        let mut nodes = nodes_at(&[Vec3::X]);
        let links = SlotArray::new();
        let mut attractor = DustAttractor::new(Vec3::ZERO, 0.1, 5.0);
        attractor.apply(&mut nodes, &links);
        assert_eq!(attractor.radius(), 5.0);
    }
}
