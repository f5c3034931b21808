//! Simulation entities stored in the scene slot arrays.

use bevy::prelude::*;

use super::slots::Slot;

/// Default node fill color.
pub const NODE_COLOR: Color = Color::srgb(0.95, 0.96, 0.98);
/// Default link color on both ends.
pub const LINK_COLOR: Color = Color::srgba(0.70, 0.85, 0.95, 0.6);
/// Default sphere shell color.
pub const SPHERE_COLOR: Color = Color::srgba(0.85, 0.85, 0.85, 0.25);

/// A graph node placed in 3D space.
#[derive(Debug, Clone)]
pub struct SimulationNode {
    pub label: String,
    pub position: Vec3,
    /// Direction accumulated by the force fields during the current step.
    pub direction: Vec3,
    /// Locked nodes take no part in force accumulation or integration.
    pub locked: bool,
    /// Node weight; scales the icon and pick radius.
    pub size: f32,
    pub activity: f32,
    /// Level of detail; zero hides the node from drawing and picking.
    pub lod: f32,
    pub color: Color,
    pub mark: u32,
    pub icon: Option<String>,
}

impl SimulationNode {
    pub fn new(label: impl Into<String>, position: Vec3) -> Self {
        Self {
            label: label.into(),
            position,
            direction: Vec3::ZERO,
            locked: false,
            size: 1.0,
            activity: 0.0,
            lod: 1.0,
            color: NODE_COLOR,
            mark: 0,
            icon: None,
        }
    }

    /// Radius of the node's bounding sphere for a given global icon size.
    pub fn bounding_radius(&self, icon_size: f32) -> f32 {
        icon_size * self.size / 2.0
    }
}

/// A link between two node slots. The slots are weak: the scene removes a link
/// before either endpoint is retired.
#[derive(Debug, Clone)]
pub struct SimulationLink {
    pub node1: Slot,
    pub node2: Slot,
    /// Colors at the `node1` and `node2` ends.
    pub colors: [Color; 2],
    pub activity: f32,
    pub lod: f32,
}

impl SimulationLink {
    pub fn new(node1: Slot, node2: Slot) -> Self {
        Self {
            node1,
            node2,
            colors: [LINK_COLOR; 2],
            activity: 0.0,
            lod: 1.0,
        }
    }

    pub fn touches(&self, node: Slot) -> bool {
        self.node1 == node || self.node2 == node
    }
}

/// A cluster marker grouping node slots. Center and radius are derived each tick.
#[derive(Debug, Clone)]
pub struct ClusterSphere {
    pub label: String,
    pub members: Vec<Slot>,
    pub center: Vec3,
    pub radius: f32,
    pub color: Color,
    pub mark: u32,
}

impl ClusterSphere {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
            center: Vec3::ZERO,
            radius: 1.0,
            color: SPHERE_COLOR,
            mark: 0,
        }
    }
}

/// Multiply every channel (alpha included) of a color by `tint`.
pub fn tint_color(color: Color, tint: f32) -> Color {
    let c = color.to_srgba();
    Color::srgba(c.red * tint, c.green * tint, c.blue * tint, c.alpha * tint)
}

pub fn color_to_vec4(color: Color) -> Vec4 {
    let c = color.to_srgba();
    Vec4::new(c.red, c.green, c.blue, c.alpha)
}
