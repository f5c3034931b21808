//! JSON export of the arranged scene.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::identity::{LinkId, NodeId, SphereId};
use crate::core::scene::SpaceScene;
use crate::core::slots::Slot;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SerializedColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl SerializedColor {
    pub fn from_bevy(color: &Color) -> Self {
        let srgba = color.to_srgba();
        Self {
            r: srgba.red,
            g: srgba.green,
            b: srgba.blue,
            a: srgba.alpha,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedNode {
    pub id: NodeId,
    pub label: String,
    pub position: [f32; 3],
    pub locked: bool,
    pub size: f32,
    pub mark: u32,
    pub color: SerializedColor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedLink {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedSphere {
    pub id: SphereId,
    pub label: String,
    pub center: [f32; 3],
    pub radius: f32,
    pub members: Vec<NodeId>,
}

/// Scene state at export time, entries sorted by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SceneSnapshot {
    pub nodes: Vec<SerializedNode>,
    pub links: Vec<SerializedLink>,
    pub spheres: Vec<SerializedSphere>,
    /// Layout iterations run so far.
    #[serde(default)]
    pub iterations: u32,
    /// Nodes inside the camera frustum.
    #[serde(default)]
    pub visible_nodes: Vec<NodeId>,
}

impl SceneSnapshot {
    pub fn capture(scene: &SpaceScene, iterations: u32, visible: &[Slot]) -> Self {
        let mut nodes: Vec<SerializedNode> = scene
            .node_map()
            .iter()
            .filter_map(|(id, slot)| {
                let node = scene.nodes().get(slot)?;
                Some(SerializedNode {
                    id,
                    label: node.label.clone(),
                    position: node.position.to_array(),
                    locked: node.locked,
                    size: node.size,
                    mark: node.mark,
                    color: SerializedColor::from_bevy(&node.color),
                })
            })
            .collect();
        nodes.sort_by_key(|n| n.id);

        let mut links: Vec<SerializedLink> = scene
            .link_map()
            .iter()
            .filter_map(|(id, slot)| {
                let link = scene.links().get(slot)?;
                Some(SerializedLink {
                    id,
                    from: scene.node_id(link.node1)?,
                    to: scene.node_id(link.node2)?,
                })
            })
            .collect();
        links.sort_by_key(|l| l.id);

        let mut spheres: Vec<SerializedSphere> = scene
            .sphere_map()
            .iter()
            .filter_map(|(id, slot)| {
                let sphere = scene.spheres().get(slot)?;
                Some(SerializedSphere {
                    id,
                    label: sphere.label.clone(),
                    center: sphere.center.to_array(),
                    radius: sphere.radius,
                    members: sphere.members.iter().filter_map(|s| scene.node_id(*s)).collect(),
                })
            })
            .collect();
        spheres.sort_by_key(|s| s.id);

        let mut visible_nodes: Vec<NodeId> = visible.iter().filter_map(|s| scene.node_id(*s)).collect();
        visible_nodes.sort();

        Self {
            nodes,
            links,
            spheres,
            iterations,
            visible_nodes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
