//! Inbound notifications: graph mutations from the model and view-global controls.
//!
//! Both arrive as bevy messages and are applied in order at the start of the
//! frame, before the layout step. A failing event is logged and skipped.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::widget::WidgetCommand;
use crate::core::attributes::{AttributeType, AttributeValue};
use crate::core::config::{LinkMode, SpaceConfig};
use crate::core::error::{Result, SpaceError};
use crate::core::identity::{LinkId, NodeId, SphereId};
use crate::core::scene::SpaceScene;
use crate::layout::LayoutSolver;
use crate::render::camera::SpaceCamera;
use crate::spatial::SceneOctree;

#[derive(Message, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    AddNode {
        id: NodeId,
        #[serde(default)]
        label: String,
    },
    RemoveNode {
        id: NodeId,
    },
    SetNodeAttribute {
        id: NodeId,
        name: String,
        #[serde(rename = "type")]
        ty: AttributeType,
        value: String,
    },
    SetNodeLabel {
        id: NodeId,
        label: String,
    },
    SetNodeMark {
        id: NodeId,
        mark: u32,
    },
    SetNodeWeight {
        id: NodeId,
        weight: f32,
    },
    AddLink {
        id: LinkId,
        from: NodeId,
        to: NodeId,
    },
    RemoveLink {
        id: LinkId,
    },
    SetLinkAttribute {
        id: LinkId,
        name: String,
        #[serde(rename = "type")]
        ty: AttributeType,
        value: String,
    },
    AddSphere {
        id: SphereId,
        #[serde(default)]
        label: String,
    },
    RemoveSphere {
        id: SphereId,
    },
    SetSphereMark {
        id: SphereId,
        mark: u32,
    },
    TagNode {
        node: NodeId,
        sphere: SphereId,
    },
    /// Create `node` next to the existing `neighbor`, joined by `link`.
    AddNeighbor {
        node: NodeId,
        link: LinkId,
        #[serde(default)]
        label: String,
        neighbor: NodeId,
    },
}

#[derive(Message, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    SetAttribute {
        name: String,
        #[serde(rename = "type")]
        ty: AttributeType,
        value: String,
    },
    Widget {
        command: String,
    },
}

pub fn apply_graph_event(scene: &mut SpaceScene, config: &SpaceConfig, event: &GraphEvent) -> Result<()> {
    match event {
        GraphEvent::AddNode { id, label } => scene.add_node(*id, label, config).map(drop),
        GraphEvent::RemoveNode { id } => scene.remove_node(*id),
        GraphEvent::SetNodeAttribute { id, name, ty, value } => {
            scene.set_node_attribute(*id, name, *ty, value)
        }
        GraphEvent::SetNodeLabel { id, label } => scene.set_node_label(*id, label),
        GraphEvent::SetNodeMark { id, mark } => scene.set_node_mark(*id, *mark),
        GraphEvent::SetNodeWeight { id, weight } => scene.set_node_weight(*id, *weight),
        GraphEvent::AddLink { id, from, to } => scene.add_link(*id, *from, *to).map(drop),
        GraphEvent::RemoveLink { id } => scene.remove_link(*id),
        GraphEvent::SetLinkAttribute { id, name, ty, value } => {
            scene.set_link_attribute(*id, name, *ty, value)
        }
        GraphEvent::AddSphere { id, label } => scene.add_sphere(*id, label).map(drop),
        GraphEvent::RemoveSphere { id } => scene.remove_sphere(*id),
        GraphEvent::SetSphereMark { id, mark } => scene.set_sphere_mark(*id, *mark),
        GraphEvent::TagNode { node, sphere } => scene.tag_node(*node, *sphere),
        GraphEvent::AddNeighbor { node, link, label, neighbor } => scene
            .add_neighbor(*node, *link, label, *neighbor, config)
            .map(drop),
    }
}

/// Everything a view-global control may touch.
pub struct ViewTargets<'a> {
    pub scene: &'a mut SpaceScene,
    pub config: &'a mut SpaceConfig,
    pub solver: &'a mut LayoutSolver,
    pub octree: &'a mut SceneOctree,
    pub camera: &'a mut SpaceCamera,
}

fn invalid_view_attribute(name: &str, ty: AttributeType) -> SpaceError {
    SpaceError::InvalidAttribute {
        kind: "view",
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

/// Apply a view-global attribute such as `space:temperature` or `space:octree:update`.
pub fn apply_view_attribute(
    targets: &mut ViewTargets<'_>,
    name: &str,
    ty: AttributeType,
    raw: &str,
) -> Result<()> {
    let value = AttributeValue::parse(ty, raw).ok_or_else(|| invalid_view_attribute(name, ty))?;

    match (name, value) {
        // Both update triggers fire on any boolean value.
        ("space:update", AttributeValue::Boolean(_)) => targets.scene.apply_degree_tint(),
        ("space:animation", AttributeValue::Boolean(animate)) => targets.camera.animate = animate,
        ("space:linkmode", AttributeValue::String(mode)) => {
            targets.config.link_mode = match mode.as_str() {
                "node_color" => LinkMode::NodeColor,
                "link_color" => LinkMode::LinkColor,
                _ => return Err(invalid_view_attribute(name, ty)),
            };
        }
        ("space:octree:update", AttributeValue::Boolean(_)) => {
            targets.octree.rebuild(targets.scene, targets.config)?;
        }
        ("space:temperature", AttributeValue::Float(t)) => targets.solver.set_temperature(t),
        ("space:nodesize", AttributeValue::Float(size)) => targets.config.node_icon_size = size,
        ("space:edgesize", AttributeValue::Float(size)) => targets.config.edge_size = size,
        _ => return Err(invalid_view_attribute(name, ty)),
    }
    Ok(())
}

pub fn apply_view_event(targets: &mut ViewTargets<'_>, event: &ViewEvent) -> Result<()> {
    match event {
        ViewEvent::SetAttribute { name, ty, value } => apply_view_attribute(targets, name, *ty, value),
        ViewEvent::Widget { command } => {
            let command: WidgetCommand = command.parse()?;
            command.apply(targets.config, targets.solver);
            Ok(())
        }
    }
}

/// Log a rejected event. Recoverable errors are expected noise from the model.
pub fn report_error(context: &str, err: &SpaceError) {
    if err.is_recoverable() {
        debug!("[SPACE] {} ignored: {}", context, err);
    } else {
        warn!("[SPACE] {} failed: {}", context, err);
    }
}

pub fn graph_event_system(
    mut events: MessageReader<GraphEvent>,
    mut scene: ResMut<SpaceScene>,
    config: Res<SpaceConfig>,
) {
    for event in events.read() {
        if let Err(err) = apply_graph_event(&mut scene, &config, event) {
            report_error("graph event", &err);
        }
    }
}

pub fn view_event_system(
    mut events: MessageReader<ViewEvent>,
    mut scene: ResMut<SpaceScene>,
    mut config: ResMut<SpaceConfig>,
    mut solver: ResMut<LayoutSolver>,
    mut octree: ResMut<SceneOctree>,
    mut camera: ResMut<SpaceCamera>,
) {
    let mut targets = ViewTargets {
        scene: &mut scene,
        config: &mut config,
        solver: &mut solver,
        octree: &mut octree,
        camera: &mut camera,
    };
    for event in events.read() {
        if let Err(err) = apply_view_event(&mut targets, event) {
            report_error("view event", &err);
        }
    }
}
