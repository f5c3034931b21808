//! Text commands sent by the view's control widget.

use std::str::FromStr;

use bevy::prelude::*;

use crate::core::config::{NodeShapes, SpaceConfig};
use crate::core::error::SpaceError;
use crate::layout::LayoutSolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCommand {
    Play,
    Pause,
    ShowNodes { shapes: NodeShapes, labels: bool },
    ShowEdges(bool),
    ShowSpheres(bool),
    ShowDebug(bool),
}

impl FromStr for WidgetCommand {
    type Err = SpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let command = match words.as_slice() {
            ["play"] => WidgetCommand::Play,
            ["pause"] => WidgetCommand::Pause,
            ["show", "node", what] => {
                let (shapes, labels) = match *what {
                    "all" => (NodeShapes::All, true),
                    "colors+labels" => (NodeShapes::Colors, true),
                    "marks+labels" => (NodeShapes::Marks, true),
                    "colors+marks" => (NodeShapes::All, false),
                    "colors" => (NodeShapes::Colors, false),
                    "marks" => (NodeShapes::Marks, false),
                    "labels" => (NodeShapes::None, true),
                    "none" => (NodeShapes::None, false),
                    _ => return Err(unknown(s)),
                };
                WidgetCommand::ShowNodes { shapes, labels }
            }
            [verb @ ("show" | "hide"), what] => {
                let on = *verb == "show";
                match *what {
                    "edges" => WidgetCommand::ShowEdges(on),
                    "spheres" => WidgetCommand::ShowSpheres(on),
                    "debug" => WidgetCommand::ShowDebug(on),
                    _ => return Err(unknown(s)),
                }
            }
            _ => return Err(unknown(s)),
        };
        Ok(command)
    }
}

fn unknown(command: &str) -> SpaceError {
    SpaceError::InvalidAttribute {
        kind: "widget",
        name: command.to_string(),
        ty: "command".to_string(),
    }
}

impl WidgetCommand {
    pub fn apply(self, config: &mut SpaceConfig, solver: &mut LayoutSolver) {
        match self {
            WidgetCommand::Play => {
                info!("[LAYOUT] Play");
                solver.play();
            }
            WidgetCommand::Pause => {
                info!("[LAYOUT] Pause");
                solver.pause();
            }
            WidgetCommand::ShowNodes { shapes, labels } => {
                config.show_node_shapes = shapes;
                config.show_node_labels = labels;
            }
            WidgetCommand::ShowEdges(on) => config.show_edges = on,
            WidgetCommand::ShowSpheres(on) => config.show_spheres = on,
            WidgetCommand::ShowDebug(on) => config.show_debug = on,
        }
    }
}
