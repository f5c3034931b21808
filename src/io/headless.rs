//! Headless run: replay a script, step the simulation for a fixed number of
//! frames, export a snapshot and exit.

use std::path::PathBuf;

use bevy::prelude::*;

use super::script::ScriptStep;
use super::snapshot::SceneSnapshot;
use crate::core::config::SpaceConfig;
use crate::core::error::Result;
use crate::core::scene::SpaceScene;
use crate::input::events::{report_error, GraphEvent, ViewEvent};
use crate::layout::LayoutSolver;
use crate::render::camera::SpaceCamera;
use crate::render::draw::visible_node_slots;
use crate::spatial::SceneOctree;

/// CLI configuration for the headless runner.
#[derive(Resource, Debug, Clone)]
pub struct HeadlessRun {
    /// Frames to simulate before exporting.
    pub ticks: u32,
    /// Snapshot destination; stdout when absent.
    pub export_path: Option<PathBuf>,
}

/// Script steps not yet sent. Drained on the first frame.
#[derive(Resource, Default)]
pub struct PendingScript(pub Vec<ScriptStep>);

pub fn dispatch_script_system(
    mut pending: ResMut<PendingScript>,
    mut graph: MessageWriter<GraphEvent>,
    mut view: MessageWriter<ViewEvent>,
) {
    if pending.0.is_empty() {
        return;
    }
    info!("[HEADLESS] Dispatching {} script steps", pending.0.len());
    for step in pending.0.drain(..) {
        match step {
            ScriptStep::Graph(event) => {
                graph.write(event);
            }
            ScriptStep::View(event) => {
                view.write(event);
            }
        }
    }
}

fn export(run: &HeadlessRun, snapshot: &SceneSnapshot) -> Result<()> {
    match &run.export_path {
        Some(path) => {
            snapshot.save_to_path(path)?;
            info!("[HEADLESS] Snapshot written to {}", path.display());
        }
        None => println!("{}", snapshot.to_json()?),
    }
    Ok(())
}

/// Counts frames and, once `ticks` have run, exports the scene and requests exit.
#[allow(clippy::too_many_arguments)]
pub fn headless_export_system(
    mut frames: Local<u32>,
    run: Res<HeadlessRun>,
    scene: Res<SpaceScene>,
    config: Res<SpaceConfig>,
    solver: Res<LayoutSolver>,
    camera: Res<SpaceCamera>,
    octree: Res<SceneOctree>,
    mut exit: MessageWriter<AppExit>,
) {
    *frames += 1;
    if *frames < run.ticks.max(1) {
        return;
    }

    let visible = visible_node_slots(&scene, &config, &camera, &octree);
    let snapshot = SceneSnapshot::capture(&scene, solver.iterations(), &visible);
    match export(&run, &snapshot) {
        Ok(()) => {
            info!("[HEADLESS] Export complete after {} frames, exiting", *frames);
            exit.write(AppExit::Success);
        }
        Err(err) => {
            report_error("snapshot export", &err);
            exit.write(AppExit::error());
        }
    }
}
