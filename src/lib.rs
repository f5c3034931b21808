//! Nebula: simulation core of a 3D graph space view. Library for testing and reuse.

pub mod core;
pub mod input;
pub mod io;
pub mod layout;
pub mod render;
pub mod spatial;

use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::core::config::SpaceConfig;
use crate::core::scene::SpaceScene;
use input::events::{graph_event_system, view_event_system, GraphEvent, ViewEvent};
use io::headless::{dispatch_script_system, headless_export_system, HeadlessRun, PendingScript};
use layout::{layout_step_system, LayoutSolver};
use render::camera::{camera_animation_system, SpaceCamera};
use render::cluster::cluster_bounds_system;
use spatial::SceneOctree;

/// Installs the scene resources and the per-frame pipeline:
/// graph events, view events, layout step, cluster bounds, camera animation.
///
/// A `SpaceConfig` inserted before the plugin is used as-is; otherwise defaults apply.
pub struct SpacePlugin;

impl Plugin for SpacePlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SpaceConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(SpaceScene::new(config.seed))
            .insert_resource(LayoutSolver::from_config(&config))
            .insert_resource(config)
            .init_resource::<SceneOctree>()
            .init_resource::<SpaceCamera>()
            .add_message::<GraphEvent>()
            .add_message::<ViewEvent>()
            .add_systems(
                Update,
                (
                    graph_event_system,
                    view_event_system,
                    layout_step_system,
                    cluster_bounds_system,
                    camera_animation_system,
                )
                    .chain(),
            );
    }
}

/// Command line of the headless runner: `nebula <script.json|-> [--ticks N] [--export PATH]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub script: PathBuf,
    pub ticks: u32,
    pub export_path: Option<PathBuf>,
}

const DEFAULT_TICKS: u32 = 100;

pub fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<RunArgs, String> {
    let mut script = None;
    let mut ticks = DEFAULT_TICKS;
    let mut export_path = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = args.next().ok_or("--ticks needs a value")?;
                ticks = value
                    .parse()
                    .map_err(|_| format!("invalid tick count '{}'", value))?;
            }
            "--export" => {
                export_path = Some(PathBuf::from(args.next().ok_or("--export needs a path")?));
            }
            _ if script.is_none() => script = Some(PathBuf::from(arg.as_str())),
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
    }

    Ok(RunArgs {
        script: script.ok_or("usage: nebula <script.json|-> [--ticks N] [--export PATH]")?,
        ticks,
        export_path,
    })
}

/// Build and run the headless app.
pub fn run() -> AppExit {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return AppExit::error();
        }
    };
    let script = match io::script::load_script(&args.script) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("Failed to load script {}: {}", args.script.display(), err);
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(crate::core::config::load_config())
        .add_plugins(SpacePlugin)
        .insert_resource(PendingScript(script))
        .insert_resource(HeadlessRun {
            ticks: args.ticks,
            export_path: args.export_path,
        })
        .add_systems(
            Update,
            (
                dispatch_script_system.before(graph_event_system),
                headless_export_system.after(camera_animation_system),
            ),
        )
        .run()
}
