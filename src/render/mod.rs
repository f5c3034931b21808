//! Render-facing state: camera, cluster shells and the per-frame draw list.

pub mod camera;
pub mod cluster;
pub mod draw;
