//! Force-directed layout: force contributors and the per-frame solver.

pub mod forces;
pub mod solver;

pub use forces::{DustAttractor, ForceField, LinkAttraction, NodeRepulsion};
pub use solver::{layout_step_system, LayoutSolver};
