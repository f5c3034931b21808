//! Iterative force-directed layout: one step per frame while playing.

use std::time::Instant;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::forces::{DustAttractor, ForceField, LinkAttraction, NodeRepulsion};
use crate::core::config::SpaceConfig;
use crate::core::scene::SpaceScene;
use crate::core::state::PhysicsMode;

#[derive(Resource)]
pub struct LayoutSolver {
    mode: PhysicsMode,
    iterations: u32,
    /// Speed scale applied to directions during integration.
    temperature: f32,
    looping: bool,
    max_iterations: u32,
    max_direction: f32,
    jitter: f32,
    rng: ChaCha8Rng,
    repulsion: Box<dyn ForceField>,
    attraction: LinkAttraction,
    attractor: DustAttractor,
    started: Option<Instant>,
}

impl Default for LayoutSolver {
    fn default() -> Self {
        Self::from_config(&SpaceConfig::default())
    }
}

impl LayoutSolver {
    pub fn from_config(config: &SpaceConfig) -> Self {
        Self {
            mode: PhysicsMode::Pause,
            iterations: 0,
            temperature: config.temperature,
            looping: config.looping,
            max_iterations: config.max_iterations,
            max_direction: config.max_direction,
            jitter: if config.jitter.is_finite() { config.jitter.abs() } else { 0.0 },
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            repulsion: Box::new(NodeRepulsion {
                volume: config.layout_volume,
            }),
            attraction: LinkAttraction {
                volume: config.layout_volume,
            },
            attractor: DustAttractor::new(
                Vec3::ZERO,
                config.attractor_strength,
                config.attractor_min_radius,
            ),
            started: None,
        }
    }

    /// Swap the repulsion term, e.g. for a tree-accelerated approximation.
    pub fn with_repulsion(mut self, repulsion: Box<dyn ForceField>) -> Self {
        self.repulsion = repulsion;
        self
    }

    pub fn play(&mut self) {
        self.iterations = 1;
        self.mode = PhysicsMode::Play;
    }

    pub fn pause(&mut self) {
        self.mode = PhysicsMode::Pause;
    }

    pub fn mode(&self) -> PhysicsMode {
        self.mode
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        info!("[LAYOUT] Temperature : {}", temperature);
        self.temperature = temperature;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Radius of the node cloud as last seen by the dust attractor.
    pub fn attractor_radius(&self) -> f32 {
        self.attractor.radius()
    }

    fn can_step(&self) -> bool {
        self.mode == PhysicsMode::Play
            && self.iterations >= 1
            && (self.looping || self.iterations <= self.max_iterations)
    }

    /// Run one layout step. Returns false when the solver is paused or out of budget.
    pub fn step(&mut self, scene: &mut SpaceScene) -> bool {
        if !self.can_step() {
            return false;
        }
        if self.iterations == 1 {
            self.started = Some(Instant::now());
        }

        let speed = self.temperature;
        let (nodes, links) = scene.layout_parts_mut();

        for (_, node) in nodes.iter_mut() {
            if !node.locked {
                node.direction = Vec3::ZERO;
            }
        }

        // Order matters for reproducibility.
        self.repulsion.apply(nodes, links);
        self.attraction.apply(nodes, links);
        self.attractor.apply(nodes, links);

        for (_, node) in nodes.iter_mut() {
            if node.locked {
                continue;
            }
            node.direction = node.direction.clamp_length_max(self.max_direction);

            let j = self.jitter;
            if j > 0.0 {
                node.direction += Vec3::new(
                    self.rng.gen_range(-j..=j),
                    self.rng.gen_range(-j..=j),
                    self.rng.gen_range(-j..=j),
                );
            }

            node.position += speed * node.direction;
        }

        if !self.looping {
            if let Some(started) = self.started {
                let mean = started.elapsed().as_millis() / self.iterations as u128;
                let remaining = self.max_iterations.saturating_sub(self.iterations) as u128 * mean;
                debug!(
                    "[LAYOUT] Iteration {}/{}, Mean Update Time : {} ms, Estimated Remaining Time : {} ms",
                    self.iterations, self.max_iterations, mean, remaining
                );
            }
        }

        self.iterations += 1;
        true
    }
}

/// Runs one layout step per frame while in PLAY.
pub fn layout_step_system(mut solver: ResMut<LayoutSolver>, mut scene: ResMut<SpaceScene>) {
    solver.step(&mut scene);
}
