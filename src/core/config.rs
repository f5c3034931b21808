use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Which node shapes the draw pass emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeShapes {
    #[default]
    All,
    Colors,
    Marks,
    None,
}

/// Where link colors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Each link end takes the color of the node it touches.
    #[default]
    NodeColor,
    /// Links use their own per-end colors.
    LinkColor,
}

/// View configuration loaded from `~/.nebularc`: display toggles, icon sizes and layout tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
pub struct SpaceConfig {
    #[serde(default = "default_node_icon_size")]
    pub node_icon_size: f32,
    #[serde(default = "default_edge_size")]
    pub edge_size: f32,
    #[serde(default)]
    pub show_node_shapes: NodeShapes,
    #[serde(default = "default_true")]
    pub show_node_labels: bool,
    #[serde(default = "default_true")]
    pub show_edges: bool,
    #[serde(default)]
    pub show_edge_activity: bool,
    #[serde(default = "default_true")]
    pub show_spheres: bool,
    #[serde(default)]
    pub show_debug: bool,
    #[serde(default)]
    pub link_mode: LinkMode,
    /// Initial layout speed scale.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Radius around the anchor inside which new nodes are placed.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f32,
    /// Volume the graph should roughly fill; sets the ideal node distance.
    #[serde(default = "default_layout_volume")]
    pub layout_volume: f32,
    /// Upper bound on a node's direction magnitude after force accumulation.
    #[serde(default = "default_max_direction")]
    pub max_direction: f32,
    /// Half-width of the per-axis random jitter added every step.
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    #[serde(default = "default_attractor_strength")]
    pub attractor_strength: f32,
    #[serde(default = "default_attractor_min_radius")]
    pub attractor_min_radius: f32,
    /// Iteration budget, only enforced when `looping` is false.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Seed for node placement and layout jitter.
    #[serde(default)]
    pub seed: u64,
}

fn default_true() -> bool { true }
fn default_node_icon_size() -> f32 { 1.0 }
fn default_edge_size() -> f32 { 0.25 }
fn default_temperature() -> f32 { 0.2 }
fn default_spawn_radius() -> f32 { 2.0 }
fn default_layout_volume() -> f32 { 20.0 * 20.0 * 20.0 }
fn default_max_direction() -> f32 { 1.0 }
fn default_jitter() -> f32 { 0.01 }
fn default_attractor_strength() -> f32 { 0.05 }
fn default_attractor_min_radius() -> f32 { 5.0 }
fn default_max_iterations() -> u32 { 100 }

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            node_icon_size: default_node_icon_size(),
            edge_size: default_edge_size(),
            show_node_shapes: NodeShapes::default(),
            show_node_labels: true,
            show_edges: true,
            show_edge_activity: false,
            show_spheres: true,
            show_debug: false,
            link_mode: LinkMode::default(),
            temperature: default_temperature(),
            spawn_radius: default_spawn_radius(),
            layout_volume: default_layout_volume(),
            max_direction: default_max_direction(),
            jitter: default_jitter(),
            attractor_strength: default_attractor_strength(),
            attractor_min_radius: default_attractor_min_radius(),
            max_iterations: default_max_iterations(),
            looping: true,
            seed: 0,
        }
    }
}

impl SpaceConfig {
    /// Replace tuning values the layout cannot use with their defaults.
    /// A negative jitter is taken by magnitude.
    pub fn sanitized(mut self) -> Self {
        fn positive_or(value: f32, fallback: f32) -> f32 {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        }

        self.jitter = if self.jitter.is_finite() { self.jitter.abs() } else { default_jitter() };
        self.temperature = if self.temperature.is_finite() {
            self.temperature.max(0.0)
        } else {
            default_temperature()
        };
        self.max_direction = positive_or(self.max_direction, default_max_direction());
        self.layout_volume = positive_or(self.layout_volume, default_layout_volume());
        self.spawn_radius = positive_or(self.spawn_radius, default_spawn_radius());
        self
    }
}

/// Attempts to load the configuration from `~/.nebularc`.
/// Falls back to default if the file is missing or invalid.
pub fn load_config() -> SpaceConfig {
    if let Ok(home) = env::var("HOME") {
        let path = PathBuf::from(home).join(".nebularc");
        if let Ok(contents) = fs::read_to_string(path) {
            match toml::from_str(&contents) {
                Ok(config) => return SpaceConfig::sanitized(config),
                Err(err) => {
                    warn!("[CONFIG] Failed to parse ~/.nebularc: {}", err);
                }
            }
        }
    }
    SpaceConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let config = SpaceConfig::default();
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.spawn_radius, 2.0);
        assert_eq!(config.layout_volume, 8000.0);
        assert!(config.looping);
        assert_eq!(config.link_mode, LinkMode::NodeColor);
        assert_eq!(config.show_node_shapes, NodeShapes::All);
    }

    #[test]
    fn toml_roundtrip() {
        let config = SpaceConfig {
            node_icon_size: 3.0,
            link_mode: LinkMode::LinkColor,
            show_node_shapes: NodeShapes::Marks,
            seed: 42,
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: SpaceConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.node_icon_size, 3.0);
        assert_eq!(parsed.link_mode, LinkMode::LinkColor);
        assert_eq!(parsed.show_node_shapes, NodeShapes::Marks);
        assert_eq!(parsed.seed, 42);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let minimal = r#"
temperature = 0.5
link_mode = "link_color"
"#;
        let parsed: SpaceConfig = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.temperature, 0.5);
        assert_eq!(parsed.link_mode, LinkMode::LinkColor);
        assert_eq!(parsed.spawn_radius, 2.0);
        assert_eq!(parsed.max_iterations, 100);
        assert!(parsed.show_edges);
    }

    #[test]
    fn sanitized_repairs_unusable_tuning() {
        let config: SpaceConfig = toml::from_str(
            "jitter = -0.02\nmax_direction = 0.0\nlayout_volume = -5.0\ntemperature = -1.0",
        )
        .unwrap();
        let config = config.sanitized();
        assert_eq!(config.jitter, 0.02);
        assert_eq!(config.max_direction, 1.0);
        assert_eq!(config.layout_volume, 8000.0);
        assert_eq!(config.temperature, 0.0);

        let config = SpaceConfig { jitter: f32::NAN, ..Default::default() }.sanitized();
        assert_eq!(config.jitter, 0.01);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        // Just asserts it doesn't panic and yields a usable config.
        let config = load_config();
        assert!(config.node_icon_size > 0.0);
    }
}
