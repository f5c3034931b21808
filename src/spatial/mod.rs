//! Visibility culling: frustum planes and the node octree.

pub mod frustum;
pub mod octree;

use bevy::prelude::*;

pub use frustum::Frustum;
pub use octree::{Octree, OctreeEntry};

use crate::core::config::SpaceConfig;
use crate::core::error::{Result, SpaceError};
use crate::core::scene::SpaceScene;
use crate::core::slots::Slot;

/// Build an octree over the live nodes' current bounding spheres.
pub fn build_octree(scene: &SpaceScene, config: &SpaceConfig) -> Result<Octree> {
    let (min, max) = scene.bounding_box().ok_or(SpaceError::EmptyGraph)?;
    let mut tree = Octree::new((min + max) / 2.0, max - min);
    for (slot, node) in scene.nodes().iter() {
        tree.insert(OctreeEntry {
            slot,
            center: node.position,
            radius: node.bounding_radius(config.node_icon_size),
        });
    }
    Ok(tree)
}

/// The last index built. Stale between rebuilds; queries drop retired slots.
#[derive(Resource, Default)]
pub struct SceneOctree(pub Option<Octree>);

impl SceneOctree {
    /// Rebuild from the scene. On failure the previous index is kept.
    pub fn rebuild(&mut self, scene: &SpaceScene, config: &SpaceConfig) -> Result<()> {
        let tree = build_octree(scene, config)?;
        info!(
            "[OCTREE] Rebuilt with {} entries, extents {:?}",
            tree.len(),
            tree.half_extents() * 2.0
        );
        self.0 = Some(tree);
        Ok(())
    }

    /// Live node slots whose indexed bounds intersect `frustum`, or `None` before the first build.
    pub fn visible_nodes(&self, scene: &SpaceScene, frustum: &Frustum) -> Option<Vec<Slot>> {
        let tree = self.0.as_ref()?;
        Some(
            tree.find_elements_inside_frustum(frustum)
                .into_iter()
                .map(|e| e.slot)
                .filter(|slot| scene.nodes().is_live(*slot))
                .collect(),
        )
    }
}
