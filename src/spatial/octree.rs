//! Loose octree over node bounding spheres.
//!
//! Entries are stored in the leaf whose octant holds their center, and every
//! tree node tracks the bounds of everything stored beneath it. Queries prune
//! on those content bounds, so an entry whose sphere spills over an octant
//! border (or outside the root box) is still found.

use bevy::prelude::*;

use super::frustum::Frustum;
use crate::core::slots::Slot;

/// Entries a leaf holds before it splits.
const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u32 = 8;
/// Half-size used for axes where the root box is flat.
const MIN_HALF_EXTENT: f32 = 0.5;

/// A node's bounding sphere snapshot at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeEntry {
    pub slot: Slot,
    pub center: Vec3,
    pub radius: f32,
}

impl OctreeEntry {
    fn min(&self) -> Vec3 {
        self.center - Vec3::splat(self.radius)
    }

    fn max(&self) -> Vec3 {
        self.center + Vec3::splat(self.radius)
    }
}

#[derive(Debug)]
struct OctreeNode {
    center: Vec3,
    half: Vec3,
    depth: u32,
    entries: Vec<OctreeEntry>,
    children: Option<Box<[OctreeNode; 8]>>,
    content: Option<(Vec3, Vec3)>,
}

impl OctreeNode {
    fn new(center: Vec3, half: Vec3, depth: u32) -> Self {
        Self {
            center,
            half,
            depth,
            entries: Vec::new(),
            children: None,
            content: None,
        }
    }

    fn octant(&self, point: Vec3) -> usize {
        (point.x >= self.center.x) as usize
            | ((point.y >= self.center.y) as usize) << 1
            | ((point.z >= self.center.z) as usize) << 2
    }

    fn grow_content(&mut self, entry: &OctreeEntry) {
        self.content = Some(match self.content {
            Some((min, max)) => (min.min(entry.min()), max.max(entry.max())),
            None => (entry.min(), entry.max()),
        });
    }

    fn insert(&mut self, entry: OctreeEntry) {
        self.grow_content(&entry);

        let i = self.octant(entry.center);
        if let Some(children) = self.children.as_mut() {
            children[i].insert(entry);
            return;
        }

        self.entries.push(entry);
        if self.entries.len() > LEAF_CAPACITY && self.depth < MAX_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let half = self.half / 2.0;
        let center = self.center;
        let depth = self.depth + 1;
        let children = std::array::from_fn(|i| {
            let sign = Vec3::new(
                if i & 1 != 0 { 1.0 } else { -1.0 },
                if i & 2 != 0 { 1.0 } else { -1.0 },
                if i & 4 != 0 { 1.0 } else { -1.0 },
            );
            OctreeNode::new(center + sign * half, half, depth)
        });
        self.children = Some(Box::new(children));

        for entry in std::mem::take(&mut self.entries) {
            let i = self.octant(entry.center);
            if let Some(children) = self.children.as_mut() {
                children[i].insert(entry);
            }
        }
    }

    fn visit<'a>(
        &'a self,
        prune: &impl Fn(Vec3, Vec3) -> bool,
        keep: &impl Fn(&OctreeEntry) -> bool,
        out: &mut Vec<&'a OctreeEntry>,
    ) {
        let Some((min, max)) = self.content else {
            return;
        };
        if !prune(min, max) {
            return;
        }
        out.extend(self.entries.iter().filter(|e| keep(*e)));
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.visit(prune, keep, out);
            }
        }
    }
}

#[derive(Debug)]
pub struct Octree {
    root: OctreeNode,
    len: usize,
}

impl Octree {
    /// Root centered at `center` spanning `extents` (full size per axis).
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        let half = (extents / 2.0).max(Vec3::splat(MIN_HALF_EXTENT));
        Self {
            root: OctreeNode::new(center, half, 0),
            len: 0,
        }
    }

    pub fn insert(&mut self, entry: OctreeEntry) {
        self.root.insert(entry);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn center(&self) -> Vec3 {
        self.root.center
    }

    pub fn half_extents(&self) -> Vec3 {
        self.root.half
    }

    /// Every entry whose bounding sphere intersects the frustum.
    pub fn find_elements_inside_frustum(&self, frustum: &Frustum) -> Vec<&OctreeEntry> {
        let mut out = Vec::new();
        self.root.visit(
            &|min, max| frustum.intersects_aabb(min, max),
            &|e: &OctreeEntry| frustum.intersects_sphere(e.center, e.radius),
            &mut out,
        );
        out
    }

    /// Every entry whose bounding sphere's box overlaps `[min, max]`.
    pub fn find_elements_inside_box(&self, min: Vec3, max: Vec3) -> Vec<&OctreeEntry> {
        let overlaps = |a_min: Vec3, a_max: Vec3| a_min.cmple(max).all() && a_max.cmpge(min).all();
        let mut out = Vec::new();
        self.root
            .visit(&overlaps, &|e: &OctreeEntry| overlaps(e.min(), e.max()), &mut out);
        out
    }
}
