//! View frustum planes and the culling tests run against them.

use bevy::prelude::*;

/// Six clip planes `(n, d)` with `n · p + d >= 0` on the inside, normals unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a view-projection matrix with a `0..1` depth range.
    pub fn from_view_projection(view_projection: Mat4) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);

        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(normalize_plane);
        Self { planes }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| signed_distance(*p, point) >= 0.0)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| signed_distance(*p, center) >= -radius)
    }

    /// Conservative AABB test: may report boxes near frustum corners that are
    /// actually outside, never rejects one that intersects.
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.planes.iter().all(|p| {
            let n = p.truncate();
            let farthest = Vec3::select(n.cmpge(Vec3::ZERO), max, min);
            signed_distance(*p, farthest) >= 0.0
        })
    }
}

fn normalize_plane(plane: Vec4) -> Vec4 {
    let len = plane.truncate().length();
    if len > f32::EPSILON {
        plane / len
    } else {
        plane
    }
}

fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}
