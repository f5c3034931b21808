//! Perspective camera for the 3D space: matrices, frustum, picking rays and orbit.

use bevy::prelude::*;

use crate::layout::LayoutSolver;
use crate::spatial::Frustum;

#[derive(Resource, Debug, Clone)]
pub struct SpaceCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    pub animate: bool,
    /// Most recent picking ray, drawn when debug display is on.
    pub last_pick: Option<Ray3d>,
    elapsed: f32,
}

impl Default for SpaceCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 1024.0,
            viewport: Vec2::new(1280.0, 720.0),
            animate: false,
            last_pick: None,
            elapsed: 0.0,
        }
    }
}

impl SpaceCamera {
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.view_projection())
    }

    /// World-space ray through pixel `(x, y)`, origin on the near plane.
    /// `None` for a degenerate viewport.
    pub fn create_ray(&self, x: f32, y: f32) -> Option<Ray3d> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.viewport.y;

        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }

    /// Advance the orbit by `dt` seconds around a cloud of the given radius.
    pub fn orbit(&mut self, dt: f32, cloud_radius: f32) {
        self.elapsed += dt;
        let t = self.elapsed;
        let r = cloud_radius * (0.4 + 0.25 * (t / 30.0).cos());
        self.position = Vec3::new(r * (t / 10.0).cos(), r * (t / 50.0).cos(), r * (t / 10.0).sin());
        self.target = Vec3::ZERO;
    }
}

pub fn camera_animation_system(
    time: Res<Time>,
    solver: Res<LayoutSolver>,
    mut camera: ResMut<SpaceCamera>,
) {
    if !camera.animate {
        return;
    }
    camera.orbit(time.delta_secs(), solver.attractor_radius());
}
