use glam::{Mat4, Vec2, Vec3};

use super::picking::{ray_from_canvas, Ray};
use super::projection::CanvasBoundary;
use crate::scene::Scene;

/// Arc-ball camera for the demo viewport
#[derive(Debug, Clone)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 8.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 100.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = self.right_vector() * dx + self.up_vector() * dy;
        self.target += offset;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(self.distance * cp * sy, self.distance * sp, self.distance * cp * cy)
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 200.0)
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        self.right_vector().cross(fwd).normalize_or_zero()
    }

    /// Cast a ray from a canvas position into the scene
    pub fn screen_ray(&self, canvas_pos: Vec2, boundary: &CanvasBoundary) -> Ray {
        ray_from_canvas(
            self.view_matrix(),
            self.projection_matrix(boundary.aspect()),
            boundary,
            canvas_pos,
        )
    }

    /// Push both matrices to the scene, which marks annotations dirty
    pub fn sync(&self, scene: &Scene) {
        let view = self.view_matrix();
        let proj = self.projection_matrix(scene.canvas_boundary().aspect());
        if scene.view_matrix() != view {
            scene.set_view_matrix(view);
        }
        if scene.proj_matrix() != proj {
            scene.set_proj_matrix(proj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = ArcBallCamera::new();
        cam.rotate(0.0, 500.0);
        assert!(cam.pitch <= 1.5);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = ArcBallCamera::new();
        let boundary = CanvasBoundary::new(0.0, 0.0, 800.0, 600.0);
        let ray = cam.screen_ray(Vec2::new(400.0, 300.0), &boundary);
        let to_target = (cam.target - cam.eye_position()).normalize();
        assert!(ray.direction.dot(to_target) > 0.999);
    }

    #[test]
    fn test_sync_skips_unchanged_matrices() {
        use std::cell::Cell;
        use std::rc::Rc;

        let scene = Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0));
        let cam = ArcBallCamera::new();
        cam.sync(&scene);

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _sub = scene.subscribe(move |_| c.set(c.get() + 1));
        cam.sync(&scene);
        assert_eq!(count.get(), 0);
    }
}
