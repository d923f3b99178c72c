//! World to canvas projection and the culling tests applied before it.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Render canvas rectangle in window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBoundary {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasBoundary {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether a window-space point lies on the canvas
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x <= self.x + self.width
            && pos.y <= self.y + self.height
    }
}

/// Layer hosting overlay markers.
///
/// `canvas_offset` is the render canvas' top-left corner relative to the container;
/// it is zero when both share the same origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayContainer {
    pub canvas_offset: Vec2,
}

impl OverlayContainer {
    /// Container aligned with the canvas
    pub fn aligned() -> Self {
        Self::default()
    }

    pub fn with_offset(left: f32, top: f32) -> Self {
        Self {
            canvas_offset: Vec2::new(left, top),
        }
    }
}

/// Half-space clipping plane.
///
/// Points behind the plane (against `dir`) are cut away.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlane {
    pub id: String,
    pub pos: Vec3,
    pub dir: Vec3,
    pub active: bool,
}

impl SectionPlane {
    pub fn new(id: impl Into<String>, pos: Vec3, dir: Vec3) -> Self {
        Self {
            id: id.into(),
            pos,
            dir,
            active: true,
        }
    }

    /// Whether `p` lies on the cut-away side
    pub fn slices(&self, p: Vec3) -> bool {
        self.active && (p - self.pos).dot(self.dir) < 0.0
    }
}

/// Why a point is not drawn, if it is not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Cut away by an active section plane
    Sliced,
    /// In front of the near threshold (behind or too close to the eye)
    BehindNear,
}

/// Camera, canvas and plane snapshot for one update pass
#[derive(Debug, Clone)]
pub struct Projector {
    pub view: Mat4,
    pub proj: Mat4,
    pub boundary: CanvasBoundary,
    pub container_offset: Vec2,
    pub planes: Vec<SectionPlane>,
    pub near_threshold: f32,
}

impl Projector {
    /// Homogeneous view-space position (w forced to 1)
    pub fn to_view(&self, world: Vec3) -> Vec4 {
        let v = self.view * world.extend(1.0);
        Vec4::new(v.x, v.y, v.z, 1.0)
    }

    pub fn to_clip(&self, view: Vec4) -> Vec4 {
        self.proj * view
    }

    /// Perspective divide and viewport map, floored to whole pixels
    pub fn clip_to_canvas(&self, clip: Vec4) -> Vec2 {
        let half_w = self.boundary.width / 2.0;
        let half_h = self.boundary.height / 2.0;
        Vec2::new(
            self.container_offset.x + ((1.0 + clip.x / clip.w) * half_w).floor(),
            self.container_offset.y + ((1.0 - clip.y / clip.w) * half_h).floor(),
        )
    }

    /// Canvas position of a world point, ignoring culling
    pub fn project(&self, world: Vec3) -> Vec2 {
        self.clip_to_canvas(self.to_clip(self.to_view(world)))
    }

    pub fn is_sliced(&self, world: Vec3) -> bool {
        self.planes.iter().any(|plane| plane.slices(world))
    }

    pub fn behind_near(&self, view: Vec4) -> bool {
        view.z > self.near_threshold
    }

    /// Section planes first, then the near threshold
    pub fn visibility(&self, world: Vec3) -> Visibility {
        if self.is_sliced(world) {
            Visibility::Sliced
        } else if self.behind_near(self.to_view(world)) {
            Visibility::BehindNear
        } else {
            Visibility::Visible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector(view: Mat4, proj: Mat4) -> Projector {
        Projector {
            view,
            proj,
            boundary: CanvasBoundary::new(0.0, 0.0, 800.0, 600.0),
            container_offset: Vec2::ZERO,
            planes: Vec::new(),
            near_threshold: -0.3,
        }
    }

    #[test]
    fn test_origin_maps_to_canvas_center() {
        let p = projector(Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(p.project(Vec3::ZERO), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_container_offset_is_added() {
        let mut p = projector(Mat4::IDENTITY, Mat4::IDENTITY);
        p.container_offset = Vec2::new(10.0, 20.0);
        assert_eq!(p.project(Vec3::ZERO), Vec2::new(410.0, 320.0));
    }

    #[test]
    fn test_floor_not_round() {
        let p = projector(Mat4::IDENTITY, Mat4::IDENTITY);
        // (1 + 0.00249) * 400 = 400.996
        let pos = p.project(Vec3::new(0.00249, -0.00249, 0.0));
        assert_eq!(pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_view_w_forced_to_one() {
        let mut view = Mat4::IDENTITY;
        view.w_axis.w = 2.0;
        let p = projector(view, Mat4::IDENTITY);
        assert_eq!(p.to_view(Vec3::new(1.0, 2.0, 3.0)).w, 1.0);
    }

    #[test]
    fn test_section_plane_half_space() {
        let plane = SectionPlane::new("p", Vec3::ZERO, Vec3::X);
        assert!(plane.slices(Vec3::new(-1.0, 0.0, 0.0)));
        assert!(!plane.slices(Vec3::new(1.0, 0.0, 0.0)));

        let mut inactive = plane.clone();
        inactive.active = false;
        assert!(!inactive.slices(Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_visibility_order() {
        let mut p = projector(Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(p.visibility(Vec3::new(0.0, 0.0, -1.0)), Visibility::Visible);
        assert_eq!(p.visibility(Vec3::new(0.0, 0.0, -0.2)), Visibility::BehindNear);

        p.planes.push(SectionPlane::new("p", Vec3::ZERO, Vec3::NEG_Z));
        // z = 0.2 is both sliced and past the near threshold
        assert_eq!(p.visibility(Vec3::new(0.0, 0.0, 0.2)), Visibility::Sliced);
    }
}
