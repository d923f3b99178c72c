//! Picking seam between the gesture controls and whatever owns the geometry.
//!
//! Controls only see the [`Picker`] trait and the hover feed built on top of it.
//! [`MeshPicker`] is the implementation used by the demo viewer: ray/triangle hits
//! for surfaces plus screen-space snapping to vertices and edges.

use glam::{Mat4, Vec2, Vec3, Vec4};
use shared::ObjectId;

use super::mesh::MeshData;
use super::projection::CanvasBoundary;

/// What a pick may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickOptions {
    pub snap_to_vertex: bool,
    pub snap_to_edge: bool,
    pub pick_surface: bool,
}

impl PickOptions {
    /// Snap when near a feature, otherwise hit the surface
    pub fn snap_or_surface() -> Self {
        Self {
            snap_to_vertex: true,
            snap_to_edge: true,
            pick_surface: true,
        }
    }

    /// Surface hits only
    pub fn surface() -> Self {
        Self {
            snap_to_vertex: false,
            snap_to_edge: false,
            pick_surface: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    pub world_pos: Vec3,
    pub entity: Option<ObjectId>,
    /// Canvas position that was picked
    pub canvas_pos: Vec2,
    /// Canvas position of the snapped feature, if snapped
    pub snapped_canvas_pos: Option<Vec2>,
    pub snapped_to_vertex: bool,
    pub snapped_to_edge: bool,
}

impl PickResult {
    pub fn surface(world_pos: Vec3, canvas_pos: Vec2, entity: Option<ObjectId>) -> Self {
        Self {
            world_pos,
            entity,
            canvas_pos,
            snapped_canvas_pos: None,
            snapped_to_vertex: false,
            snapped_to_edge: false,
        }
    }

    pub fn snapped(&self) -> bool {
        self.snapped_to_vertex || self.snapped_to_edge
    }

    /// Where feedback should be drawn: the snapped feature or the pointer
    pub fn display_pos(&self) -> Vec2 {
        self.snapped_canvas_pos.unwrap_or(self.canvas_pos)
    }
}

/// Scene picking capability consumed by the gesture controls
pub trait Picker {
    fn pick(&self, canvas_pos: Vec2, options: PickOptions) -> Option<PickResult>;
}

/// Kind of a hover feed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverKind {
    HoverSnapOrSurface,
    HoverSurface,
    HoverSnapOrSurfaceOff,
    HoverOff,
}

impl HoverKind {
    pub fn is_off(self) -> bool {
        matches!(self, HoverKind::HoverSnapOrSurfaceOff | HoverKind::HoverOff)
    }
}

/// One sample of the continuous hover feed
#[derive(Debug, Clone, PartialEq)]
pub struct HoverEvent {
    pub kind: HoverKind,
    /// Hit position; `None` for the off kinds
    pub world_pos: Option<Vec3>,
    pub canvas_pos: Vec2,
    pub snapped_canvas_pos: Option<Vec2>,
    pub snapped_to_vertex: bool,
    pub snapped_to_edge: bool,
    pub entity: Option<ObjectId>,
}

impl HoverEvent {
    pub fn hit(kind: HoverKind, result: PickResult) -> Self {
        Self {
            kind,
            world_pos: Some(result.world_pos),
            canvas_pos: result.canvas_pos,
            snapped_canvas_pos: result.snapped_canvas_pos,
            snapped_to_vertex: result.snapped_to_vertex,
            snapped_to_edge: result.snapped_to_edge,
            entity: result.entity,
        }
    }

    pub fn off(kind: HoverKind, canvas_pos: Vec2) -> Self {
        Self {
            kind,
            world_pos: None,
            canvas_pos,
            snapped_canvas_pos: None,
            snapped_to_vertex: false,
            snapped_to_edge: false,
            entity: None,
        }
    }

    pub fn snapped(&self) -> bool {
        self.snapped_to_vertex || self.snapped_to_edge
    }

    pub fn display_pos(&self) -> Vec2 {
        self.snapped_canvas_pos.unwrap_or(self.canvas_pos)
    }
}

/// Turn a pointer position into a hover feed sample
pub fn hover_at(picker: &dyn Picker, canvas_pos: Vec2, snapping: bool) -> HoverEvent {
    let (options, on, off) = if snapping {
        (
            PickOptions::snap_or_surface(),
            HoverKind::HoverSnapOrSurface,
            HoverKind::HoverSnapOrSurfaceOff,
        )
    } else {
        (PickOptions::surface(), HoverKind::HoverSurface, HoverKind::HoverOff)
    };

    match picker.pick(canvas_pos, options) {
        Some(result) => HoverEvent::hit(on, result),
        None => HoverEvent::off(off, canvas_pos),
    }
}

// ── Mesh picking ──────────────────────────────────────────────

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Unproject a canvas position (relative to the canvas' top-left) into a world ray
pub fn ray_from_canvas(view: Mat4, proj: Mat4, boundary: &CanvasBoundary, canvas_pos: Vec2) -> Ray {
    let ndc_x = canvas_pos.x / boundary.width * 2.0 - 1.0;
    let ndc_y = 1.0 - canvas_pos.y / boundary.height * 2.0;

    let vp_inv = (proj * view).inverse();
    let near = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
    let far = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let near = near.truncate() / near.w;
    let far = far.truncate() / far.w;

    Ray {
        origin: near,
        direction: (far - near).normalize_or_zero(),
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Nearest triangle hit in one mesh
#[derive(Clone, Debug)]
pub struct TriangleHit {
    pub triangle_index: usize,
    pub distance: f32,
    pub point: Vec3,
}

pub fn pick_triangle(ray: &Ray, mesh: &MeshData) -> Option<TriangleHit> {
    let mut best: Option<TriangleHit> = None;
    for tri in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle_positions(tri);
        if let Some(distance) = ray_triangle_intersect(ray, v0, v1, v2) {
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(TriangleHit {
                    triangle_index: tri,
                    distance,
                    point: ray.at(distance),
                });
            }
        }
    }
    best
}

/// Closest point on segment `a..b` to `p`, as the segment parameter in [0, 1]
fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return 0.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

/// Picker over a set of named triangle meshes
pub struct MeshPicker {
    objects: Vec<(ObjectId, MeshData)>,
    view: Mat4,
    proj: Mat4,
    boundary: CanvasBoundary,
    /// Snap distance in canvas pixels
    pub snap_radius: f32,
}

impl MeshPicker {
    pub fn new(boundary: CanvasBoundary) -> Self {
        Self {
            objects: Vec::new(),
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            boundary,
            snap_radius: 10.0,
        }
    }

    pub fn add(&mut self, id: impl Into<ObjectId>, mesh: MeshData) {
        self.objects.push((id.into(), mesh));
    }

    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &MeshData)> {
        self.objects.iter().map(|(id, mesh)| (id, mesh))
    }

    pub fn set_camera(&mut self, view: Mat4, proj: Mat4, boundary: CanvasBoundary) {
        self.view = view;
        self.proj = proj;
        self.boundary = boundary;
    }

    fn to_canvas(&self, p: Vec3) -> Option<Vec2> {
        let clip = self.proj * self.view * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (1.0 + ndc.x) * self.boundary.width / 2.0,
            (1.0 - ndc.y) * self.boundary.height / 2.0,
        ))
    }

    fn surface_hit(&self, canvas_pos: Vec2) -> Option<(Vec3, ObjectId)> {
        let ray = ray_from_canvas(self.view, self.proj, &self.boundary, canvas_pos);
        self.objects
            .iter()
            .filter_map(|(id, mesh)| pick_triangle(&ray, mesh).map(|hit| (hit, id)))
            .min_by(|(a, _), (b, _)| a.distance.total_cmp(&b.distance))
            .map(|(hit, id)| (hit.point, id.clone()))
    }

    fn snap_vertex(&self, canvas_pos: Vec2) -> Option<(Vec3, Vec2, ObjectId)> {
        let mut best: Option<(f32, Vec3, Vec2, &ObjectId)> = None;
        for (id, mesh) in &self.objects {
            for i in 0..mesh.vertex_count() {
                let world = mesh.position(i);
                let Some(screen) = self.to_canvas(world) else {
                    continue;
                };
                let dist = screen.distance(canvas_pos);
                if dist <= self.snap_radius && best.as_ref().is_none_or(|b| dist < b.0) {
                    best = Some((dist, world, screen, id));
                }
            }
        }
        best.map(|(_, world, screen, id)| (world, screen, id.clone()))
    }

    fn snap_edge(&self, canvas_pos: Vec2) -> Option<(Vec3, Vec2, ObjectId)> {
        let mut best: Option<(f32, Vec3, Vec2, &ObjectId)> = None;
        for (id, mesh) in &self.objects {
            for tri in 0..mesh.triangle_count() {
                let corners = mesh.triangle_positions(tri);
                for k in 0..3 {
                    let (a, b) = (corners[k], corners[(k + 1) % 3]);
                    let (Some(sa), Some(sb)) = (self.to_canvas(a), self.to_canvas(b)) else {
                        continue;
                    };
                    let t = closest_on_segment(canvas_pos, sa, sb);
                    let screen = sa.lerp(sb, t);
                    let dist = screen.distance(canvas_pos);
                    if dist <= self.snap_radius && best.as_ref().is_none_or(|b| dist < b.0) {
                        best = Some((dist, a.lerp(b, t), screen, id));
                    }
                }
            }
        }
        best.map(|(_, world, screen, id)| (world, screen, id.clone()))
    }
}

impl Picker for MeshPicker {
    fn pick(&self, canvas_pos: Vec2, options: PickOptions) -> Option<PickResult> {
        if options.snap_to_vertex {
            if let Some((world, screen, id)) = self.snap_vertex(canvas_pos) {
                return Some(PickResult {
                    world_pos: world,
                    entity: Some(id),
                    canvas_pos,
                    snapped_canvas_pos: Some(screen),
                    snapped_to_vertex: true,
                    snapped_to_edge: false,
                });
            }
        }
        if options.snap_to_edge {
            if let Some((world, screen, id)) = self.snap_edge(canvas_pos) {
                return Some(PickResult {
                    world_pos: world,
                    entity: Some(id),
                    canvas_pos,
                    snapped_canvas_pos: Some(screen),
                    snapped_to_vertex: false,
                    snapped_to_edge: true,
                });
            }
        }
        if options.pick_surface {
            return self
                .surface_hit(canvas_pos)
                .map(|(world, id)| PickResult::surface(world, canvas_pos, Some(id)));
        }
        None
    }
}
