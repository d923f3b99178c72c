//! Canned collaborators for tests and scripted runs: a picker with hand-placed
//! surfaces and snap points, and a few camera setups.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use shared::ObjectId;

use crate::scene::Scene;
use crate::viewport::picking::{PickOptions, PickResult, Picker};
use crate::viewport::projection::CanvasBoundary;

/// Canvas pixels per world unit on scripted surfaces
pub const PIXELS_PER_UNIT: f32 = 100.0;

struct ScriptedSurface {
    min: Vec2,
    max: Vec2,
    entity: ObjectId,
    depth: f32,
}

/// Picker answering from a fixed list of rectangles and vertices.
///
/// A surface maps canvas `(x, y)` to world `(x / 100, -y / 100, depth)`.
/// Every pick is recorded so tests can check where and how it was asked.
#[derive(Default)]
pub struct ScriptedPicker {
    surfaces: Vec<ScriptedSurface>,
    vertices: Vec<(Vec2, Vec3, ObjectId)>,
    snap_radius: f32,
    calls: RefCell<Vec<(Vec2, PickOptions)>>,
}

impl ScriptedPicker {
    pub fn new() -> Self {
        Self {
            snap_radius: 10.0,
            ..Default::default()
        }
    }

    /// Picker where the whole canvas is one surface
    pub fn everywhere(boundary: &CanvasBoundary) -> Self {
        Self::new().with_surface(
            Vec2::ZERO,
            Vec2::new(boundary.width, boundary.height),
            "ground",
            0.0,
        )
    }

    pub fn with_surface(mut self, min: Vec2, max: Vec2, entity: &str, depth: f32) -> Self {
        self.surfaces.push(ScriptedSurface {
            min,
            max,
            entity: entity.to_string(),
            depth,
        });
        self
    }

    /// Snap target: a vertex drawn at `canvas_pos` for the world point `world_pos`
    pub fn with_vertex(mut self, canvas_pos: Vec2, world_pos: Vec3, entity: &str) -> Self {
        self.vertices.push((canvas_pos, world_pos, entity.to_string()));
        self
    }

    /// World position a surface hit at `canvas_pos` resolves to
    pub fn world_at(canvas_pos: Vec2, depth: f32) -> Vec3 {
        Vec3::new(
            canvas_pos.x / PIXELS_PER_UNIT,
            -canvas_pos.y / PIXELS_PER_UNIT,
            depth,
        )
    }

    pub fn calls(&self) -> Vec<(Vec2, PickOptions)> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Picker for ScriptedPicker {
    fn pick(&self, canvas_pos: Vec2, options: PickOptions) -> Option<PickResult> {
        self.calls.borrow_mut().push((canvas_pos, options));

        if options.snap_to_vertex {
            let nearest = self
                .vertices
                .iter()
                .filter(|(pos, _, _)| pos.distance(canvas_pos) <= self.snap_radius)
                .min_by(|a, b| {
                    a.0.distance(canvas_pos)
                        .total_cmp(&b.0.distance(canvas_pos))
                });
            if let Some((pos, world, entity)) = nearest {
                return Some(PickResult {
                    world_pos: *world,
                    entity: Some(entity.clone()),
                    canvas_pos,
                    snapped_canvas_pos: Some(*pos),
                    snapped_to_vertex: true,
                    snapped_to_edge: false,
                });
            }
        }

        if !options.pick_surface {
            return None;
        }
        self.surfaces
            .iter()
            .rev()
            .find(|s| {
                canvas_pos.x >= s.min.x
                    && canvas_pos.y >= s.min.y
                    && canvas_pos.x <= s.max.x
                    && canvas_pos.y <= s.max.y
            })
            .map(|s| {
                PickResult::surface(
                    Self::world_at(canvas_pos, s.depth),
                    canvas_pos,
                    Some(s.entity.clone()),
                )
            })
    }
}

// ── Camera setups ───────────────────────────────────────────────

/// 800 x 600 canvas at the window origin
pub fn sample_boundary() -> CanvasBoundary {
    CanvasBoundary::new(0.0, 0.0, 800.0, 600.0)
}

/// Camera on +Z looking at the origin from `distance`
pub fn front_view(distance: f32) -> Mat4 {
    Mat4::look_at_rh(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, Vec3::Y)
}

pub fn perspective(boundary: &CanvasBoundary) -> Mat4 {
    Mat4::perspective_rh_gl(45f32.to_radians(), boundary.aspect(), 0.1, 1000.0)
}

/// Identity camera: world `(0, 0, z)` lands on the canvas center
pub fn identity_scene() -> Rc<Scene> {
    Rc::new(Scene::new(sample_boundary()))
}

/// Perspective camera 10 units in front of the origin
pub fn front_scene() -> Rc<Scene> {
    let boundary = sample_boundary();
    let scene = Scene::new(boundary);
    scene.set_view_matrix(front_view(10.0));
    scene.set_proj_matrix(perspective(&boundary));
    Rc::new(scene)
}
