//! Viewer state consumed by the annotation core.
//!
//! The scene owns what a renderer would normally own: camera matrices, the canvas
//! boundary, section planes, unit metrics and the camera-navigation flag. Every setter
//! notifies `events` so annotations can mark themselves dirty.

use std::cell::{Cell, RefCell};

use glam::{Mat4, Vec2};

use crate::config::Units;
use crate::events::{Observers, Subscription};
use crate::overlay::OverlayEvent;
use crate::viewport::projection::{CanvasBoundary, Projector, SectionPlane};

/// Scene change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    ViewMatrix,
    ProjMatrix,
    CanvasBoundary,
    SectionPlanes,
    Metrics,
    CameraControlActive(bool),
}

/// Unit system plus the world-to-unit scale applied to measured lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub units: Units,
    pub scale: f32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            units: Units::Meters,
            scale: 1.0,
        }
    }
}

pub struct Scene {
    view: Cell<Mat4>,
    proj: Cell<Mat4>,
    boundary: Cell<CanvasBoundary>,
    section_planes: RefCell<Vec<SectionPlane>>,
    metrics: Cell<Metrics>,
    camera_control_active: Cell<bool>,
    events: Observers<SceneEvent>,
    canvas_events: Observers<OverlayEvent>,
}

impl Scene {
    pub fn new(boundary: CanvasBoundary) -> Self {
        Self {
            view: Cell::new(Mat4::IDENTITY),
            proj: Cell::new(Mat4::IDENTITY),
            boundary: Cell::new(boundary),
            section_planes: RefCell::new(Vec::new()),
            metrics: Cell::new(Metrics::default()),
            camera_control_active: Cell::new(true),
            events: Observers::new(),
            canvas_events: Observers::new(),
        }
    }

    // ── Camera ────────────────────────────────────────────────

    pub fn view_matrix(&self) -> Mat4 {
        self.view.get()
    }

    pub fn set_view_matrix(&self, view: Mat4) {
        self.view.set(view);
        self.events.notify(&SceneEvent::ViewMatrix);
    }

    pub fn proj_matrix(&self) -> Mat4 {
        self.proj.get()
    }

    pub fn set_proj_matrix(&self, proj: Mat4) {
        self.proj.set(proj);
        self.events.notify(&SceneEvent::ProjMatrix);
    }

    // ── Canvas ────────────────────────────────────────────────

    pub fn canvas_boundary(&self) -> CanvasBoundary {
        self.boundary.get()
    }

    pub fn set_canvas_boundary(&self, boundary: CanvasBoundary) {
        if self.boundary.get() == boundary {
            return;
        }
        self.boundary.set(boundary);
        self.events.notify(&SceneEvent::CanvasBoundary);
    }

    // ── Section planes ────────────────────────────────────────

    pub fn section_planes(&self) -> Vec<SectionPlane> {
        self.section_planes.borrow().clone()
    }

    pub fn add_section_plane(&self, plane: SectionPlane) {
        {
            let mut planes = self.section_planes.borrow_mut();
            planes.retain(|p| p.id != plane.id);
            planes.push(plane);
        }
        self.events.notify(&SceneEvent::SectionPlanes);
    }

    /// Remove a plane; returns false if no plane had that id
    pub fn remove_section_plane(&self, id: &str) -> bool {
        let removed = {
            let mut planes = self.section_planes.borrow_mut();
            let before = planes.len();
            planes.retain(|p| p.id != id);
            planes.len() != before
        };
        if removed {
            self.events.notify(&SceneEvent::SectionPlanes);
        }
        removed
    }

    pub fn set_section_plane_active(&self, id: &str, active: bool) -> bool {
        let changed = {
            let mut planes = self.section_planes.borrow_mut();
            match planes.iter_mut().find(|p| p.id == id) {
                Some(plane) if plane.active != active => {
                    plane.active = active;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.events.notify(&SceneEvent::SectionPlanes);
        }
        changed
    }

    pub fn clear_section_planes(&self) {
        let had_planes = !self.section_planes.borrow().is_empty();
        self.section_planes.borrow_mut().clear();
        if had_planes {
            self.events.notify(&SceneEvent::SectionPlanes);
        }
    }

    // ── Metrics ───────────────────────────────────────────────

    pub fn metrics(&self) -> Metrics {
        self.metrics.get()
    }

    pub fn set_metrics(&self, metrics: Metrics) {
        self.metrics.set(metrics);
        self.events.notify(&SceneEvent::Metrics);
    }

    // ── Camera navigation ─────────────────────────────────────

    pub fn camera_control_active(&self) -> bool {
        self.camera_control_active.get()
    }

    /// Toggle camera navigation; notifies only on an actual change
    pub fn set_camera_control_active(&self, active: bool) {
        if self.camera_control_active.replace(active) != active {
            tracing::debug!("Camera control active: {active}");
            self.events.notify(&SceneEvent::CameraControlActive(active));
        }
    }

    // ── Notifications ─────────────────────────────────────────

    pub fn subscribe(&self, callback: impl Fn(&SceneEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    /// Event target that overlay markers re-dispatch pointer events onto
    pub fn canvas_events(&self) -> &Observers<OverlayEvent> {
        &self.canvas_events
    }

    /// Number of listeners currently attached to the scene
    pub fn listener_count(&self) -> usize {
        self.events.len() + self.canvas_events.len()
    }

    /// Snapshot of the current camera, canvas and planes for one update pass
    pub fn projector(&self, container_offset: Vec2, near_threshold: f32) -> Projector {
        Projector {
            view: self.view.get(),
            proj: self.proj.get(),
            boundary: self.boundary.get(),
            container_offset,
            planes: self.section_planes(),
            near_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::rc::Rc;

    fn recording(scene: &Scene) -> (Rc<RefCell<Vec<SceneEvent>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let sub = scene.subscribe(move |e| l.borrow_mut().push(*e));
        (log, sub)
    }

    #[test]
    fn test_setters_notify() {
        let scene = Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0));
        let (log, _sub) = recording(&scene);

        scene.set_view_matrix(Mat4::IDENTITY);
        scene.set_proj_matrix(Mat4::IDENTITY);
        scene.set_canvas_boundary(CanvasBoundary::new(0.0, 0.0, 1024.0, 768.0));
        scene.add_section_plane(SectionPlane::new("p", Vec3::ZERO, Vec3::X));

        assert_eq!(
            *log.borrow(),
            vec![
                SceneEvent::ViewMatrix,
                SceneEvent::ProjMatrix,
                SceneEvent::CanvasBoundary,
                SceneEvent::SectionPlanes
            ]
        );
    }

    #[test]
    fn test_camera_control_notifies_on_change_only() {
        let scene = Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0));
        let (log, _sub) = recording(&scene);

        scene.set_camera_control_active(true);
        scene.set_camera_control_active(false);
        scene.set_camera_control_active(false);
        scene.set_camera_control_active(true);

        assert_eq!(
            *log.borrow(),
            vec![
                SceneEvent::CameraControlActive(false),
                SceneEvent::CameraControlActive(true)
            ]
        );
    }

    #[test]
    fn test_section_plane_edits() {
        let scene = Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0));
        scene.add_section_plane(SectionPlane::new("a", Vec3::ZERO, Vec3::Y));
        scene.add_section_plane(SectionPlane::new("a", Vec3::ONE, Vec3::Y));
        assert_eq!(scene.section_planes().len(), 1);

        assert!(scene.set_section_plane_active("a", false));
        assert!(!scene.set_section_plane_active("a", false));
        assert!(!scene.remove_section_plane("missing"));
        assert!(scene.remove_section_plane("a"));
        assert!(scene.section_planes().is_empty());
    }

    #[test]
    fn test_listener_count_tracks_subscriptions() {
        let scene = Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0));
        let a = scene.subscribe(|_| {});
        let b = scene.canvas_events().subscribe(|_| {});
        assert_eq!(scene.listener_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(scene.listener_count(), 0);
    }
}
