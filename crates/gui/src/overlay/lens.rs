//! Pointer feedback owned by the gesture controls. None of it is authoritative state.

use glam::Vec2;

/// Magnifier following the pointer while placing points
#[derive(Debug, Clone, PartialEq)]
pub struct PointerLens {
    pub visible: bool,
    pub canvas_pos: Vec2,
    pub snapped: bool,
    pub zoom: f32,
}

impl Default for PointerLens {
    fn default() -> Self {
        Self {
            visible: false,
            canvas_pos: Vec2::ZERO,
            snapped: false,
            zoom: 2.0,
        }
    }
}

impl PointerLens {
    pub fn follow(&mut self, canvas_pos: Vec2, snapped: bool) {
        self.canvas_pos = canvas_pos;
        self.snapped = snapped;
    }

    pub fn show_at(&mut self, canvas_pos: Vec2, snapped: bool) {
        self.follow(canvas_pos, snapped);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.snapped = false;
    }
}

/// Dot showing where a click would place a point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorIndicator {
    pub visible: bool,
    pub canvas_pos: Vec2,
    /// Drawn as a snap marker instead of a plain surface dot
    pub snapped: bool,
}

impl CursorIndicator {
    pub fn show_at(&mut self, canvas_pos: Vec2, snapped: bool) {
        self.visible = true;
        self.canvas_pos = canvas_pos;
        self.snapped = snapped;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Ring drawn under a finger while a long press is pending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerCircle {
    pub visible: bool,
    pub canvas_pos: Vec2,
}

impl PointerCircle {
    pub fn start(&mut self, canvas_pos: Vec2) {
        self.visible = true;
        self.canvas_pos = canvas_pos;
    }

    pub fn stop(&mut self) {
        self.visible = false;
    }
}

/// Mouse cursor shape requested for the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasCursor {
    #[default]
    Default,
    Pointer,
}
