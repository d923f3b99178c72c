use glam::Vec2;
use shared::Color;

/// Straight canvas-space segment between two projected points
#[derive(Debug, Clone)]
pub struct Wire {
    start: Vec2,
    end: Vec2,
    visible: bool,
    culled: bool,
    pub color: Color,
    pub thickness: f32,
}

impl Wire {
    pub fn new(color: Color, thickness: f32) -> Self {
        Self {
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            visible: true,
            culled: false,
            color,
            thickness,
        }
    }

    pub fn set_ends(&mut self, start: Vec2, end: Vec2) {
        self.start = start;
        self.end = end;
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// On-screen length in pixels
    pub fn canvas_length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_culled(&mut self, culled: bool) {
        self.culled = culled;
    }

    pub fn is_shown(&self) -> bool {
        self.visible && !self.culled
    }
}
