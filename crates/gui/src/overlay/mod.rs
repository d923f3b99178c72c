//! 2D widgets drawn over the render canvas.

mod dot;
mod label;
mod lens;
mod wire;

use glam::Vec2;

pub use dot::{Dot, DotCallback};
pub use label::Label;
pub use lens::{CanvasCursor, CursorIndicator, PointerCircle, PointerLens};
pub use wire::Wire;

/// Pointer interaction on the overlay layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEventKind {
    MouseOver,
    MouseLeave,
    MouseDown,
    MouseUp,
    MouseMove,
    Wheel,
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayEvent {
    pub kind: OverlayEventKind,
    pub canvas_pos: Vec2,
    /// Scroll amount for `Wheel`, zero otherwise
    pub wheel_delta: f32,
}

impl OverlayEvent {
    pub fn new(kind: OverlayEventKind, canvas_pos: Vec2) -> Self {
        Self {
            kind,
            canvas_pos,
            wheel_delta: 0.0,
        }
    }

    pub fn wheel(canvas_pos: Vec2, delta: f32) -> Self {
        Self {
            kind: OverlayEventKind::Wheel,
            canvas_pos,
            wheel_delta: delta,
        }
    }
}
