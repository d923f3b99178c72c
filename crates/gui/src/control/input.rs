//! Pointer input delivered to the gesture controls.

use glam::Vec2;

use crate::viewport::picking::{HoverEvent, HoverKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub pos: Vec2,
}

impl Touch {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, y),
        }
    }
}

/// Touches still on the surface plus those that changed in this event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchEvent {
    pub touches: Vec<Touch>,
    pub changed: Vec<Touch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Hover(HoverEvent),
    MouseDown { pos: Vec2, button: MouseButton },
    MouseUp { pos: Vec2, button: MouseButton },
    TouchStart(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
}

/// Event source a control can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    HoverSnapOrSurface,
    HoverSurface,
    HoverSnapOrSurfaceOff,
    HoverOff,
    MouseDown,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
}

impl InputEvent {
    pub fn feed(&self) -> Feed {
        match self {
            InputEvent::Hover(hover) => match hover.kind {
                HoverKind::HoverSnapOrSurface => Feed::HoverSnapOrSurface,
                HoverKind::HoverSurface => Feed::HoverSurface,
                HoverKind::HoverSnapOrSurfaceOff => Feed::HoverSnapOrSurfaceOff,
                HoverKind::HoverOff => Feed::HoverOff,
            },
            InputEvent::MouseDown { .. } => Feed::MouseDown,
            InputEvent::MouseUp { .. } => Feed::MouseUp,
            InputEvent::TouchStart(_) => Feed::TouchStart,
            InputEvent::TouchMove(_) => Feed::TouchMove,
            InputEvent::TouchEnd(_) => Feed::TouchEnd,
        }
    }
}

/// Feeds a control currently listens to
#[derive(Debug, Clone, Default)]
pub struct ListenerSet {
    feeds: Vec<Feed>,
}

impl ListenerSet {
    pub fn bind(&mut self, feed: Feed) {
        if !self.feeds.contains(&feed) {
            self.feeds.push(feed);
        }
    }

    pub fn unbind_all(&mut self) {
        self.feeds.clear();
    }

    pub fn is_bound(&self, feed: Feed) -> bool {
        self.feeds.contains(&feed)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}
