use glam::Vec2;
use shared::Color;

/// Text tag placed next to a wire
#[derive(Debug, Clone)]
pub struct Label {
    pos: Vec2,
    text: String,
    visible: bool,
    culled: bool,
    pub color: Color,
}

impl Label {
    pub fn new(color: Color) -> Self {
        Self {
            pos: Vec2::ZERO,
            text: String::new(),
            visible: true,
            culled: false,
            color,
        }
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
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
