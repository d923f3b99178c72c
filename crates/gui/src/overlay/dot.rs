use std::rc::Rc;

use glam::Vec2;
use shared::Color;

use super::{OverlayEvent, OverlayEventKind};
use crate::events::Observers;

/// Owner callback receiving pointer events intercepted by a dot
pub type DotCallback = Rc<dyn Fn(&OverlayEvent)>;

/// Round marker glued to one annotation anchor.
///
/// A dot is drawn only while it is visible and not culled. Both flags are set
/// independently; `revision` counts how often the drawn state actually changed.
pub struct Dot {
    pos: Vec2,
    size: f32,
    visible: bool,
    culled: bool,
    highlighted: bool,
    clickable: bool,
    fill_color: Color,
    border_color: Color,
    opacity: f32,
    revision: u64,
    owner: Option<DotCallback>,
    canvas_events: Observers<OverlayEvent>,
}

impl Dot {
    pub const MEASUREMENT_SIZE: f32 = 8.0;
    pub const ISSUE_SIZE: f32 = 18.0;
    /// Pointer distance (px) that still hits a dot
    pub const HIT_RADIUS: f32 = 14.0;

    pub fn new(size: f32, canvas_events: Observers<OverlayEvent>) -> Self {
        Self {
            pos: Vec2::ZERO,
            size,
            visible: true,
            culled: false,
            highlighted: false,
            clickable: false,
            fill_color: Color::LIGHT_GREEN,
            border_color: Color::BLACK,
            opacity: 1.0,
            revision: 0,
            owner: None,
            canvas_events,
        }
    }

    pub fn with_owner(mut self, owner: DotCallback) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        let was_shown = self.is_shown();
        self.visible = visible;
        self.touch(was_shown);
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_culled(&mut self, culled: bool) {
        if self.culled == culled {
            return;
        }
        let was_shown = self.is_shown();
        self.culled = culled;
        self.touch(was_shown);
    }

    pub fn culled(&self) -> bool {
        self.culled
    }

    fn touch(&mut self, was_shown: bool) {
        if was_shown != self.is_shown() {
            self.revision += 1;
        }
    }

    /// Drawn state: visible and not culled
    pub fn is_shown(&self) -> bool {
        self.visible && !self.culled
    }

    /// Number of times the drawn state flipped
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn set_border_color(&mut self, color: Color) {
        self.border_color = color;
    }

    pub fn border_color(&self) -> Color {
        self.border_color
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// Non-clickable dots never intercept pointer events
    pub fn set_clickable(&mut self, clickable: bool) {
        self.clickable = clickable;
    }

    pub fn clickable(&self) -> bool {
        self.clickable
    }

    pub fn hit_test(&self, canvas_pos: Vec2) -> bool {
        self.clickable && self.is_shown() && self.pos.distance(canvas_pos) <= Self::HIT_RADIUS
    }

    /// Forward an intercepted event to the owner, then re-dispatch it on the canvas.
    ///
    /// Returns false when the dot is not clickable and the event was left alone.
    pub fn dispatch(&self, event: &OverlayEvent) -> bool {
        if !self.clickable {
            return false;
        }
        if let Some(owner) = &self.owner {
            owner(event);
        }
        if event.kind != OverlayEventKind::ContextMenu {
            self.canvas_events.notify(event);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_shown_requires_visible_and_not_culled() {
        let mut dot = Dot::new(Dot::MEASUREMENT_SIZE, Observers::new());
        assert!(dot.is_shown());
        dot.set_culled(true);
        assert!(!dot.is_shown());
        dot.set_visible(false);
        dot.set_culled(false);
        assert!(!dot.is_shown());
        dot.set_visible(true);
        assert!(dot.is_shown());
    }

    #[test]
    fn test_unchanged_flags_are_noops() {
        let mut dot = Dot::new(Dot::MEASUREMENT_SIZE, Observers::new());
        dot.set_visible(true);
        dot.set_culled(false);
        assert_eq!(dot.revision(), 0);

        dot.set_culled(true);
        dot.set_culled(true);
        assert_eq!(dot.revision(), 1);

        // Already hidden by culling
        dot.set_visible(false);
        assert_eq!(dot.revision(), 1);
    }

    #[test]
    fn test_non_clickable_never_intercepts() {
        let canvas = Observers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = canvas.subscribe(move |e: &OverlayEvent| s.borrow_mut().push(e.kind));

        let dot = Dot::new(Dot::MEASUREMENT_SIZE, canvas.clone());
        let event = OverlayEvent::new(OverlayEventKind::MouseDown, Vec2::ZERO);
        assert!(!dot.hit_test(Vec2::ZERO));
        assert!(!dot.dispatch(&event));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_dispatch_forwards_and_redispatches() {
        let canvas = Observers::new();
        let redispatched = Rc::new(RefCell::new(Vec::new()));
        let r = redispatched.clone();
        let _sub = canvas.subscribe(move |e: &OverlayEvent| r.borrow_mut().push(e.kind));

        let owned = Rc::new(RefCell::new(Vec::new()));
        let o = owned.clone();
        let mut dot = Dot::new(Dot::ISSUE_SIZE, canvas.clone())
            .with_owner(Rc::new(move |e: &OverlayEvent| o.borrow_mut().push(e.kind)));
        dot.set_clickable(true);

        dot.dispatch(&OverlayEvent::new(OverlayEventKind::MouseOver, Vec2::ZERO));
        dot.dispatch(&OverlayEvent::new(OverlayEventKind::ContextMenu, Vec2::ZERO));
        dot.dispatch(&OverlayEvent::wheel(Vec2::ZERO, 1.5));

        assert_eq!(
            *owned.borrow(),
            vec![
                OverlayEventKind::MouseOver,
                OverlayEventKind::ContextMenu,
                OverlayEventKind::Wheel
            ]
        );
        assert_eq!(
            *redispatched.borrow(),
            vec![OverlayEventKind::MouseOver, OverlayEventKind::Wheel]
        );
    }

    #[test]
    fn test_hit_radius() {
        let mut dot = Dot::new(Dot::MEASUREMENT_SIZE, Observers::new());
        dot.set_clickable(true);
        dot.set_pos(Vec2::new(100.0, 100.0));
        assert!(dot.hit_test(Vec2::new(109.0, 109.0)));
        assert!(!dot.hit_test(Vec2::new(115.0, 110.0)));
    }
}
