//! Gesture controls turning pointer input into annotations.

mod input;
mod mouse;
mod timers;
mod touch;

use std::rc::Rc;

pub use input::{Feed, InputEvent, ListenerSet, MouseButton, Touch, TouchEvent};
pub use mouse::{MouseControl, MouseState};
pub use timers::{ClockTimers, TimerId, Timers, VirtualTimers};
pub use touch::{TouchControl, TouchState};

use glam::Vec2;

use crate::annotation::MarkupPlugin;
use crate::scene::Scene;
use crate::viewport::picking::Picker;

/// Collaborators handed to a control for the duration of one event
pub struct ControlContext<'a> {
    pub plugin: &'a mut MarkupPlugin,
    pub picker: &'a dyn Picker,
    pub timers: &'a mut dyn Timers,
}

/// What a confirmed point turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Two points, origin then target
    #[default]
    Measurement,
    /// One point, confirmed in a single step
    Issue,
}

/// Common surface of the mouse and touch controls
pub trait GestureControl {
    fn activate(&mut self, ctx: &mut ControlContext<'_>);
    fn deactivate(&mut self, ctx: &mut ControlContext<'_>);
    fn is_active(&self) -> bool;
    /// Abandon the gesture in progress without unbinding
    fn reset(&mut self, ctx: &mut ControlContext<'_>);
    /// Handle an input event; unbound feeds are ignored
    fn handle(&mut self, ctx: &mut ControlContext<'_>, event: &InputEvent);
    fn on_timer(&mut self, _ctx: &mut ControlContext<'_>, _timer: TimerId) {}
    fn listeners(&self) -> &ListenerSet;
}

/// Camera navigation stays disabled while this guard lives
#[must_use]
pub struct NavigationGuard {
    scene: Rc<Scene>,
}

impl NavigationGuard {
    pub fn engage(scene: &Rc<Scene>) -> Self {
        scene.set_camera_control_active(false);
        Self {
            scene: Rc::clone(scene),
        }
    }
}

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        self.scene.set_camera_control_active(true);
    }
}

/// Per-axis distance check used for click and tap tolerance
pub(crate) fn within(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    let d = (a - b).abs();
    d.x <= tolerance && d.y <= tolerance
}
