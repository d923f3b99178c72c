//! Mouse placement: hover to preview, click to confirm.
//!
//! Transitions happen on mouse-up only, and only when the release lands within the
//! click tolerance of the press. Anything further is a camera drag and is ignored.

use glam::{Vec2, Vec3};
use shared::{AnchorParams, IssueParams, MeasurementParams, ObjectId};

use super::input::{Feed, InputEvent, ListenerSet, MouseButton};
use super::{within, ControlContext, GestureControl, PlacementMode};
use crate::annotation::{Anchor, PluginEvent, Slot};
use crate::config::ControlSettings;
use crate::overlay::{CanvasCursor, CursorIndicator, PointerLens};
use crate::viewport::picking::HoverEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseState {
    #[default]
    FirstPointExpected,
    SecondPointExpected,
}

/// Creation-time visibility of the in-progress measurement, restored while hovering
#[derive(Debug, Clone, Copy)]
struct PreviewFlags {
    wire_visible: bool,
    axis_visible: bool,
    target_visible: bool,
}

#[derive(Debug, Default)]
struct MouseSession {
    state: MouseState,
    hovering: bool,
    hover_pos: Option<Vec3>,
    hover_entity: Option<ObjectId>,
    press_pos: Option<Vec2>,
    entity: Option<ObjectId>,
    preview: Option<PreviewFlags>,
}

pub struct MouseControl {
    settings: ControlSettings,
    mode: PlacementMode,
    active: bool,
    listeners: ListenerSet,
    session: MouseSession,
    pub lens: PointerLens,
    pub cursor: CursorIndicator,
    pub canvas_cursor: CanvasCursor,
}

impl MouseControl {
    pub fn new(settings: ControlSettings, mode: PlacementMode) -> Self {
        Self {
            settings,
            mode,
            active: false,
            listeners: ListenerSet::default(),
            session: MouseSession::default(),
            lens: PointerLens::default(),
            cursor: CursorIndicator::default(),
            canvas_cursor: CanvasCursor::Default,
        }
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn state(&self) -> MouseState {
        self.session.state
    }

    pub fn hovering(&self) -> bool {
        self.session.hovering
    }

    /// Measurement placed by the first click and not yet confirmed
    pub fn in_progress(&self) -> Option<&ObjectId> {
        self.session.entity.as_ref()
    }

    pub fn snapping(&self) -> bool {
        self.settings.snapping
    }

    /// Switching snapping rebinds the hover feeds of an active control
    pub fn set_snapping(&mut self, ctx: &mut ControlContext<'_>, snapping: bool) {
        if self.settings.snapping == snapping {
            return;
        }
        self.settings.snapping = snapping;
        if self.active {
            self.deactivate(ctx);
            self.activate(ctx);
        }
    }

    fn on_hover(&mut self, ctx: &mut ControlContext<'_>, hover: &HoverEvent) {
        let Some(world_pos) = hover.world_pos else {
            return;
        };
        self.session.hovering = true;
        self.session.hover_pos = Some(world_pos);
        self.session.hover_entity = hover.entity.clone();
        self.canvas_cursor = CanvasCursor::Pointer;
        self.lens.show_at(hover.display_pos(), hover.snapped());

        let in_progress = self
            .session
            .entity
            .as_ref()
            .and_then(|id| ctx.plugin.get_mut(id));
        match in_progress {
            Some(annotation) => {
                if let Some(preview) = self.session.preview {
                    annotation.update_flags(|f| {
                        f.wire_visible = preview.wire_visible;
                        f.axis_visible = preview.axis_visible;
                        f.target_visible = preview.target_visible;
                    });
                }
                annotation.set_anchor(Slot::Target, Anchor::new(world_pos, hover.entity.clone()));
                self.cursor.hide();
            }
            None => self.cursor.show_at(hover.display_pos(), hover.snapped()),
        }
    }

    fn on_hover_off(&mut self, ctx: &mut ControlContext<'_>, hover: &HoverEvent) {
        self.session.hovering = false;
        self.session.hover_pos = None;
        self.session.hover_entity = None;
        self.cursor.hide();
        self.lens.follow(hover.canvas_pos, false);
        self.canvas_cursor = CanvasCursor::Default;

        if let Some(annotation) = self
            .session
            .entity
            .as_ref()
            .and_then(|id| ctx.plugin.get_mut(id))
        {
            annotation.update_flags(|f| {
                f.wire_visible = false;
                f.axis_visible = false;
                f.target_visible = false;
            });
        }
    }

    fn on_mouse_up(&mut self, ctx: &mut ControlContext<'_>, pos: Vec2) {
        let Some(press) = self.session.press_pos.take() else {
            return;
        };
        if !within(press, pos, self.settings.click_tolerance) {
            tracing::debug!("Mouse drag from {press} to {pos} ignored");
            return;
        }
        self.on_click(ctx);
    }

    fn on_click(&mut self, ctx: &mut ControlContext<'_>) {
        if self.mode == PlacementMode::Issue {
            if let (true, Some(pos)) = (self.session.hovering, self.session.hover_pos) {
                let anchor = AnchorParams {
                    world_pos: pos.to_array(),
                    entity: self.session.hover_entity.clone(),
                };
                ctx.plugin.create_issue(IssueParams::at(anchor));
            }
            return;
        }

        match self.session.state {
            MouseState::FirstPointExpected => {
                let (true, Some(pos)) = (self.session.hovering, self.session.hover_pos) else {
                    return;
                };
                let anchor = AnchorParams {
                    world_pos: pos.to_array(),
                    entity: self.session.hover_entity.clone(),
                };
                let id = ctx.plugin.create_measurement(MeasurementParams {
                    approximate: Some(true),
                    ..MeasurementParams::between(anchor.clone(), anchor)
                });
                if let Some(annotation) = ctx.plugin.get_mut(&id) {
                    annotation.set_clickable(false);
                    let flags = annotation.flags();
                    self.session.preview = Some(PreviewFlags {
                        wire_visible: flags.wire_visible,
                        axis_visible: flags.axis_visible,
                        target_visible: flags.target_visible,
                    });
                }
                self.session.entity = Some(id.clone());
                self.session.state = MouseState::SecondPointExpected;
                tracing::debug!("Measurement {id}: first point placed");
                ctx.plugin.emit(PluginEvent::MeasurementStart(id));
            }
            MouseState::SecondPointExpected => {
                if let Some(id) = self.session.entity.take() {
                    if self.session.hovering {
                        if let Some(annotation) = ctx.plugin.get_mut(&id) {
                            annotation.set_clickable(true);
                            tracing::debug!("Measurement {id}: completed");
                            ctx.plugin.emit(PluginEvent::MeasurementEnd(id));
                        }
                    } else {
                        cancel(ctx, id);
                    }
                }
                self.session.preview = None;
                self.session.state = MouseState::FirstPointExpected;
            }
        }
    }
}

/// Fire the cancel event, then destroy
fn cancel(ctx: &mut ControlContext<'_>, id: ObjectId) {
    if ctx.plugin.get(&id).is_none() {
        return;
    }
    tracing::debug!("Measurement {id}: cancelled");
    ctx.plugin.emit(PluginEvent::MeasurementCancel(id.clone()));
    ctx.plugin.destroy(&id);
}

impl GestureControl for MouseControl {
    fn activate(&mut self, _ctx: &mut ControlContext<'_>) {
        if self.active {
            return;
        }
        if self.settings.snapping {
            self.listeners.bind(Feed::HoverSnapOrSurface);
            self.listeners.bind(Feed::HoverSnapOrSurfaceOff);
        } else {
            self.listeners.bind(Feed::HoverSurface);
            self.listeners.bind(Feed::HoverOff);
        }
        self.listeners.bind(Feed::MouseDown);
        self.listeners.bind(Feed::MouseUp);
        self.active = true;
        tracing::debug!("Mouse control activated (snapping: {})", self.settings.snapping);
    }

    fn deactivate(&mut self, ctx: &mut ControlContext<'_>) {
        if !self.active {
            return;
        }
        self.lens.hide();
        self.reset(ctx);
        self.listeners.unbind_all();
        self.cursor.hide();
        self.canvas_cursor = CanvasCursor::Default;
        self.session.hovering = false;
        self.session.hover_pos = None;
        self.active = false;
        tracing::debug!("Mouse control deactivated");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self, ctx: &mut ControlContext<'_>) {
        if let Some(id) = self.session.entity.take() {
            cancel(ctx, id);
        }
        self.session.preview = None;
        self.session.press_pos = None;
        self.session.state = MouseState::FirstPointExpected;
    }

    fn handle(&mut self, ctx: &mut ControlContext<'_>, event: &InputEvent) {
        if !self.listeners.is_bound(event.feed()) {
            return;
        }
        match event {
            InputEvent::Hover(hover) if hover.kind.is_off() => self.on_hover_off(ctx, hover),
            InputEvent::Hover(hover) => self.on_hover(ctx, hover),
            InputEvent::MouseDown {
                pos,
                button: MouseButton::Left,
            } => self.session.press_pos = Some(*pos),
            InputEvent::MouseUp {
                pos,
                button: MouseButton::Left,
            } => self.on_mouse_up(ctx, *pos),
            _ => {}
        }
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }
}
