//! Touch placement: quick tap or long press per point.
//!
//! Each point is confirmed either by a quick tap (lift before the long-press timer,
//! surface pick at the lift position) or by a long press (timer fires first, then the
//! candidate point follows the finger until lift). Camera navigation is disabled from
//! the long-press fire until the finger lifts.

use std::time::Duration;

use glam::Vec2;
use shared::{AnchorParams, IssueParams, MeasurementParams, ObjectId};

use super::input::{Feed, InputEvent, ListenerSet, Touch, TouchEvent};
use super::timers::TimerId;
use super::{within, ControlContext, GestureControl, NavigationGuard, PlacementMode};
use crate::annotation::{Anchor, PluginEvent, Slot};
use crate::config::ControlSettings;
use crate::overlay::{PointerCircle, PointerLens};
use crate::viewport::picking::{PickOptions, PickResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchState {
    #[default]
    OriginTouchStart,
    OriginQuickEnd,
    OriginLongEnd,
    TargetTouchStart,
    TargetQuickEnd,
    TargetLongEnd,
    Canceling,
}

impl TouchState {
    /// A finger is down and being followed
    fn tracking(self) -> bool {
        matches!(
            self,
            TouchState::OriginQuickEnd
                | TouchState::OriginLongEnd
                | TouchState::TargetQuickEnd
                | TouchState::TargetLongEnd
        )
    }
}

#[derive(Default)]
struct TouchSession {
    state: TouchState,
    touch_id: Option<u64>,
    start: Vec2,
    current: Vec2,
    end: Vec2,
    timer: Option<TimerId>,
    entity: Option<ObjectId>,
    navigation: Option<NavigationGuard>,
}

pub struct TouchControl {
    settings: ControlSettings,
    mode: PlacementMode,
    active: bool,
    listeners: ListenerSet,
    session: TouchSession,
    pub lens: PointerLens,
    pub pointer_circle: PointerCircle,
}

impl TouchControl {
    pub fn new(settings: ControlSettings, mode: PlacementMode) -> Self {
        Self {
            settings,
            mode,
            active: false,
            listeners: ListenerSet::default(),
            session: TouchSession::default(),
            lens: PointerLens::default(),
            pointer_circle: PointerCircle::default(),
        }
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn state(&self) -> TouchState {
        self.session.state
    }

    pub fn in_progress(&self) -> Option<&ObjectId> {
        self.session.entity.as_ref()
    }

    /// Start, latest and lift positions of the current gesture
    pub fn positions(&self) -> (Vec2, Vec2, Vec2) {
        (self.session.start, self.session.current, self.session.end)
    }

    pub fn timer_pending(&self) -> bool {
        self.session.timer.is_some()
    }

    pub fn snapping(&self) -> bool {
        self.settings.snapping
    }

    /// Takes effect from the next pick; a gesture in progress keeps running
    pub fn set_snapping(&mut self, snapping: bool) {
        if self.settings.snapping != snapping {
            tracing::debug!("Touch snapping: {snapping}");
            self.settings.snapping = snapping;
        }
    }

    /// Options for long-press picks: vertex and edge snapping follow the setting
    fn drag_pick_options(&self) -> PickOptions {
        if self.settings.snapping {
            PickOptions::snap_or_surface()
        } else {
            PickOptions::surface()
        }
    }

    fn set_state(&mut self, state: TouchState) {
        if self.session.state != state {
            tracing::debug!("Touch {:?} -> {:?}", self.session.state, state);
            self.session.state = state;
        }
    }

    fn within_tolerance(&self, pos: Vec2) -> bool {
        within(self.session.start, pos, self.settings.touch_tolerance)
    }

    fn clear_timer(&mut self, ctx: &mut ControlContext<'_>) {
        if let Some(timer) = self.session.timer.take() {
            ctx.timers.cancel(timer);
        }
        self.pointer_circle.stop();
    }

    /// Drop the navigation guard and force navigation back on
    fn release_navigation(&mut self, ctx: &mut ControlContext<'_>) {
        drop(self.session.navigation.take());
        ctx.plugin.scene().set_camera_control_active(true);
    }

    fn enter_canceling(&mut self, ctx: &mut ControlContext<'_>) {
        self.clear_timer(ctx);
        self.lens.hide();
        self.set_state(TouchState::Canceling);
    }

    fn existing_entity(&self, ctx: &ControlContext<'_>) -> Option<ObjectId> {
        self.session
            .entity
            .clone()
            .filter(|id| ctx.plugin.get(id).is_some())
    }

    fn show_lens(&mut self, pos: Vec2, hit: Option<&PickResult>) {
        match hit {
            Some(hit) => self.lens.show_at(hit.display_pos(), hit.snapped()),
            None => self.lens.show_at(pos, false),
        }
    }

    // ── Entity helpers ────────────────────────────────────────

    /// Origin-only entity that is not clickable until confirmed
    fn create_provisional(&mut self, ctx: &mut ControlContext<'_>, hit: &PickResult) {
        let anchor = AnchorParams {
            world_pos: hit.world_pos.to_array(),
            entity: hit.entity.clone(),
        };
        let id = match self.mode {
            PlacementMode::Measurement => {
                let id = ctx.plugin.create_measurement(MeasurementParams {
                    target_visible: Some(false),
                    wire_visible: Some(false),
                    axis_visible: Some(false),
                    labels_visible: Some(false),
                    approximate: Some(true),
                    ..MeasurementParams::between(anchor.clone(), anchor)
                });
                ctx.plugin.emit(PluginEvent::MeasurementStart(id.clone()));
                id
            }
            PlacementMode::Issue => ctx.plugin.create_issue(IssueParams::at(anchor)),
        };
        if let Some(annotation) = ctx.plugin.get_mut(&id) {
            annotation.set_clickable(false);
        }
        tracing::debug!("Provisional annotation {id} placed");
        self.session.entity = Some(id);
    }

    fn move_anchor(&self, ctx: &mut ControlContext<'_>, slot: Slot, hit: &PickResult) {
        let labels_visible = ctx.plugin.settings().defaults.labels_visible;
        let Some(annotation) = self
            .session
            .entity
            .as_ref()
            .and_then(|id| ctx.plugin.get_mut(id))
        else {
            return;
        };
        annotation.set_anchor(slot, Anchor::new(hit.world_pos, hit.entity.clone()));
        if slot == Slot::Target {
            annotation.update_flags(|f| {
                f.target_visible = true;
                f.wire_visible = true;
                f.labels_visible = labels_visible;
            });
        }
    }

    /// Make the in-progress entity permanent and forget it
    fn finalize(&mut self, ctx: &mut ControlContext<'_>) {
        let Some(id) = self.session.entity.take() else {
            return;
        };
        let defaults = &ctx.plugin.settings().defaults;
        let (axis_visible, labels_visible) = (defaults.axis_visible, defaults.labels_visible);
        let Some(annotation) = ctx.plugin.get_mut(&id) else {
            return;
        };
        let is_measurement = annotation.is_measurement();
        annotation.update_flags(|f| {
            if is_measurement {
                f.target_visible = true;
                f.wire_visible = true;
                f.labels_visible = labels_visible;
                f.axis_visible = axis_visible;
            }
            f.clickable = true;
        });
        tracing::debug!("Annotation {id} confirmed");
        if is_measurement {
            ctx.plugin.emit(PluginEvent::MeasurementEnd(id));
        }
    }

    /// Fire the cancel event for the in-progress entity and destroy it
    fn cancel_entity(&mut self, ctx: &mut ControlContext<'_>) {
        let Some(id) = self.session.entity.take() else {
            return;
        };
        let Some(annotation) = ctx.plugin.get(&id) else {
            return;
        };
        if annotation.is_measurement() {
            ctx.plugin.emit(PluginEvent::MeasurementCancel(id.clone()));
        }
        tracing::debug!("Annotation {id} cancelled");
        ctx.plugin.destroy(&id);
    }

    // ── Event handlers ────────────────────────────────────────

    fn on_touch_start(&mut self, ctx: &mut ControlContext<'_>, event: &TouchEvent) {
        if event.touches.len() > 1 {
            self.enter_canceling(ctx);
            return;
        }
        let Some(touch) = event.changed.first().or(event.touches.first()).copied() else {
            return;
        };

        let next = match self.session.state {
            TouchState::OriginTouchStart => TouchState::OriginQuickEnd,
            TouchState::TargetTouchStart => TouchState::TargetQuickEnd,
            TouchState::Canceling => return,
            _ => {
                self.enter_canceling(ctx);
                return;
            }
        };

        self.clear_timer(ctx);
        self.session.touch_id = Some(touch.id);
        self.session.start = touch.pos;
        self.session.current = touch.pos;
        let delay = Duration::from_millis(self.settings.long_touch_timeout_ms);
        self.session.timer = Some(ctx.timers.schedule(delay));
        self.pointer_circle.start(touch.pos);
        self.set_state(next);
    }

    /// Tracked touch among the changed ones; mismatches cancel the gesture
    fn tracked_touch(&mut self, ctx: &mut ControlContext<'_>, event: &TouchEvent) -> Option<Touch> {
        if !self.session.state.tracking() {
            return None;
        }
        let touch = event.changed.first().copied()?;
        if self.session.touch_id != Some(touch.id) {
            tracing::debug!("Touch id {} does not match the tracked touch", touch.id);
            self.enter_canceling(ctx);
            return None;
        }
        Some(touch)
    }

    fn on_touch_move(&mut self, ctx: &mut ControlContext<'_>, event: &TouchEvent) {
        if event.touches.len() > 1 {
            self.enter_canceling(ctx);
            return;
        }
        let Some(touch) = self.tracked_touch(ctx, event) else {
            return;
        };

        self.session.current = touch.pos;
        if self.session.timer.is_some() && !self.within_tolerance(touch.pos) {
            self.clear_timer(ctx);
        }

        let slot = match self.session.state {
            TouchState::OriginLongEnd => Slot::Origin,
            TouchState::TargetLongEnd => Slot::Target,
            _ => return,
        };
        let hit = ctx.picker.pick(touch.pos, self.drag_pick_options());
        self.show_lens(touch.pos, hit.as_ref());
        let Some(hit) = hit else {
            return;
        };

        if slot == Slot::Origin && self.existing_entity(ctx).is_none() {
            self.create_provisional(ctx, &hit);
        } else {
            self.move_anchor(ctx, slot, &hit);
        }
    }

    fn on_long_press(&mut self, ctx: &mut ControlContext<'_>) {
        let pos = self.session.current;
        if !self.within_tolerance(pos) {
            return;
        }

        match self.session.state {
            TouchState::OriginQuickEnd => {
                self.session.navigation = Some(NavigationGuard::engage(ctx.plugin.scene()));
                let hit = ctx.picker.pick(pos, self.drag_pick_options());
                self.show_lens(pos, hit.as_ref());
                if let Some(hit) = hit {
                    self.create_provisional(ctx, &hit);
                }
                self.set_state(TouchState::OriginLongEnd);
            }
            TouchState::TargetQuickEnd => {
                if self.existing_entity(ctx).is_none() {
                    tracing::debug!("Long press fired without an in-progress entity");
                    return;
                }
                self.session.navigation = Some(NavigationGuard::engage(ctx.plugin.scene()));
                let hit = ctx.picker.pick(pos, self.drag_pick_options());
                self.show_lens(pos, hit.as_ref());
                if let Some(hit) = hit {
                    self.move_anchor(ctx, Slot::Target, &hit);
                }
                self.set_state(TouchState::TargetLongEnd);
            }
            _ => {}
        }
    }

    fn on_touch_end(&mut self, ctx: &mut ControlContext<'_>, event: &TouchEvent) {
        if self.session.state == TouchState::Canceling {
            if event.touches.is_empty() {
                self.finish_canceling(ctx);
            }
            return;
        }
        if event.changed.len() != 1 {
            return;
        }
        let Some(touch) = self.tracked_touch(ctx, event) else {
            if self.session.state == TouchState::Canceling && event.touches.is_empty() {
                self.finish_canceling(ctx);
            }
            return;
        };

        self.clear_timer(ctx);
        self.session.end = touch.pos;
        let inside = self.within_tolerance(touch.pos);

        let next = match self.session.state {
            TouchState::OriginQuickEnd if !inside => TouchState::OriginTouchStart,
            TouchState::OriginQuickEnd => match ctx.picker.pick(touch.pos, PickOptions::surface()) {
                Some(hit) => {
                    self.create_provisional(ctx, &hit);
                    self.after_origin(ctx)
                }
                None => TouchState::OriginTouchStart,
            },
            TouchState::OriginLongEnd => {
                self.lens.hide();
                if self.existing_entity(ctx).is_some() {
                    self.after_origin(ctx)
                } else {
                    TouchState::OriginTouchStart
                }
            }
            TouchState::TargetQuickEnd if !inside => TouchState::TargetTouchStart,
            TouchState::TargetQuickEnd => {
                match ctx.picker.pick(touch.pos, PickOptions::surface()) {
                    Some(hit) => {
                        self.move_anchor(ctx, Slot::Target, &hit);
                        self.finalize(ctx);
                    }
                    None => self.cancel_entity(ctx),
                }
                TouchState::OriginTouchStart
            }
            TouchState::TargetLongEnd => {
                self.lens.hide();
                let target_shown = self
                    .existing_entity(ctx)
                    .and_then(|id| ctx.plugin.get(&id).map(|a| a.flags().target_visible))
                    .unwrap_or(false);
                if target_shown {
                    self.finalize(ctx);
                } else {
                    self.cancel_entity(ctx);
                }
                TouchState::OriginTouchStart
            }
            _ => return,
        };

        self.session.touch_id = None;
        self.release_navigation(ctx);
        self.set_state(next);
    }

    /// State after the origin is confirmed: wait for the target, or done for issues
    fn after_origin(&mut self, ctx: &mut ControlContext<'_>) -> TouchState {
        match self.mode {
            PlacementMode::Measurement => TouchState::TargetTouchStart,
            PlacementMode::Issue => {
                self.finalize(ctx);
                TouchState::OriginTouchStart
            }
        }
    }

    fn finish_canceling(&mut self, ctx: &mut ControlContext<'_>) {
        self.cancel_entity(ctx);
        self.session.touch_id = None;
        self.release_navigation(ctx);
        self.set_state(TouchState::OriginTouchStart);
    }
}

impl GestureControl for TouchControl {
    fn activate(&mut self, _ctx: &mut ControlContext<'_>) {
        if self.active {
            return;
        }
        self.listeners.bind(Feed::TouchStart);
        self.listeners.bind(Feed::TouchMove);
        self.listeners.bind(Feed::TouchEnd);
        self.active = true;
        tracing::debug!("Touch control activated");
    }

    fn deactivate(&mut self, ctx: &mut ControlContext<'_>) {
        if !self.active {
            return;
        }
        self.listeners.unbind_all();
        self.reset(ctx);
        ctx.plugin.scene().set_camera_control_active(true);
        self.active = false;
        tracing::debug!("Touch control deactivated");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self, ctx: &mut ControlContext<'_>) {
        self.clear_timer(ctx);
        self.lens.hide();
        self.cancel_entity(ctx);
        drop(self.session.navigation.take());
        self.session.touch_id = None;
        self.set_state(TouchState::OriginTouchStart);
    }

    fn handle(&mut self, ctx: &mut ControlContext<'_>, event: &InputEvent) {
        if !self.listeners.is_bound(event.feed()) {
            return;
        }
        match event {
            InputEvent::TouchStart(touches) => self.on_touch_start(ctx, touches),
            InputEvent::TouchMove(touches) => self.on_touch_move(ctx, touches),
            InputEvent::TouchEnd(touches) => self.on_touch_end(ctx, touches),
            _ => {}
        }
    }

    fn on_timer(&mut self, ctx: &mut ControlContext<'_>, timer: TimerId) {
        if self.session.timer != Some(timer) {
            return;
        }
        self.session.timer = None;
        self.pointer_circle.stop();
        self.on_long_press(ctx);
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }
}
