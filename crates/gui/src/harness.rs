//! Headless harness driving the plugin and both gesture controls.
//!
//! Owns a scene, a scripted picker and virtual timers, so gestures can be
//! replayed deterministically and their plugin events inspected afterwards.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;

use crate::annotation::{MarkupPlugin, PluginEvent};
use crate::config::AppSettings;
use crate::control::{
    ControlContext, GestureControl, InputEvent, MouseButton, MouseControl, PlacementMode,
    Timers, Touch, TouchControl, TouchEvent, VirtualTimers,
};
use crate::events::Subscription;
use crate::fixtures::{self, ScriptedPicker};
use crate::scene::{Scene, SceneEvent};
use crate::viewport::picking::hover_at;
use crate::viewport::projection::OverlayContainer;

pub struct TestHarness {
    pub scene: Rc<Scene>,
    pub plugin: MarkupPlugin,
    pub picker: ScriptedPicker,
    pub timers: VirtualTimers,
    pub mouse: MouseControl,
    pub touch: TouchControl,
    fingers: Vec<Touch>,
    events: Rc<RefCell<Vec<PluginEvent>>>,
    camera_toggles: Rc<RefCell<Vec<bool>>>,
    _subscriptions: Vec<Subscription>,
}

impl TestHarness {
    /// Front camera, default settings, measurement placement, surface everywhere
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default(), PlacementMode::Measurement)
    }

    pub fn with_mode(mode: PlacementMode) -> Self {
        Self::with_settings(AppSettings::default(), mode)
    }

    pub fn with_settings(settings: AppSettings, mode: PlacementMode) -> Self {
        let scene = fixtures::front_scene();
        let picker = ScriptedPicker::everywhere(&scene.canvas_boundary());
        let mouse = MouseControl::new(settings.controls.clone(), mode);
        let touch = TouchControl::new(settings.controls.clone(), mode);
        let plugin = MarkupPlugin::with_container(
            Rc::clone(&scene),
            settings,
            OverlayContainer::aligned(),
        );

        let events = Rc::new(RefCell::new(Vec::new()));
        let camera_toggles = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        let toggles = Rc::clone(&camera_toggles);
        let subscriptions = vec![
            plugin.on(move |e| recorded.borrow_mut().push(e.clone())),
            scene.subscribe(move |e| {
                if let SceneEvent::CameraControlActive(active) = e {
                    toggles.borrow_mut().push(*active);
                }
            }),
        ];

        Self {
            scene,
            plugin,
            picker,
            timers: VirtualTimers::new(),
            mouse,
            touch,
            fingers: Vec::new(),
            events,
            camera_toggles,
            _subscriptions: subscriptions,
        }
    }

    /// Swap the picker, e.g. for one with snap vertices or holes
    pub fn set_picker(&mut self, picker: ScriptedPicker) {
        self.picker = picker;
    }

    // ── Control lifecycle ─────────────────────────────────────

    pub fn activate_mouse(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.activate(&mut ctx);
    }

    pub fn deactivate_mouse(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.deactivate(&mut ctx);
    }

    pub fn activate_touch(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.touch.activate(&mut ctx);
    }

    pub fn deactivate_touch(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.touch.deactivate(&mut ctx);
    }

    pub fn set_snapping(&mut self, snapping: bool) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.set_snapping(&mut ctx, snapping);
        self.touch.set_snapping(snapping);
    }

    // ── Input ─────────────────────────────────────────────────

    /// Route one event to both controls; each ignores feeds it has not bound
    pub fn dispatch(&mut self, event: InputEvent) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.handle(&mut ctx, &event);
        self.touch.handle(&mut ctx, &event);
    }

    pub fn hover(&mut self, x: f32, y: f32) {
        let event = hover_at(&self.picker, Vec2::new(x, y), self.mouse.snapping());
        self.dispatch(InputEvent::Hover(event));
    }

    pub fn mouse_down(&mut self, x: f32, y: f32) {
        self.dispatch(InputEvent::MouseDown {
            pos: Vec2::new(x, y),
            button: MouseButton::Left,
        });
    }

    pub fn mouse_up(&mut self, x: f32, y: f32) {
        self.dispatch(InputEvent::MouseUp {
            pos: Vec2::new(x, y),
            button: MouseButton::Left,
        });
    }

    /// Hover, press and release at the same spot
    pub fn click(&mut self, x: f32, y: f32) {
        self.hover(x, y);
        self.mouse_down(x, y);
        self.mouse_up(x, y);
    }

    pub fn touch_start(&mut self, id: u64, x: f32, y: f32) {
        let touch = Touch::new(id, x, y);
        self.fingers.retain(|t| t.id != id);
        self.fingers.push(touch);
        self.dispatch(InputEvent::TouchStart(TouchEvent {
            touches: self.fingers.clone(),
            changed: vec![touch],
        }));
    }

    pub fn touch_move(&mut self, id: u64, x: f32, y: f32) {
        let touch = Touch::new(id, x, y);
        if let Some(finger) = self.fingers.iter_mut().find(|t| t.id == id) {
            *finger = touch;
        }
        self.dispatch(InputEvent::TouchMove(TouchEvent {
            touches: self.fingers.clone(),
            changed: vec![touch],
        }));
    }

    pub fn touch_end(&mut self, id: u64, x: f32, y: f32) {
        let touch = Touch::new(id, x, y);
        self.fingers.retain(|t| t.id != id);
        self.dispatch(InputEvent::TouchEnd(TouchEvent {
            touches: self.fingers.clone(),
            changed: vec![touch],
        }));
    }

    /// Touch down and lift at once
    pub fn tap(&mut self, id: u64, x: f32, y: f32) {
        self.touch_start(id, x, y);
        self.touch_end(id, x, y);
    }

    /// Advance virtual time and deliver every timer that came due
    pub fn advance(&mut self, ms: u64) {
        self.timers.advance(Duration::from_millis(ms));
        let due = self.timers.take_due();
        for timer in due {
            let mut ctx = ControlContext {
                plugin: &mut self.plugin,
                picker: &self.picker,
                timers: &mut self.timers,
            };
            self.touch.on_timer(&mut ctx, timer);
            self.mouse.on_timer(&mut ctx, timer);
        }
    }

    /// Run the projection pass
    pub fn update(&mut self) {
        self.plugin.update();
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn events(&self) -> Vec<PluginEvent> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn count_events(&self, pred: impl Fn(&PluginEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    /// Every camera-control flag change the scene broadcast, in order
    pub fn camera_toggles(&self) -> Vec<bool> {
        self.camera_toggles.borrow().clone()
    }

    pub fn annotation_count(&self) -> usize {
        self.plugin.len()
    }

    /// Scene listeners not owned by the harness itself
    pub fn scene_listener_count(&self) -> usize {
        self.scene.listener_count().saturating_sub(1)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
