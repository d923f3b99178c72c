//! Demo viewer: a box scene with measurement and issue placement on top

mod keyboard;
mod styles;
mod toolbar;
mod viewport;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use eframe::egui;
use glam::Vec3;
use pinmark_lib::annotation::{MarkupPlugin, PluginEvent};
use pinmark_lib::config::AppSettings;
use pinmark_lib::control::{
    ClockTimers, ControlContext, GestureControl, InputEvent, MouseControl, PlacementMode, Touch,
    TouchControl,
};
use pinmark_lib::events::Subscription;
use pinmark_lib::scene::{Metrics, Scene};
use pinmark_lib::viewport::camera::ArcBallCamera;
use pinmark_lib::viewport::mesh::cuboid;
use pinmark_lib::viewport::picking::MeshPicker;
use pinmark_lib::viewport::projection::{CanvasBoundary, OverlayContainer};

/// Number of plugin events kept for the status bar
const EVENT_LOG_LEN: usize = 6;

/// Which pointer device currently drives placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputDevice {
    Mouse,
    Touch,
}

pub struct PinmarkApp {
    settings: AppSettings,
    scene: Rc<Scene>,
    plugin: MarkupPlugin,
    picker: MeshPicker,
    camera: ArcBallCamera,
    timers: ClockTimers,
    mouse: MouseControl,
    touch: TouchControl,
    mode: PlacementMode,
    device: InputDevice,
    fingers: Vec<Touch>,
    section_enabled: bool,
    /// Marker the open context menu acts on
    context_target: Option<String>,
    /// Plugin events not yet applied to the view
    inbox: Rc<RefCell<Vec<PluginEvent>>>,
    event_log: VecDeque<String>,
    _subscription: Subscription,
}

impl PinmarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        styles::configure_styles(&cc.egui_ctx);

        let boundary = CanvasBoundary::new(0.0, 0.0, 800.0, 600.0);
        let scene = Rc::new(Scene::new(boundary));
        scene.set_metrics(Metrics {
            units: settings.units,
            scale: 1.0,
        });
        let plugin = MarkupPlugin::with_container(
            Rc::clone(&scene),
            settings.clone(),
            OverlayContainer::aligned(),
        );

        let inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&inbox);
        let subscription = plugin.on(move |event| sink.borrow_mut().push(event.clone()));

        let mode = PlacementMode::default();
        let mut app = Self {
            mouse: MouseControl::new(settings.controls.clone(), mode),
            touch: TouchControl::new(settings.controls.clone(), mode),
            settings,
            scene,
            plugin,
            picker: demo_picker(boundary),
            camera: ArcBallCamera::new(),
            timers: ClockTimers::new(),
            mode,
            device: InputDevice::Mouse,
            fingers: Vec::new(),
            section_enabled: false,
            context_target: None,
            inbox,
            event_log: VecDeque::new(),
            _subscription: subscription,
        };
        app.camera.sync(&app.scene);
        app.activate_current();
        app
    }

    // ── Controls ──────────────────────────────────────────────

    fn activate_current(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        match self.device {
            InputDevice::Mouse => self.mouse.activate(&mut ctx),
            InputDevice::Touch => self.touch.activate(&mut ctx),
        }
    }

    fn deactivate_all(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.deactivate(&mut ctx);
        self.touch.deactivate(&mut ctx);
    }

    fn set_device(&mut self, device: InputDevice) {
        if self.device == device {
            return;
        }
        tracing::info!("Switching placement input to {device:?}");
        self.deactivate_all();
        self.device = device;
        self.fingers.clear();
        self.activate_current();
    }

    fn set_mode(&mut self, mode: PlacementMode) {
        if self.mode == mode {
            return;
        }
        self.deactivate_all();
        self.mode = mode;
        self.mouse = MouseControl::new(self.settings.controls.clone(), mode);
        self.touch = TouchControl::new(self.settings.controls.clone(), mode);
        self.activate_current();
    }

    fn set_snapping(&mut self, snapping: bool) {
        self.settings.controls.snapping = snapping;
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.set_snapping(&mut ctx, snapping);
        self.touch.set_snapping(snapping);
    }

    /// Abandon whatever gesture is in progress
    fn reset_controls(&mut self) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.reset(&mut ctx);
        self.touch.reset(&mut ctx);
    }

    fn dispatch(&mut self, event: InputEvent) {
        let mut ctx = ControlContext {
            plugin: &mut self.plugin,
            picker: &self.picker,
            timers: &mut self.timers,
        };
        self.mouse.handle(&mut ctx, &event);
        self.touch.handle(&mut ctx, &event);
    }

    fn fire_due_timers(&mut self) {
        use pinmark_lib::control::Timers;

        for timer in self.timers.take_due() {
            let mut ctx = ControlContext {
                plugin: &mut self.plugin,
                picker: &self.picker,
                timers: &mut self.timers,
            };
            self.touch.on_timer(&mut ctx, timer);
            self.mouse.on_timer(&mut ctx, timer);
        }
    }

    // ── Plugin events ─────────────────────────────────────────

    fn drain_inbox(&mut self) {
        let events: Vec<PluginEvent> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            match &event {
                PluginEvent::MouseOver { id, .. } => {
                    if let Some(a) = self.plugin.get_mut(id) {
                        a.set_highlighted(true);
                    }
                }
                PluginEvent::MouseLeave { id, .. } => {
                    if let Some(a) = self.plugin.get_mut(id) {
                        a.set_highlighted(false);
                    }
                }
                PluginEvent::ContextMenu { id, .. } => self.context_target = Some(id.clone()),
                PluginEvent::MeasurementDestroyed(id) | PluginEvent::IssueDestroyed(id) => {
                    if self.context_target.as_ref() == Some(id) {
                        self.context_target = None;
                    }
                }
                _ => {}
            }
            if self.event_log.len() == EVENT_LOG_LEN {
                self.event_log.pop_front();
            }
            self.event_log.push_back(format!("{event:?}"));
        }
    }

    fn set_section_enabled(&mut self, enabled: bool) {
        use pinmark_lib::viewport::projection::SectionPlane;

        self.section_enabled = enabled;
        if enabled {
            self.scene
                .add_section_plane(SectionPlane::new("section", Vec3::ZERO, Vec3::X));
        } else {
            self.scene.remove_section_plane("section");
        }
    }
}

/// Floor, a block and a pillar to place markers on
fn demo_picker(boundary: CanvasBoundary) -> MeshPicker {
    let mut picker = MeshPicker::new(boundary);
    picker.add(
        "floor",
        cuboid(Vec3::new(0.0, -0.25, 0.0), Vec3::new(6.0, 0.5, 6.0), [0.55, 0.55, 0.6]),
    );
    picker.add(
        "block",
        cuboid(Vec3::new(-0.5, 0.75, 0.0), Vec3::new(2.0, 1.5, 1.5), [0.8, 0.6, 0.4]),
    );
    picker.add(
        "pillar",
        cuboid(Vec3::new(2.0, 1.25, -1.5), Vec3::new(0.6, 2.5, 0.6), [0.5, 0.7, 0.55]),
    );
    picker
}

impl eframe::App for PinmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        keyboard::handle_keyboard(ctx, self);

        // ── Toolbar ───────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                toolbar::show(ui, self);
            });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                toolbar::status_bar(ui, self);
            });

        // ── Central panel: canvas with overlays ──────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                viewport::show(ui, self);
            });

        if let Some(wait) = self.timers.next_deadline() {
            ctx.request_repaint_after(wait);
        }
    }
}
