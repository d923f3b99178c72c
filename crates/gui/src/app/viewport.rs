//! Canvas panel: camera navigation, input routing and overlay painting

use egui::{Color32, Pos2, Rect, Stroke, Ui};
use glam::Vec2;
use pinmark_lib::annotation::{Annotation, Part, Slot};
use pinmark_lib::control::{InputEvent, MouseButton, Touch, TouchEvent};
use pinmark_lib::overlay::{CanvasCursor, OverlayEvent, OverlayEventKind};
use pinmark_lib::viewport::picking::{hover_at, HoverEvent, HoverKind};
use pinmark_lib::viewport::projection::{CanvasBoundary, Projector};

use super::styles::{self, color32};
use super::{InputDevice, PinmarkApp};

const LIGHT_DIR: glam::Vec3 = glam::Vec3::new(0.4, 0.8, 0.45);

pub fn show(ui: &mut Ui, app: &mut PinmarkApp) {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

    app.scene.set_canvas_boundary(CanvasBoundary::new(
        rect.min.x,
        rect.min.y,
        rect.width(),
        rect.height(),
    ));

    // ── Camera navigation ────────────────────────────────────
    if app.scene.camera_control_active() {
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            app.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            app.camera.pan(-delta.x * 0.01, delta.y * 0.01);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                app.camera.zoom(scroll * 0.01);
            }
        }
    }
    app.camera.sync(&app.scene);
    let boundary = app.scene.canvas_boundary();
    app.picker.set_camera(
        app.scene.view_matrix(),
        app.scene.proj_matrix(),
        boundary,
    );

    // ── Input ────────────────────────────────────────────────
    route_input(ui, app, rect);
    app.fire_due_timers();
    app.drain_inbox();

    response.context_menu(|ui| context_menu(ui, app));

    // ── Paint ────────────────────────────────────────────────
    app.plugin.update();
    if !ui.is_rect_visible(rect) {
        return;
    }
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, styles::CANVAS_BACKGROUND);
    let projector = app
        .scene
        .projector(glam::Vec2::ZERO, app.settings.controls.near_threshold);
    paint_meshes(&painter, rect, app, &projector);
    for annotation in app.plugin.iter() {
        paint_annotation(&painter, rect, annotation);
    }
    paint_pointer_feedback(&painter, rect, app);

    if app.mouse.canvas_cursor == CanvasCursor::Pointer && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }
}

fn to_canvas(rect: Rect, pos: Pos2) -> Vec2 {
    Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y)
}

fn to_screen(rect: Rect, pos: Vec2) -> Pos2 {
    Pos2::new(rect.min.x + pos.x, rect.min.y + pos.y)
}

fn route_input(ui: &Ui, app: &mut PinmarkApp, rect: Rect) {
    let events = ui.input(|i| i.events.clone());
    for event in events {
        match event {
            egui::Event::Touch { id, phase, pos, .. } => {
                app.set_device(InputDevice::Touch);
                let touch = Touch::new(id.0, pos.x - rect.min.x, pos.y - rect.min.y);
                route_touch(app, touch, phase, rect.contains(pos));
            }
            _ if app.device == InputDevice::Touch => {}
            egui::Event::PointerMoved(pos) => {
                let canvas_pos = to_canvas(rect, pos);
                if rect.contains(pos) {
                    app.plugin.dispatch_marker_event(&OverlayEvent::new(
                        OverlayEventKind::MouseMove,
                        canvas_pos,
                    ));
                    let hover = hover_at(&app.picker, canvas_pos, app.mouse.snapping());
                    app.dispatch(InputEvent::Hover(hover));
                } else {
                    app.dispatch(InputEvent::Hover(hover_off(app, canvas_pos)));
                }
            }
            egui::Event::PointerGone => {
                let last = app.mouse.cursor.canvas_pos;
                app.dispatch(InputEvent::Hover(hover_off(app, last)));
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } if rect.contains(pos) => {
                let canvas_pos = to_canvas(rect, pos);
                let button = match button {
                    egui::PointerButton::Primary => MouseButton::Left,
                    egui::PointerButton::Secondary => MouseButton::Right,
                    _ => MouseButton::Middle,
                };
                let kind = match (button, pressed) {
                    (MouseButton::Right, true) => OverlayEventKind::ContextMenu,
                    (_, true) => OverlayEventKind::MouseDown,
                    (_, false) => OverlayEventKind::MouseUp,
                };
                if kind == OverlayEventKind::ContextMenu {
                    app.context_target = None;
                }
                app.plugin
                    .dispatch_marker_event(&OverlayEvent::new(kind, canvas_pos));
                let input = if pressed {
                    InputEvent::MouseDown {
                        pos: canvas_pos,
                        button,
                    }
                } else {
                    InputEvent::MouseUp {
                        pos: canvas_pos,
                        button,
                    }
                };
                app.dispatch(input);
            }
            _ => {}
        }
    }
}

fn hover_off(app: &PinmarkApp, canvas_pos: Vec2) -> HoverEvent {
    let kind = if app.mouse.snapping() {
        HoverKind::HoverSnapOrSurfaceOff
    } else {
        HoverKind::HoverOff
    };
    HoverEvent::off(kind, canvas_pos)
}

fn route_touch(app: &mut PinmarkApp, touch: Touch, phase: egui::TouchPhase, inside: bool) {
    match phase {
        egui::TouchPhase::Start => {
            if !inside {
                return;
            }
            app.fingers.retain(|t| t.id != touch.id);
            app.fingers.push(touch);
            app.dispatch(InputEvent::TouchStart(TouchEvent {
                touches: app.fingers.clone(),
                changed: vec![touch],
            }));
        }
        egui::TouchPhase::Move => {
            let Some(finger) = app.fingers.iter_mut().find(|t| t.id == touch.id) else {
                return;
            };
            *finger = touch;
            app.dispatch(InputEvent::TouchMove(TouchEvent {
                touches: app.fingers.clone(),
                changed: vec![touch],
            }));
        }
        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
            if !app.fingers.iter().any(|t| t.id == touch.id) {
                return;
            }
            app.fingers.retain(|t| t.id != touch.id);
            app.dispatch(InputEvent::TouchEnd(TouchEvent {
                touches: app.fingers.clone(),
                changed: vec![touch],
            }));
        }
    }
}

fn context_menu(ui: &mut Ui, app: &mut PinmarkApp) {
    let Some(id) = app.context_target.clone() else {
        ui.label("No marker here");
        return;
    };
    ui.label(egui::RichText::new(&id).monospace().small());
    if let Some(length) = app.plugin.length(&id) {
        let units = app.scene.metrics().units;
        ui.label(format!(
            "{:.prec$} {}",
            length,
            units.abbrev(),
            prec = app.settings.labels.precision
        ));
    }
    ui.separator();
    if ui.button("Delete").clicked() {
        app.plugin.destroy(&id);
        app.context_target = None;
        ui.close_menu();
    }
}

// ── Painting ─────────────────────────────────────────────────

struct Face {
    points: [Pos2; 3],
    depth: f32,
    color: Color32,
}

/// Flat-shaded faces, back to front; sliced faces are left out
fn paint_meshes(painter: &egui::Painter, rect: Rect, app: &PinmarkApp, projector: &Projector) {
    let eye = app.camera.eye_position();
    let light = LIGHT_DIR.normalize();
    let mut faces = Vec::new();

    for (_, mesh) in app.picker.objects() {
        for tri in 0..mesh.triangle_count() {
            let corners = mesh.triangle_positions(tri);
            let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
            let normal = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .normalize_or_zero();
            if normal.dot(eye - centroid) <= 0.0 || projector.is_sliced(centroid) {
                continue;
            }
            let view = projector.to_view(centroid);
            if projector.behind_near(view) {
                continue;
            }
            let [r, g, b] = mesh.color(mesh.triangle(tri)[0]);
            let shade = 0.35 + 0.65 * normal.dot(light).max(0.0);
            let channel = |c: f32| (c * shade * 255.0).clamp(0.0, 255.0) as u8;
            faces.push(Face {
                points: corners.map(|c| to_screen(rect, projector.project(c))),
                depth: view.z,
                color: Color32::from_rgb(channel(r), channel(g), channel(b)),
            });
        }
    }

    faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    for face in faces {
        painter.add(egui::Shape::convex_polygon(
            face.points.to_vec(),
            face.color,
            Stroke::new(0.5, face.color.gamma_multiply(0.8)),
        ));
    }
}

fn paint_annotation(painter: &egui::Painter, rect: Rect, annotation: &Annotation) {
    for part in [Part::X, Part::Y, Part::Z, Part::Length] {
        if let Some(wire) = annotation.wire(part).filter(|w| w.is_shown()) {
            painter.line_segment(
                [to_screen(rect, wire.start()), to_screen(rect, wire.end())],
                Stroke::new(wire.thickness, color32(wire.color)),
            );
        }
    }
    for part in [Part::X, Part::Y, Part::Z, Part::Length] {
        if let Some(label) = annotation.label(part).filter(|l| l.is_shown()) {
            let galley = painter.layout_no_wrap(
                label.text().to_string(),
                egui::FontId::proportional(11.0),
                Color32::WHITE,
            );
            let anchor = to_screen(rect, label.pos());
            let text_rect = egui::Align2::CENTER_CENTER.anchor_size(anchor, galley.size());
            painter.rect_filled(text_rect.expand(3.0), 3.0, color32(label.color));
            painter.galley(text_rect.min, galley, Color32::WHITE);
        }
    }
    for slot in [Slot::Origin, Slot::Target] {
        let Some(dot) = annotation.dot(slot).filter(|d| d.is_shown()) else {
            continue;
        };
        let mut radius = dot.size() / 2.0;
        if dot.highlighted() {
            radius += 2.0;
        }
        let fill = color32(dot.fill_color()).gamma_multiply(dot.opacity());
        painter.circle(
            to_screen(rect, dot.pos()),
            radius,
            fill,
            Stroke::new(1.5, color32(dot.border_color())),
        );
    }
}

fn paint_pointer_feedback(painter: &egui::Painter, rect: Rect, app: &PinmarkApp) {
    let cursor = &app.mouse.cursor;
    if cursor.visible {
        let center = to_screen(rect, cursor.canvas_pos);
        if cursor.snapped {
            painter.rect_stroke(
                Rect::from_center_size(center, egui::vec2(10.0, 10.0)),
                0.0,
                Stroke::new(1.5, styles::SNAP_COLOR),
                egui::StrokeKind::Middle,
            );
        } else {
            painter.circle_filled(center, 3.0, styles::CURSOR_COLOR);
        }
    }

    for lens in [&app.mouse.lens, &app.touch.lens] {
        if !lens.visible {
            continue;
        }
        let center = to_screen(rect, lens.canvas_pos);
        let ring = if lens.snapped {
            styles::SNAP_COLOR
        } else {
            styles::CURSOR_COLOR
        };
        painter.circle_stroke(center, 12.0 * lens.zoom, Stroke::new(1.0, ring));
        painter.line_segment(
            [center - egui::vec2(6.0, 0.0), center + egui::vec2(6.0, 0.0)],
            Stroke::new(1.0, ring),
        );
        painter.line_segment(
            [center - egui::vec2(0.0, 6.0), center + egui::vec2(0.0, 6.0)],
            Stroke::new(1.0, ring),
        );
    }

    let circle = &app.touch.pointer_circle;
    if circle.visible {
        painter.circle_stroke(
            to_screen(rect, circle.canvas_pos),
            28.0,
            Stroke::new(2.0, styles::CURSOR_COLOR),
        );
    }
}
