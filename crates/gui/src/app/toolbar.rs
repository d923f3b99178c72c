//! Toolbar and status bar

use eframe::egui;
use pinmark_lib::config::Units;
use pinmark_lib::control::PlacementMode;
use pinmark_lib::scene::Metrics;

use super::{InputDevice, PinmarkApp};

pub fn show(ui: &mut egui::Ui, app: &mut PinmarkApp) {
    ui.horizontal(|ui| {
        let mut mode = app.mode;
        ui.selectable_value(&mut mode, PlacementMode::Measurement, "📏 Measure")
            .on_hover_text("Two points: origin, then target (M)");
        ui.selectable_value(&mut mode, PlacementMode::Issue, "📌 Issue")
            .on_hover_text("One point (I)");
        if mode != app.mode {
            app.set_mode(mode);
        }

        ui.separator();

        let mut snapping = app.settings.controls.snapping;
        if ui
            .checkbox(&mut snapping, "Snap")
            .on_hover_text("Snap to vertices and edges (S)")
            .changed()
        {
            app.set_snapping(snapping);
        }

        let mut axis = app.settings.defaults.axis_visible;
        if ui.checkbox(&mut axis, "Axes").changed() {
            app.settings.defaults.axis_visible = axis;
            app.plugin.set_axis_visible(axis);
        }

        let mut labels = app.settings.defaults.labels_visible;
        if ui.checkbox(&mut labels, "Labels").changed() {
            app.settings.defaults.labels_visible = labels;
            app.plugin.set_labels_visible(labels);
        }

        let mut section = app.section_enabled;
        if ui
            .checkbox(&mut section, "Section")
            .on_hover_text("Cut away everything at x < 0")
            .changed()
        {
            app.set_section_enabled(section);
        }

        ui.separator();

        let mut units = app.settings.units;
        egui::ComboBox::from_id_salt("units")
            .selected_text(units.display_name())
            .show_ui(ui, |ui| {
                for u in Units::all() {
                    ui.selectable_value(&mut units, *u, u.display_name());
                }
            });
        if units != app.settings.units {
            app.settings.units = units;
            app.scene.set_metrics(Metrics {
                units,
                scale: app.scene.metrics().scale,
            });
        }

        ui.separator();

        if ui.button("Clear").clicked() {
            app.reset_controls();
            app.plugin.clear();
        }
        if ui.button("Save settings").clicked() {
            app.settings.save();
        }
    });
}

pub fn status_bar(ui: &mut egui::Ui, app: &PinmarkApp) {
    ui.horizontal(|ui| {
        let device = match app.device {
            InputDevice::Mouse => "mouse",
            InputDevice::Touch => "touch",
        };
        ui.label(format!("{} annotations · {device}", app.plugin.len()));
        if !app.scene.camera_control_active() {
            ui.label(egui::RichText::new("navigation locked").color(egui::Color32::YELLOW));
        }
        ui.separator();
        if let Some(last) = app.event_log.back() {
            let history: Vec<&str> = app.event_log.iter().map(String::as_str).collect();
            ui.label(egui::RichText::new(last).monospace().small())
                .on_hover_text(history.join("\n"));
        }
    });
}
