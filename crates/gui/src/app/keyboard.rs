//! Keyboard shortcut handling

use eframe::egui;
use pinmark_lib::control::PlacementMode;

use super::PinmarkApp;

pub fn handle_keyboard(ctx: &egui::Context, app: &mut PinmarkApp) {
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (escape, delete, measure, issue, snap) = ctx.input(|i| {
        (
            i.key_pressed(egui::Key::Escape),
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            i.key_pressed(egui::Key::M),
            i.key_pressed(egui::Key::I),
            i.key_pressed(egui::Key::S),
        )
    });

    // Escape abandons the measurement being placed
    if escape {
        app.reset_controls();
    }
    if delete {
        if let Some(id) = app.context_target.take() {
            app.plugin.destroy(&id);
        }
    }
    if measure {
        app.set_mode(PlacementMode::Measurement);
    }
    if issue {
        app.set_mode(PlacementMode::Issue);
    }
    if snap {
        let snapping = !app.settings.controls.snapping;
        app.set_snapping(snapping);
    }
}
