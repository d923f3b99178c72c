//! Viewer colors and egui style

use eframe::egui;
use egui::Color32;
use shared::Color;

pub const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(38, 40, 46);
pub const CURSOR_COLOR: Color32 = Color32::from_rgb(235, 235, 240);
pub const SNAP_COLOR: Color32 = Color32::from_rgb(255, 200, 40);

pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Dark theme with tight spacing for the toolbar
pub fn configure_styles(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals = egui::Visuals::dark();
    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.menu_corner_radius = egui::CornerRadius::same(4);
    style.visuals.panel_fill = Color32::from_rgb(30, 30, 34);
    style.visuals.selection.bg_fill = color32(Color::SKY).gamma_multiply(0.6);

    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    style.spacing.button_padding = egui::vec2(6.0, 3.0);
    style.spacing.menu_margin = egui::Margin::same(4);

    ctx.set_style(style);
}
