//! Dark dashboard theme

use egui::Color32;

use crate::core::TxKind;
use crate::render::Rgba;

/// Dashboard palette
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(3, 7, 18); // gray-950
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(17, 24, 39); // gray-900
    pub const BG_HOVER: Color32 = Color32::from_rgb(31, 41, 55); // gray-800
    pub const CANVAS_BG: Color32 = Color32::from_rgb(0, 0, 0);

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(156, 163, 175); // gray-400
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(107, 114, 128); // gray-500

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(31, 41, 55);

    // === Status ===
    pub const OK: Color32 = Color32::from_rgb(34, 197, 94);
    pub const WARN: Color32 = Color32::from_rgb(234, 179, 8);
    pub const BAD: Color32 = Color32::from_rgb(239, 68, 68);
}

pub fn to_color32(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (c.a.clamp(0.0, 1.0) * 255.0).round() as u8)
}

pub fn kind_color32(kind: TxKind) -> Color32 {
    let (r, g, b) = kind.color_rgb();
    Color32::from_rgb(r, g, b)
}

pub fn dashboard_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_PRIMARY;
    visuals.extreme_bg_color = CANVAS_BG;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.weak_bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
