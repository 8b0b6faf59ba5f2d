//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};
use tilequest_rendering::HudPresentation;

/// Layout and data of the heads-up display for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HudUiContext {
    /// Top-left corner of the HUD band in screen coordinates.
    pub(crate) origin: Vec2,
    /// Band dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour of the band.
    pub(crate) background: Color,
    /// Values to display.
    pub(crate) hud: HudPresentation,
}

/// Renders the HUD band above the play area.
pub(crate) fn draw_hud_ui(ui: &mut Ui, context: HudUiContext) {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(24.0, 24.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .font_size(28)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    ui.push_skin(&skin);

    let _ = ui.window(hash!("hud"), context.origin, context.size, |ui| {
        for line in context.hud.lines() {
            ui.label(None, line.as_str());
        }
    });

    ui.pop_skin();
}
