use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_LABEL: Color32 = Color32::from_rgb(28, 29, 38);
pub const BG_FIELD: Color32 = Color32::from_rgb(20, 20, 28);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

/// Column of the bucket containing today.
pub const CURRENT_BUCKET: Color32 = Color32::from_rgba_premultiplied(240, 75, 75, 18);
pub const CURRENT_BUCKET_HEADER: Color32 = Color32::from_rgb(240, 75, 75);
/// Column of a chantier's desired date on the mini roadmap.
pub const TARGET_BUCKET: Color32 = Color32::from_rgba_premultiplied(255, 193, 7, 30);

pub const DROP_OK: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 60);
pub const DROP_REFUSED: Color32 = Color32::from_rgba_premultiplied(229, 57, 53, 55);
pub const CLAMPED_EDGE: Color32 = Color32::from_rgb(255, 193, 7);

pub const NOTICE_SUCCESS: Color32 = Color32::from_rgb(52, 168, 83);
pub const NOTICE_WARNING: Color32 = Color32::from_rgb(251, 140, 0);
pub const NOTICE_ERROR: Color32 = Color32::from_rgb(229, 57, 53);

// ── Sizes ────────────────────────────────────────────────────────────────────

/// Height given to each lane of a chantier row.
pub const LANE_HEIGHT: f32 = 30.0;
pub const ROW_GAP: f32 = 2.0;
pub const HEADER_HEIGHT: f32 = 44.0;
pub const LABEL_WIDTH: f32 = 190.0;
pub const HANDLE_WIDTH: f32 = 7.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 3.0;

pub const MINI_COLUMN_WIDTH: f32 = 46.0;
pub const MINI_LANE_HEIGHT: f32 = 20.0;

pub fn row_height(total_lanes: usize) -> f32 {
    LANE_HEIGHT * total_lanes.max(1) as f32 + ROW_GAP
}

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_label() -> FontId {
    FontId::proportional(13.0)
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD;
    visuals.faint_bg_color = BG_PANEL;

    let widget_rounding = Rounding::same(4.0);
    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = BG_PANEL;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    widgets.noninteractive.rounding = widget_rounding;

    widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.inactive.rounding = widget_rounding;

    widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.hovered.rounding = widget_rounding;

    widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    widgets.active.rounding = widget_rounding;

    widgets.open.bg_fill = Color32::from_rgb(50, 52, 66);
    widgets.open.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.open.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.open.rounding = widget_rounding;

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
