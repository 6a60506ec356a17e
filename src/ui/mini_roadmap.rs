use egui::{Id, Pos2, Rect, RichText, Rounding, Sense, Stroke, Ui, Vec2};

use crate::roadmap::layout::{project_block, ColumnMetrics};
use crate::roadmap::mini::MiniRoadmap;
use crate::ui::theme;

const HEADER: f32 = 20.0;

/// Read-only week strip of one chantier.
pub fn show_mini_roadmap(ui: &mut Ui, mini: &MiniRoadmap, margin: f32) {
    let Some(metrics) = ColumnMetrics::measured(theme::MINI_COLUMN_WIDTH, margin.min(2.0)) else {
        return;
    };
    let weeks = mini.axis.len();
    let body_height = theme::MINI_LANE_HEIGHT * mini.total_lanes.max(1) as f32;
    let size = Vec2::new(weeks as f32 * metrics.column_width, HEADER + body_height);

    egui::ScrollArea::horizontal()
        .id_salt(("mini-roadmap", &mini.chantier))
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(size, Sense::hover());
            let origin = response.rect.min;
            painter.rect_filled(response.rect, Rounding::same(4.0), theme::BG_DARK);

            for (i, bucket) in mini.axis.buckets.iter().enumerate() {
                let column = Rect::from_min_size(
                    Pos2::new(origin.x + i as f32 * metrics.column_width, origin.y),
                    Vec2::new(metrics.column_width, size.y),
                );
                if mini.target_index == Some(i) {
                    painter.rect_filled(column, 0.0, theme::TARGET_BUCKET);
                }
                let label_color = if mini.current_index == Some(i) {
                    painter.rect_filled(column, 0.0, theme::CURRENT_BUCKET);
                    theme::CURRENT_BUCKET_HEADER
                } else {
                    theme::TEXT_SECONDARY
                };
                painter.line_segment(
                    [column.left_top(), column.left_bottom()],
                    Stroke::new(0.5, theme::GRID_LINE),
                );
                painter.text(
                    Pos2::new(column.center().x, origin.y + HEADER / 2.0),
                    egui::Align2::CENTER_CENTER,
                    &bucket.label,
                    theme::font_small(),
                    label_color,
                );
            }
            painter.line_segment(
                [
                    Pos2::new(origin.x, origin.y + HEADER),
                    Pos2::new(origin.x + size.x, origin.y + HEADER),
                ],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );

            let hover = ui.input(|i| i.pointer.hover_pos());
            for block in &mini.blocks {
                let px = project_block(&block.layout, metrics);
                let (top, height) = px.vertical.resolve(body_height);
                let rect = Rect::from_min_size(
                    Pos2::new(
                        origin.x + block.layout.start as f32 * metrics.column_width + px.left,
                        origin.y + HEADER + top + 1.0,
                    ),
                    Vec2::new(px.width, (height - 2.0).max(2.0)),
                );
                painter.rect_filled(rect, Rounding::same(3.0), block.color);
                if rect.width() > 24.0 {
                    let clipped = painter.with_clip_rect(rect);
                    clipped.text(
                        Pos2::new(rect.left() + 4.0, rect.center().y),
                        egui::Align2::LEFT_CENTER,
                        &block.name,
                        theme::font_small(),
                        theme::TEXT_ON_BAR,
                    );
                }
                if hover.is_some_and(|p| rect.contains(p)) && ui.rect_contains_pointer(response.rect) {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        Id::new(("mini-tip", &block.layout.key)),
                        |ui| {
                            ui.strong(&block.name);
                            ui.label(RichText::new(block.category.label()).color(block.color));
                        },
                    );
                }
            }
        });

    if mini.blocks.is_empty() {
        ui.label(
            RichText::new("No phase planned yet")
                .small()
                .color(theme::TEXT_DIM),
        );
    }
    if mini.target_index.is_some() {
        ui.horizontal(|ui| {
            let (swatch, painter) = ui.allocate_painter(Vec2::splat(10.0), Sense::hover());
            painter.rect_filled(swatch.rect, 2.0, theme::CLAMPED_EDGE);
            ui.label(RichText::new("Desired date").small().color(theme::TEXT_SECONDARY));
        });
    }
}
