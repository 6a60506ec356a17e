//! Draws a [`RoadmapGrid`] and turns raw pointer input into gesture events.
//!
//! The grid is painted in one pass; block and cell rectangles collected while
//! painting are the hit-test targets for the frame's pointer input, which is
//! fed to the [`GestureMachine`] as plain press/move/release events.

use std::time::Duration;

use egui::{Id, Key, Pos2, Rect, RichText, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::PhaseKey;
use crate::roadmap::gesture::{
    BlockGrip, DropCell, GestureConfig, GestureMachine, GestureOutcome, GridGeometry, HitPart,
    PointerButton, PointerEvent, PressTarget,
};
use crate::roadmap::grid::{EmptyState, PhaseBlock, RoadmapGrid};
use crate::roadmap::layout::{ColumnMetrics, PixelBlock};
use crate::ui::theme;

/// What the grid asks the page to do.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    Rename { key: PhaseKey, name: String },
    Edit(PhaseKey),
    AddAt(DropCell),
    Delete(PhaseKey),
    /// A drop or resize to persist.
    Commit(GestureOutcome),
    OpenChantier(String),
}

#[derive(Debug, Clone)]
enum PopupMenu {
    Phase { grip: BlockGrip, pos: Pos2 },
    Cell { cell: DropCell, pos: Pos2 },
}

impl PopupMenu {
    fn pos(&self) -> Pos2 {
        match self {
            PopupMenu::Phase { pos, .. } | PopupMenu::Cell { pos, .. } => *pos,
        }
    }
}

#[derive(Debug, Clone)]
struct InlineRename {
    key: PhaseKey,
    text: String,
    focused: bool,
}

/// Interaction state that outlives a frame.
pub struct GridInteraction {
    machine: GestureMachine,
    dragging: Option<BlockGrip>,
    hover: Option<DropCell>,
    preview: Option<(PhaseKey, usize, usize)>,
    rename: Option<InlineRename>,
    menu: Option<PopupMenu>,
    menu_rect: Option<Rect>,
    pub min_column_width: f32,
    pub margin: f32,
}

impl GridInteraction {
    pub fn new(config: GestureConfig, min_column_width: f32, margin: f32) -> Self {
        Self {
            machine: GestureMachine::new(config),
            dragging: None,
            hover: None,
            preview: None,
            rename: None,
            menu: None,
            menu_rect: None,
            min_column_width,
            margin,
        }
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.machine.set_config(config);
    }

    /// Drop any gesture in flight; the data underneath changed.
    pub fn reset(&mut self) {
        self.machine.handle(PointerEvent::Cancel);
        self.clear_transient();
        self.rename = None;
        self.menu = None;
    }

    fn clear_transient(&mut self) {
        self.dragging = None;
        self.hover = None;
        self.preview = None;
    }

    fn absorb(&mut self, outcome: GestureOutcome, actions: &mut Vec<GridAction>, blocks: &[BlockHit]) {
        match outcome {
            GestureOutcome::None => {}
            GestureOutcome::BeginRename(key) => {
                self.menu = None;
                self.rename = Some(InlineRename {
                    text: key.phase.clone(),
                    key,
                    focused: false,
                });
            }
            GestureOutcome::OpenEditor(key) => {
                self.rename = None;
                actions.push(GridAction::Edit(key));
            }
            GestureOutcome::ContextMenu { key, pos } => {
                self.rename = None;
                self.menu = blocks
                    .iter()
                    .find(|b| b.grip.key == key)
                    .map(|b| PopupMenu::Phase {
                        grip: b.grip.clone(),
                        pos,
                    });
            }
            GestureOutcome::CellMenu { cell, pos } => {
                self.rename = None;
                self.menu = Some(PopupMenu::Cell { cell, pos });
            }
            GestureOutcome::DragHover { key, over } => {
                if self.dragging.is_none() {
                    self.dragging = blocks.iter().find(|b| b.grip.key == key).map(|b| b.grip.clone());
                }
                self.hover = over;
            }
            GestureOutcome::ResizePreview { key, start, end, .. } => {
                self.preview = Some((key, start, end));
            }
            commit @ (GestureOutcome::Drop { .. } | GestureOutcome::Resize { .. }) => {
                self.clear_transient();
                actions.push(GridAction::Commit(commit));
            }
            GestureOutcome::Cancelled => self.clear_transient(),
        }
    }
}

struct BlockHit {
    grip: BlockGrip,
    body: Rect,
    left: Rect,
    right: Rect,
}

impl BlockHit {
    fn part_at(&self, pos: Pos2) -> Option<HitPart> {
        if self.left.contains(pos) {
            Some(HitPart::LeftHandle)
        } else if self.right.contains(pos) {
            Some(HitPart::RightHandle)
        } else if self.body.contains(pos) {
            Some(HitPart::Body)
        } else {
            None
        }
    }
}

struct CellHit {
    cell: DropCell,
    rect: Rect,
}

/// First column cell of a laid-out canvas. The columns share whatever width
/// egui gave the canvas right of the labels.
fn first_cell_of(canvas: Rect, buckets: usize) -> Rect {
    let left = canvas.left() + theme::LABEL_WIDTH;
    let top = canvas.top() + theme::HEADER_HEIGHT;
    let width = (canvas.right() - left) / buckets.max(1) as f32;
    Rect::from_min_size(Pos2::new(left, top), Vec2::new(width, theme::LANE_HEIGHT))
}

/// Render the roadmap grid and collect what the user asked for.
pub fn show_roadmap_grid(ui: &mut Ui, grid: &RoadmapGrid, state: &mut GridInteraction) -> Vec<GridAction> {
    let mut actions = Vec::new();
    let buckets = grid.header.len().max(1);
    let available = ui.available_size();
    let requested_width = ((available.x - theme::LABEL_WIDTH) / buckets as f32).max(state.min_column_width);
    let rows_height: f32 = grid.rows.iter().map(|r| theme::row_height(r.total_lanes)).sum();
    let canvas = Vec2::new(
        theme::LABEL_WIDTH + requested_width * buckets as f32,
        theme::HEADER_HEIGHT + rows_height,
    );

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(canvas.max(available), Sense::hover());
            let origin = response.rect.min;
            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            let width = response.rect.width();
            let columns_left = origin.x + theme::LABEL_WIDTH;
            let first_cell = first_cell_of(response.rect, buckets);
            let Some(metrics) = ColumnMetrics::measured(first_cell.width(), state.margin) else {
                return;
            };
            let column_width = metrics.column_width;
            let pixels = grid.logical.apply_measured_widths(metrics);
            state.machine.set_geometry(GridGeometry {
                column_width: metrics.column_width,
                last_index: grid.last_index(),
            });

            draw_header(&painter, grid, origin, columns_left, column_width, width);

            let mut blocks: Vec<BlockHit> = Vec::new();
            let mut cells: Vec<CellHit> = Vec::new();
            let mut row_bands: Vec<(String, f32, f32)> = Vec::new();
            let mut drawn: Vec<(Rect, PhaseBlock)> = Vec::new();

            let mut y = origin.y + theme::HEADER_HEIGHT;
            for (row_index, (row, pixel_row)) in grid.rows.iter().zip(&pixels.rows).enumerate() {
                let height = theme::row_height(row.total_lanes);
                let band = Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, height));
                let fill = if row_index % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };
                painter.rect_filled(band, 0.0, fill);
                painter.line_segment(
                    [band.left_bottom(), band.right_bottom()],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );

                // Label column
                let label_rect = Rect::from_min_size(band.min, Vec2::new(theme::LABEL_WIDTH, height));
                painter.rect_filled(label_rect, 0.0, theme::BG_LABEL);
                painter.text(
                    Pos2::new(label_rect.left() + 10.0, label_rect.top() + 14.0),
                    egui::Align2::LEFT_CENTER,
                    &row.chantier,
                    theme::font_label(),
                    theme::TEXT_PRIMARY,
                );
                if let Some(responsible) = &row.responsible {
                    painter.text(
                        Pos2::new(label_rect.left() + 10.0, label_rect.top() + 28.0),
                        egui::Align2::LEFT_CENTER,
                        responsible,
                        theme::font_small(),
                        theme::TEXT_DIM,
                    );
                }
                let label_response = ui.interact(
                    label_rect,
                    ui.make_persistent_id(("chantier-label", &row.chantier)),
                    Sense::click(),
                );
                if label_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if label_response.clicked() {
                    actions.push(GridAction::OpenChantier(row.chantier.clone()));
                }

                for cell in &row.cells {
                    let rect = Rect::from_min_size(
                        Pos2::new(columns_left + cell.bucket as f32 * column_width, y),
                        Vec2::new(column_width, height),
                    );
                    if grid.header.get(cell.bucket).is_some_and(|h| h.is_current) {
                        painter.rect_filled(rect, 0.0, theme::CURRENT_BUCKET);
                    }
                    painter.line_segment(
                        [rect.left_top(), rect.left_bottom()],
                        Stroke::new(0.5, theme::GRID_LINE),
                    );
                    cells.push(CellHit {
                        cell: DropCell::new(row.chantier.clone(), cell.bucket),
                        rect,
                    });
                }

                for block in row.blocks() {
                    let Some(px) = pixel_row.blocks.iter().find(|p| p.block.key == *block.key()) else {
                        continue;
                    };
                    let rect = block_rect(px, columns_left, column_width, y, height);
                    draw_phase_block(&painter, rect, block);
                    let half = theme::HANDLE_WIDTH * 0.5;
                    blocks.push(BlockHit {
                        grip: BlockGrip::new(block.key().clone(), block.layout.start, block.layout.end),
                        body: rect,
                        left: Rect::from_min_max(
                            Pos2::new(rect.left() - half, rect.top()),
                            Pos2::new(rect.left() + half, rect.bottom()),
                        ),
                        right: Rect::from_min_max(
                            Pos2::new(rect.right() - half, rect.top()),
                            Pos2::new(rect.right() + half, rect.bottom()),
                        ),
                    });
                    drawn.push((rect, block.clone()));
                }

                row_bands.push((row.chantier.clone(), y, height));
                y += height;
            }

            feed_pointer(ui, &response, state, &blocks, &cells, &mut actions);

            // Drop target while dragging
            if let (Some(grip), Some(hover)) = (&state.dragging, &state.hover) {
                if let Some((_, row_y, row_h)) = row_bands.iter().find(|(c, _, _)| *c == hover.chantier) {
                    let span = grip.end - grip.start;
                    let refused = hover.chantier != grip.key.chantier || hover.bucket + span > grid.last_index();
                    let ghost = Rect::from_min_size(
                        Pos2::new(columns_left + hover.bucket as f32 * column_width, *row_y),
                        Vec2::new((span + 1) as f32 * column_width, *row_h),
                    );
                    let color = if refused { theme::DROP_REFUSED } else { theme::DROP_OK };
                    painter.rect_filled(ghost.shrink(1.0), Rounding::same(theme::BAR_ROUNDING), color);
                    ui.ctx().set_cursor_icon(if refused {
                        egui::CursorIcon::NotAllowed
                    } else {
                        egui::CursorIcon::Grabbing
                    });
                }
            }

            // Resize preview
            if let Some((key, start, end)) = &state.preview {
                if let Some(hit) = blocks.iter().find(|b| b.grip.key == *key) {
                    let preview = Rect::from_min_max(
                        Pos2::new(columns_left + *start as f32 * column_width + state.margin, hit.body.top()),
                        Pos2::new(columns_left + (*end + 1) as f32 * column_width - state.margin, hit.body.bottom()),
                    );
                    dashed_rect(&painter, preview, Stroke::new(1.5, theme::HANDLE_COLOR));
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                }
            }

            show_inline_rename(ui, state, &blocks, &mut actions);
            show_popup_menu(ui, state, &mut actions);

            if state.machine.is_idle() && state.menu.is_none() && state.rename.is_none() {
                hover_affordances(ui, &painter, &response, &blocks, &drawn, grid);
            }
            if !state.machine.is_idle() {
                ui.ctx().request_repaint_after(Duration::from_millis(30));
            }
        });

    actions
}

/// Centered message shown instead of the grid.
pub fn show_empty_state(ui: &mut Ui, empty: EmptyState) {
    let icon = match empty {
        EmptyState::NoBuckets => egui_phosphor::regular::CALENDAR_BLANK,
        EmptyState::NoChantiers => egui_phosphor::regular::FUNNEL,
    };
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.label(RichText::new(icon).size(40.0).color(theme::TEXT_DIM));
        ui.add_space(8.0);
        ui.label(RichText::new(empty.message()).size(14.0).color(theme::TEXT_SECONDARY));
    });
}

fn block_rect(px: &PixelBlock, columns_left: f32, column_width: f32, row_top: f32, row_height: f32) -> Rect {
    let cell_left = columns_left + px.block.start as f32 * column_width;
    let (top, height) = px.vertical.resolve(row_height - theme::ROW_GAP);
    let inset = theme::BAR_INSET.min(height * 0.15);
    Rect::from_min_size(
        Pos2::new(cell_left + px.left, row_top + top + inset),
        Vec2::new(px.width, (height - inset * 2.0).max(2.0)),
    )
}

fn feed_pointer(
    ui: &Ui,
    canvas: &egui::Response,
    state: &mut GridInteraction,
    blocks: &[BlockHit],
    cells: &[CellHit],
    actions: &mut Vec<GridAction>,
) {
    let (now, pos, primary_pressed, secondary_pressed, released, double_clicked, moved, escape, any_pressed) =
        ui.input(|i| {
            (
                Duration::from_secs_f64(i.time.max(0.0)),
                i.pointer.interact_pos().or(i.pointer.hover_pos()),
                i.pointer.button_pressed(egui::PointerButton::Primary),
                i.pointer.button_pressed(egui::PointerButton::Secondary),
                i.pointer.button_released(egui::PointerButton::Primary),
                i.pointer.button_double_clicked(egui::PointerButton::Primary),
                i.pointer.delta() != Vec2::ZERO,
                i.key_pressed(Key::Escape),
                i.pointer.any_pressed(),
            )
        });

    if any_pressed {
        let inside_menu = pos.zip(state.menu_rect).is_some_and(|(p, r)| r.contains(p));
        if state.menu.is_some() && !inside_menu {
            state.menu = None;
        }
    }

    let mut outcomes = Vec::new();
    if escape {
        state.menu = None;
        outcomes.push(state.machine.handle(PointerEvent::Cancel));
    }

    let over_canvas = ui.rect_contains_pointer(canvas.rect);
    let cell_at = |p: Pos2| cells.iter().find(|c| c.rect.contains(p)).map(|c| c.cell.clone());
    let target_at = |p: Pos2| {
        blocks
            .iter()
            .rev()
            .find_map(|b| {
                b.part_at(p).map(|part| PressTarget::Phase {
                    grip: b.grip.clone(),
                    part,
                })
            })
            .or_else(|| cell_at(p).map(PressTarget::Cell))
    };

    if let Some(pos) = pos {
        if over_canvas && state.rename.is_none() {
            for (pressed, button) in [
                (primary_pressed, PointerButton::Primary),
                (secondary_pressed, PointerButton::Secondary),
            ] {
                if !pressed {
                    continue;
                }
                if let Some(target) = target_at(pos) {
                    outcomes.push(state.machine.handle(PointerEvent::Press {
                        target,
                        button,
                        pos,
                        at: now,
                    }));
                }
            }
        }
        if moved && !state.machine.is_idle() {
            outcomes.push(state.machine.handle(PointerEvent::Move {
                pos,
                over: cell_at(pos),
                at: now,
            }));
        }
        if released && !state.machine.is_idle() {
            outcomes.push(state.machine.handle(PointerEvent::Release {
                pos,
                over: cell_at(pos),
                at: now,
            }));
        }
        if double_clicked && over_canvas {
            if let Some(hit) = blocks.iter().rev().find(|b| b.body.contains(pos)) {
                outcomes.push(state.machine.handle(PointerEvent::DoubleClick {
                    key: hit.grip.key.clone(),
                    at: now,
                }));
            }
        }
    }
    outcomes.push(state.machine.handle(PointerEvent::Tick { at: now }));

    for outcome in outcomes {
        state.absorb(outcome, actions, blocks);
    }
}

fn show_inline_rename(ui: &mut Ui, state: &mut GridInteraction, blocks: &[BlockHit], actions: &mut Vec<GridAction>) {
    let Some(rename) = &mut state.rename else {
        return;
    };
    let Some(hit) = blocks.iter().find(|b| b.grip.key == rename.key) else {
        state.rename = None;
        return;
    };
    let editor = egui::TextEdit::singleline(&mut rename.text)
        .font(theme::font_bar())
        .margin(Vec2::new(4.0, 1.0));
    let response = ui.put(hit.body.expand2(Vec2::new(0.0, 1.0)), editor);
    if !rename.focused {
        response.request_focus();
        rename.focused = true;
    }
    if ui.input(|i| i.key_pressed(Key::Escape)) {
        state.rename = None;
    } else if response.lost_focus() {
        let name = rename.text.trim().to_string();
        if name != rename.key.phase {
            actions.push(GridAction::Rename {
                key: rename.key.clone(),
                name,
            });
        }
        state.rename = None;
    }
}

fn show_popup_menu(ui: &mut Ui, state: &mut GridInteraction, actions: &mut Vec<GridAction>) {
    let Some(menu) = state.menu.clone() else {
        state.menu_rect = None;
        return;
    };
    let mut chosen = None;
    let area = egui::Area::new(Id::new("roadmap-popup-menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(menu.pos())
        .show(ui.ctx(), |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_min_width(170.0);
                match &menu {
                    PopupMenu::Phase { grip, .. } => {
                        ui.label(RichText::new(&grip.key.phase).strong());
                        ui.separator();
                        if ui
                            .button(format!("{}  Edit phase…", egui_phosphor::regular::PENCIL_SIMPLE))
                            .clicked()
                        {
                            chosen = Some(GridAction::Edit(grip.key.clone()));
                        }
                        if ui
                            .button(format!("{}  Add phase in this row", egui_phosphor::regular::PLUS))
                            .clicked()
                        {
                            chosen = Some(GridAction::AddAt(grip.origin()));
                        }
                        ui.separator();
                        if ui
                            .button(
                                RichText::new(format!("{}  Delete phase", egui_phosphor::regular::TRASH))
                                    .color(theme::NOTICE_ERROR),
                            )
                            .clicked()
                        {
                            chosen = Some(GridAction::Delete(grip.key.clone()));
                        }
                    }
                    PopupMenu::Cell { cell, .. } => {
                        if ui
                            .button(format!("{}  Add phase here", egui_phosphor::regular::PLUS))
                            .clicked()
                        {
                            chosen = Some(GridAction::AddAt(cell.clone()));
                        }
                    }
                }
            });
        });
    state.menu_rect = Some(area.response.rect);
    if let Some(action) = chosen {
        actions.push(action);
        state.menu = None;
        state.menu_rect = None;
    }
}

fn hover_affordances(
    ui: &Ui,
    painter: &egui::Painter,
    canvas: &egui::Response,
    blocks: &[BlockHit],
    drawn: &[(Rect, PhaseBlock)],
    grid: &RoadmapGrid,
) {
    let Some(pos) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    if !ui.rect_contains_pointer(canvas.rect) {
        return;
    }
    let Some((index, hit, part)) = blocks
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, b)| b.part_at(pos).map(|part| (i, b, part)))
    else {
        return;
    };

    match part {
        HitPart::Body => ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand),
        HitPart::LeftHandle | HitPart::RightHandle => {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal)
        }
    }

    // Rounded pill handles
    let rect = hit.body;
    let handle_h = rect.height() * 0.55;
    let handle_y = rect.center().y - handle_h / 2.0;
    for x in [rect.left() - 1.5, rect.right() - 2.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }

    let Some((_, block)) = drawn.get(index) else {
        return;
    };
    let bucket_label = |i: usize| grid.header.get(i).map(|h| h.label.clone()).unwrap_or_default();
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        Id::new(("phase-tip", &block.layout.key)),
        |ui| {
            ui.strong(&block.name);
            ui.label(RichText::new(block.category.label()).color(block.color));
            ui.label(format!(
                "{} → {}",
                bucket_label(block.layout.start),
                bucket_label(block.layout.end)
            ));
            if let Some(description) = &block.description {
                ui.label(RichText::new(description).color(theme::TEXT_SECONDARY));
            }
            if block.link_count > 0 {
                ui.label(format!("{} {} link(s)", egui_phosphor::regular::LINK, block.link_count));
            }
            if block.layout.clamped {
                ui.label(
                    RichText::new("Extends past the visible period or references an unknown bucket")
                        .color(theme::CLAMPED_EDGE)
                        .small(),
                );
            }
        },
    );
}

fn draw_header(painter: &egui::Painter, grid: &RoadmapGrid, origin: Pos2, columns_left: f32, column_width: f32, width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, theme::HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + theme::HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + theme::HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.text(
        Pos2::new(origin.x + 10.0, origin.y + theme::HEADER_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        "Chantier",
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );

    for cell in &grid.header {
        let x = columns_left + cell.index as f32 * column_width;
        let rect = Rect::from_min_size(Pos2::new(x, origin.y), Vec2::new(column_width, theme::HEADER_HEIGHT));
        let label_color = if cell.is_current {
            painter.rect_filled(rect, 0.0, theme::CURRENT_BUCKET);
            painter.line_segment(
                [rect.left_bottom(), rect.right_bottom()],
                Stroke::new(2.0, theme::CURRENT_BUCKET_HEADER),
            );
            theme::CURRENT_BUCKET_HEADER
        } else {
            theme::TEXT_PRIMARY
        };
        painter.line_segment(
            [rect.left_top(), rect.left_bottom()],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        let clipped = painter.with_clip_rect(rect.shrink(2.0));
        clipped.text(
            Pos2::new(rect.left() + 6.0, rect.top() + 14.0),
            egui::Align2::LEFT_CENTER,
            &cell.label,
            theme::font_header(),
            label_color,
        );
        clipped.text(
            Pos2::new(rect.left() + 6.0, rect.top() + 31.0),
            egui::Align2::LEFT_CENTER,
            format!("{} – {}", cell.start.format("%d/%m"), cell.end.format("%d/%m")),
            theme::font_small(),
            theme::TEXT_DIM,
        );
    }
}

fn draw_phase_block(painter: &egui::Painter, rect: Rect, block: &PhaseBlock) {
    let rounding = Rounding::same(theme::BAR_ROUNDING.min(rect.height() / 2.0));

    painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, egui::Color32::from_black_alpha(35));
    painter.rect_filled(rect, rounding, block.color);
    let highlight = Rect::from_min_size(rect.min, Vec2::new(rect.width(), (rect.height() * 0.45).max(3.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: rounding.nw,
            ne: rounding.ne,
            sw: 0.0,
            se: 0.0,
        },
        egui::Color32::from_white_alpha(25),
    );

    if block.layout.clamped {
        let edge = Rect::from_min_max(Pos2::new(rect.right() - 3.0, rect.top()), rect.right_bottom());
        painter.rect_filled(edge, 0.0, theme::CLAMPED_EDGE);
    }

    if rect.width() > 30.0 {
        let mut text = block.name.clone();
        if block.link_count > 0 && rect.width() > 80.0 {
            text = format!("{}  {}", text, egui_phosphor::regular::LINK);
        }
        let galley = painter.layout_no_wrap(text, theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(rect.shrink(1.0));
        let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
        clipped.galley(Pos2::new(rect.left() + 6.0, text_y), galley, egui::Color32::TRANSPARENT);
    }
}

fn dashed_rect(painter: &egui::Painter, rect: Rect, stroke: Stroke) {
    let outline = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    painter.extend(egui::Shape::dashed_line(&outline, stroke, 5.0, 3.0));
}
