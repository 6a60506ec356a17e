//! Pointer gesture recognition for phase blocks.
//!
//! The machine is fed an abstract event stream (press, move, release,
//! double-click, timer tick, cancel) and decides between click, drag, resize,
//! double-click and context menu without relying on a toolkit's gesture
//! system. It never touches roadmap data; it only reports what the user did.
//!
//! ```text
//! Idle ──press body──▶ Pressed ──moved > threshold──▶ Dragging ──release──▶ Drop
//!   │                     └──release──▶ PendingClick ──tick ≥ deadline──▶ Click
//!   └──press handle──▶ Resizing ──release──▶ Resize (if the span changed)
//! ```

use std::time::Duration;

use egui::Pos2;

use crate::error::Rejection;
use crate::model::PhaseKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Which part of a phase block was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    LeftHandle,
    RightHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// A grid cell: a chantier row and a bucket index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropCell {
    pub chantier: String,
    pub bucket: usize,
}

impl DropCell {
    pub fn new(chantier: impl Into<String>, bucket: usize) -> Self {
        Self {
            chantier: chantier.into(),
            bucket,
        }
    }
}

/// The phase under the pointer and its current bucket span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrip {
    pub key: PhaseKey,
    pub start: usize,
    pub end: usize,
}

impl BlockGrip {
    pub fn new(key: PhaseKey, start: usize, end: usize) -> Self {
        Self { key, start, end }
    }

    /// The cell the block is attached to.
    pub fn origin(&self) -> DropCell {
        DropCell::new(self.key.chantier.clone(), self.start)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PressTarget {
    Phase { grip: BlockGrip, part: HitPart },
    Cell(DropCell),
}

/// Input to the gesture machine; `at` is a monotonic timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Press {
        target: PressTarget,
        button: PointerButton,
        pos: Pos2,
        at: Duration,
    },
    Move {
        pos: Pos2,
        over: Option<DropCell>,
        at: Duration,
    },
    Release {
        pos: Pos2,
        over: Option<DropCell>,
        at: Duration,
    },
    DoubleClick {
        key: PhaseKey,
        at: Duration,
    },
    Tick {
        at: Duration,
    },
    /// Escape, focus loss, or the grid going away.
    Cancel,
}

/// What a gesture amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    None,
    BeginRename(PhaseKey),
    OpenEditor(PhaseKey),
    ContextMenu {
        key: PhaseKey,
        pos: Pos2,
    },
    CellMenu {
        cell: DropCell,
        pos: Pos2,
    },
    DragHover {
        key: PhaseKey,
        over: Option<DropCell>,
    },
    Drop {
        grip: BlockGrip,
        target: DropCell,
    },
    ResizePreview {
        key: PhaseKey,
        edge: ResizeEdge,
        start: usize,
        end: usize,
    },
    Resize {
        grip: BlockGrip,
        edge: ResizeEdge,
        start: usize,
        end: usize,
    },
    Cancelled,
}

/// Thresholds of the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub click_delay: Duration,
    pub drag_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_delay: Duration::from_millis(250),
            drag_threshold: 5.0,
        }
    }
}

/// Grid measurements the machine needs while resizing; refreshed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub column_width: f32,
    pub last_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Pressed {
        grip: BlockGrip,
        origin: Pos2,
        /// Second press of a double click: releasing it must not start a rename.
        repeat: bool,
    },
    PendingClick {
        key: PhaseKey,
        deadline: Duration,
    },
    Dragging {
        grip: BlockGrip,
        over: Option<DropCell>,
    },
    Resizing {
        grip: BlockGrip,
        edge: ResizeEdge,
        origin_x: f32,
        start: usize,
        end: usize,
    },
}

#[derive(Debug, Clone)]
pub struct GestureMachine {
    config: GestureConfig,
    geometry: GridGeometry,
    state: GestureState,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            geometry: GridGeometry {
                column_width: 0.0,
                last_index: 0,
            },
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// Feed one event and get what it resolved to.
    pub fn handle(&mut self, event: PointerEvent) -> GestureOutcome {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        let (next, outcome) = self.step(state, event);
        if next != self.state {
            tracing::trace!(state = ?next, "gesture transition");
        }
        self.state = next;
        outcome
    }

    fn step(&self, state: GestureState, event: PointerEvent) -> (GestureState, GestureOutcome) {
        use GestureState as S;

        match event {
            PointerEvent::DoubleClick { key, .. } => (S::Idle, GestureOutcome::OpenEditor(key)),

            PointerEvent::Cancel => {
                let outcome = if state == S::Idle {
                    GestureOutcome::None
                } else {
                    GestureOutcome::Cancelled
                };
                (S::Idle, outcome)
            }

            PointerEvent::Press {
                target,
                button: PointerButton::Secondary,
                pos,
                ..
            } => {
                let outcome = match target {
                    PressTarget::Phase { grip, .. } => GestureOutcome::ContextMenu { key: grip.key, pos },
                    PressTarget::Cell(cell) => GestureOutcome::CellMenu { cell, pos },
                };
                (S::Idle, outcome)
            }

            PointerEvent::Press {
                target,
                button: PointerButton::Primary,
                pos,
                ..
            } => match target {
                PressTarget::Cell(_) => (S::Idle, GestureOutcome::None),
                PressTarget::Phase { grip, part } => {
                    let edge = match part {
                        HitPart::LeftHandle => Some(ResizeEdge::Left),
                        HitPart::RightHandle => Some(ResizeEdge::Right),
                        HitPart::Body => None,
                    };
                    match edge {
                        Some(edge) => {
                            let (start, end) = (grip.start, grip.end);
                            (
                                S::Resizing {
                                    grip,
                                    edge,
                                    origin_x: pos.x,
                                    start,
                                    end,
                                },
                                GestureOutcome::None,
                            )
                        }
                        None => {
                            let repeat = matches!(&state, S::PendingClick { key, .. } if *key == grip.key);
                            (
                                S::Pressed {
                                    grip,
                                    origin: pos,
                                    repeat,
                                },
                                GestureOutcome::None,
                            )
                        }
                    }
                }
            },

            PointerEvent::Move { pos, over, .. } => match state {
                S::Pressed {
                    grip,
                    origin,
                    repeat,
                } => {
                    let threshold = self.config.drag_threshold;
                    if (pos.x - origin.x).abs() > threshold || (pos.y - origin.y).abs() > threshold {
                        let key = grip.key.clone();
                        (
                            S::Dragging {
                                grip,
                                over: over.clone(),
                            },
                            GestureOutcome::DragHover { key, over },
                        )
                    } else {
                        (
                            S::Pressed {
                                grip,
                                origin,
                                repeat,
                            },
                            GestureOutcome::None,
                        )
                    }
                }
                S::Dragging { grip, .. } => {
                    let key = grip.key.clone();
                    (
                        S::Dragging {
                            grip,
                            over: over.clone(),
                        },
                        GestureOutcome::DragHover { key, over },
                    )
                }
                S::Resizing {
                    grip,
                    edge,
                    origin_x,
                    start,
                    end,
                } => {
                    let delta = buckets_for_delta(pos.x - origin_x, self.geometry.column_width);
                    let (new_start, new_end) =
                        plan_resize(&grip, edge, delta, self.geometry.last_index);
                    let outcome = if (new_start, new_end) != (start, end) {
                        GestureOutcome::ResizePreview {
                            key: grip.key.clone(),
                            edge,
                            start: new_start,
                            end: new_end,
                        }
                    } else {
                        GestureOutcome::None
                    };
                    (
                        S::Resizing {
                            grip,
                            edge,
                            origin_x,
                            start: new_start,
                            end: new_end,
                        },
                        outcome,
                    )
                }
                other => (other, GestureOutcome::None),
            },

            PointerEvent::Release { pos, over, at } => match state {
                S::Pressed { repeat: true, .. } => (S::Idle, GestureOutcome::None),
                S::Pressed { grip, .. } => (
                    S::PendingClick {
                        key: grip.key,
                        deadline: at + self.config.click_delay,
                    },
                    GestureOutcome::None,
                ),
                S::Dragging { grip, over: hover } => match over.or(hover) {
                    Some(target) => (S::Idle, GestureOutcome::Drop { grip, target }),
                    None => (S::Idle, GestureOutcome::Cancelled),
                },
                S::Resizing {
                    grip,
                    edge,
                    origin_x,
                    ..
                } => {
                    let delta = buckets_for_delta(pos.x - origin_x, self.geometry.column_width);
                    let (start, end) = plan_resize(&grip, edge, delta, self.geometry.last_index);
                    if (start, end) == (grip.start, grip.end) {
                        (S::Idle, GestureOutcome::Cancelled)
                    } else {
                        (
                            S::Idle,
                            GestureOutcome::Resize {
                                grip,
                                edge,
                                start,
                                end,
                            },
                        )
                    }
                }
                other => (other, GestureOutcome::None),
            },

            PointerEvent::Tick { at } => match state {
                S::PendingClick { key, deadline } if at >= deadline => {
                    (S::Idle, GestureOutcome::BeginRename(key))
                }
                other => (other, GestureOutcome::None),
            },
        }
    }
}

/// Whole buckets covered by a horizontal pointer delta.
pub fn buckets_for_delta(delta_px: f32, column_width: f32) -> i64 {
    if column_width <= 0.0 || !delta_px.is_finite() {
        return 0;
    }
    (delta_px / column_width).round() as i64
}

/// New span after dragging one edge by `delta` buckets.
///
/// The left edge stays within `[0, end]`, the right edge within
/// `[start, last_index]`, so a phase always keeps at least one bucket.
pub fn plan_resize(grip: &BlockGrip, edge: ResizeEdge, delta: i64, last_index: usize) -> (usize, usize) {
    match edge {
        ResizeEdge::Left => {
            let start = (grip.start as i64 + delta).clamp(0, grip.end as i64) as usize;
            (start, grip.end)
        }
        ResizeEdge::Right => {
            let upper = last_index.max(grip.start) as i64;
            let end = (grip.end as i64 + delta).max(grip.start as i64).min(upper) as usize;
            (grip.start, end)
        }
    }
}

/// New span after dropping a block on `target`, keeping its duration.
pub fn plan_move(grip: &BlockGrip, target: &DropCell, last_index: usize) -> Result<(usize, usize), Rejection> {
    if target.chantier != grip.key.chantier {
        return Err(Rejection::CrossChantierDrop {
            from: grip.key.chantier.clone(),
            to: target.chantier.clone(),
        });
    }
    let delta = target.bucket as i64 - grip.start as i64;
    let start = grip.start as i64 + delta;
    let end = grip.end as i64 + delta;
    if start < 0 || end > last_index as i64 {
        return Err(Rejection::BeyondWindow {
            phase: grip.key.phase.clone(),
        });
    }
    Ok((start as usize, end as usize))
}
