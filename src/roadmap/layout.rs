//! Layout projection in two steps.
//!
//! [`compute_logical_layout`] works purely in bucket indices and lanes.
//! [`LogicalLayout::apply_measured_widths`] turns that into pixels once a grid
//! cell has been laid out and its width measured. Blocks are positioned
//! relative to their start cell, never against the whole grid.

use crate::model::{Chantier, Phase, PhaseKey, RoadmapSnapshot, Sprint};
use crate::roadmap::axis::TimeAxis;
use crate::roadmap::lanes::{assign_lanes, LaneItem};

/// Horizontal gutter on each side of a phase block.
pub const DEFAULT_PHASE_MARGIN: f32 = 4.0;

/// A phase placed on bucket indices and a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalBlock {
    /// Index into [`RoadmapSnapshot::phases`].
    pub phase: usize,
    pub key: PhaseKey,
    pub start: usize,
    pub end: usize,
    pub lane: usize,
    pub total_lanes: usize,
    pub clamped: bool,
}

impl LogicalBlock {
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRow {
    pub chantier: String,
    pub total_lanes: usize,
    pub blocks: Vec<LogicalBlock>,
}

impl LogicalRow {
    /// Blocks attached to the cell at `bucket`.
    pub fn starting_at(&self, bucket: usize) -> impl Iterator<Item = &LogicalBlock> {
        self.blocks.iter().filter(move |b| b.start == bucket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLayout {
    pub bucket_count: usize,
    pub rows: Vec<LogicalRow>,
}

/// Resolve and stack the phases of one chantier.
///
/// `phases` yields `(index into the snapshot, phase)`; unanchored phases and
/// phases entirely outside the axis are skipped.
pub fn layout_row<'a>(
    axis: &TimeAxis,
    sprints: &[Sprint],
    chantier: &str,
    phases: impl IntoIterator<Item = (usize, &'a Phase)>,
) -> LogicalRow {
    let mut resolved = Vec::new();
    for (index, phase) in phases {
        let Some(anchor) = &phase.anchor else {
            tracing::debug!(phase = %phase.key(), "phase has no bucket anchor");
            continue;
        };
        if let Some(span) = axis.resolve_span(anchor, sprints) {
            resolved.push((index, phase, span));
        }
    }

    let items: Vec<LaneItem<usize>> = resolved
        .iter()
        .map(|(index, _, span)| LaneItem::new(*index, span.start, span.end))
        .collect();
    let lanes = assign_lanes(&items);

    let blocks = resolved
        .into_iter()
        .map(|(index, phase, span)| LogicalBlock {
            phase: index,
            key: phase.key(),
            start: span.start,
            end: span.end,
            lane: lanes.lane_of(&index).unwrap_or(0),
            total_lanes: lanes.total_lanes,
            clamped: span.clamped,
        })
        .collect();

    LogicalRow {
        chantier: chantier.to_string(),
        total_lanes: lanes.total_lanes,
        blocks,
    }
}

/// One logical row per chantier, in the given order.
pub fn compute_logical_layout(
    axis: &TimeAxis,
    snapshot: &RoadmapSnapshot,
    chantiers: &[&Chantier],
) -> LogicalLayout {
    let rows = chantiers
        .iter()
        .map(|chantier| {
            let phases = snapshot
                .phases
                .iter()
                .enumerate()
                .filter(|(_, p)| p.chantier == chantier.name);
            layout_row(axis, &snapshot.sprints, &chantier.name, phases)
        })
        .collect();
    LogicalLayout {
        bucket_count: axis.len(),
        rows,
    }
}

// ── Pixel projection ─────────────────────────────────────────────────────────

/// Column width measured from a rendered cell, plus the block gutter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMetrics {
    pub column_width: f32,
    pub margin: f32,
}

impl ColumnMetrics {
    /// `None` for a cell that has not been laid out yet (zero or negative width).
    pub fn measured(cell_width: f32, margin: f32) -> Option<Self> {
        (cell_width.is_finite() && cell_width > 0.0).then_some(Self {
            column_width: cell_width,
            margin,
        })
    }
}

/// Vertical placement inside a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalPlacement {
    /// Single-lane rows skip the percentage math.
    Full,
    Fraction { top_percent: f32, height_percent: f32 },
}

impl VerticalPlacement {
    pub fn for_lane(lane: usize, total_lanes: usize) -> Self {
        if total_lanes <= 1 {
            return VerticalPlacement::Full;
        }
        let height_percent = 100.0 / total_lanes as f32;
        VerticalPlacement::Fraction {
            top_percent: lane as f32 * height_percent,
            height_percent,
        }
    }

    /// `(top offset, height)` in pixels for a row of `row_height`.
    pub fn resolve(self, row_height: f32) -> (f32, f32) {
        match self {
            VerticalPlacement::Full => (0.0, row_height),
            VerticalPlacement::Fraction {
                top_percent,
                height_percent,
            } => (
                row_height * top_percent / 100.0,
                row_height * height_percent / 100.0,
            ),
        }
    }
}

/// A block in pixels, relative to the left edge of its start cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBlock {
    pub block: LogicalBlock,
    pub left: f32,
    pub width: f32,
    pub vertical: VerticalPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelRow {
    pub chantier: String,
    pub total_lanes: usize,
    pub blocks: Vec<PixelBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelLayout {
    pub metrics: ColumnMetrics,
    pub rows: Vec<PixelRow>,
}

pub fn project_block(block: &LogicalBlock, metrics: ColumnMetrics) -> PixelBlock {
    let width = block.span() as f32 * metrics.column_width - 2.0 * metrics.margin;
    PixelBlock {
        block: block.clone(),
        left: metrics.margin,
        width: width.max(0.0),
        vertical: VerticalPlacement::for_lane(block.lane, block.total_lanes),
    }
}

impl LogicalLayout {
    pub fn apply_measured_widths(&self, metrics: ColumnMetrics) -> PixelLayout {
        PixelLayout {
            metrics,
            rows: self
                .rows
                .iter()
                .map(|row| PixelRow {
                    chantier: row.chantier.clone(),
                    total_lanes: row.total_lanes,
                    blocks: row
                        .blocks
                        .iter()
                        .map(|b| project_block(b, metrics))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BucketAnchor, PhaseCategory, TimeMode};
    use crate::roadmap::axis::DateRange;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> RoadmapSnapshot {
        let sprint = |name: &str, start: NaiveDate| {
            Sprint::new(name, start, start + chrono::Duration::days(14))
        };
        let phase = |name: &str, s: &str, e: &str| {
            Phase::new(
                "Alpha",
                name,
                PhaseCategory::Dev,
                BucketAnchor::new(TimeMode::Sprint, s, e),
            )
        };
        RoadmapSnapshot::new(
            vec![Chantier::new("Alpha"), Chantier::new("Beta")],
            vec![
                phase("P1", "Sprint1", "Sprint2"),
                phase("P2", "Sprint1", "Sprint3"),
                phase("P3", "Sprint3", "Sprint3"),
            ],
            vec![
                sprint("Sprint1", date(2025, 1, 6)),
                sprint("Sprint2", date(2025, 1, 20)),
                sprint("Sprint3", date(2025, 2, 3)),
            ],
            Vec::new(),
        )
    }

    fn layout() -> LogicalLayout {
        let snap = snapshot();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 1), date(2025, 3, 1)),
            &snap.sprints,
        );
        let chantiers: Vec<&Chantier> = snap.chantiers.iter().collect();
        compute_logical_layout(&axis, &snap, &chantiers)
    }

    #[test]
    fn logical_layout_matches_lane_scenario() {
        let layout = layout();
        let alpha = &layout.rows[0];
        let summary: Vec<_> = alpha
            .blocks
            .iter()
            .map(|b| (b.key.phase.as_str(), b.start, b.end, b.lane))
            .collect();
        assert_eq!(
            summary,
            vec![("P1", 0, 1, 0), ("P2", 0, 2, 1), ("P3", 2, 2, 0)]
        );
        assert_eq!(alpha.total_lanes, 2);
        assert_eq!(layout.rows[1].total_lanes, 1);
        assert!(layout.rows[1].blocks.is_empty());
        assert_eq!(alpha.starting_at(0).count(), 2);
    }

    #[test]
    fn pixels_follow_measured_width() {
        let metrics = ColumnMetrics::measured(120.0, DEFAULT_PHASE_MARGIN).unwrap();
        let pixels = layout().apply_measured_widths(metrics);
        let p2 = &pixels.rows[0].blocks[1];
        assert_eq!(p2.block.key.phase, "P2");
        assert_eq!(p2.left, 4.0);
        assert_eq!(p2.width, 3.0 * 120.0 - 8.0);
        assert_eq!(
            p2.vertical,
            VerticalPlacement::Fraction {
                top_percent: 50.0,
                height_percent: 50.0
            }
        );
    }

    #[test]
    fn single_lane_is_full_height() {
        assert_eq!(VerticalPlacement::for_lane(0, 1), VerticalPlacement::Full);
        assert_eq!(VerticalPlacement::Full.resolve(36.0), (0.0, 36.0));
        let third = VerticalPlacement::for_lane(2, 4).resolve(40.0);
        assert_eq!(third, (20.0, 10.0));
    }

    #[test]
    fn unmeasured_cells_are_rejected() {
        assert!(ColumnMetrics::measured(0.0, 4.0).is_none());
        assert!(ColumnMetrics::measured(f32::NAN, 4.0).is_none());
    }

    #[test]
    fn narrow_columns_never_yield_negative_width() {
        let block = &layout().rows[0].blocks[2];
        let px = project_block(block, ColumnMetrics::measured(6.0, 4.0).unwrap());
        assert_eq!(px.width, 0.0);
    }
}
