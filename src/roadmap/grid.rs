//! The roadmap grid: one row per chantier, one column per visible bucket.
//!
//! Each phase appears once, in the cell of its start bucket, carrying its span;
//! the drawing code widens it across the following cells using the pixel
//! layout. Cells where nothing starts are drop targets.

use chrono::NaiveDate;
use egui::Color32;

use crate::model::{PhaseCategory, PhaseKey, RoadmapSnapshot};
use crate::roadmap::axis::{is_current_bucket, TimeAxis};
use crate::roadmap::filter::RoadmapFilter;
use crate::roadmap::layout::{compute_logical_layout, LogicalBlock, LogicalLayout};

/// Why there is nothing to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoBuckets,
    NoChantiers,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoBuckets => "No sprint or week falls inside the selected period.",
            EmptyState::NoChantiers => "No chantier matches the current filters.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub index: usize,
    pub key: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_current: bool,
}

/// A phase as drawn in its start cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBlock {
    pub layout: LogicalBlock,
    pub name: String,
    pub category: PhaseCategory,
    pub color: Color32,
    pub description: Option<String>,
    pub link_count: usize,
}

impl PhaseBlock {
    pub(crate) fn new(snapshot: &RoadmapSnapshot, block: &LogicalBlock) -> Self {
        let phase = &snapshot.phases[block.phase];
        Self {
            layout: block.clone(),
            name: phase.name.clone(),
            category: phase.category.clone(),
            color: phase.category.color(),
            description: phase.description.clone(),
            link_count: snapshot.links_of(&phase.name).count(),
        }
    }

    pub fn key(&self) -> &PhaseKey {
        &self.layout.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub bucket: usize,
    pub blocks: Vec<PhaseBlock>,
}

impl GridCell {
    pub fn is_drop_target(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub chantier: String,
    pub responsible: Option<String>,
    pub total_lanes: usize,
    pub cells: Vec<GridCell>,
}

impl GridRow {
    pub fn blocks(&self) -> impl Iterator<Item = &PhaseBlock> {
        self.cells.iter().flat_map(|c| c.blocks.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapGrid {
    pub axis: TimeAxis,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<GridRow>,
    pub logical: LogicalLayout,
}

impl RoadmapGrid {
    pub fn row(&self, chantier: &str) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.chantier == chantier)
    }

    pub fn block(&self, key: &PhaseKey) -> Option<&PhaseBlock> {
        self.row(&key.chantier)?
            .blocks()
            .find(|b| b.key() == key)
    }

    pub fn last_index(&self) -> usize {
        self.header.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridModel {
    Empty(EmptyState),
    Grid(RoadmapGrid),
}

impl GridModel {
    pub fn grid(&self) -> Option<&RoadmapGrid> {
        match self {
            GridModel::Grid(grid) => Some(grid),
            GridModel::Empty(_) => None,
        }
    }
}

/// Build the grid for the current snapshot and filter.
pub fn build_grid(snapshot: &RoadmapSnapshot, filter: &RoadmapFilter, today: NaiveDate) -> GridModel {
    let axis = TimeAxis::build(filter.mode, filter.range, &snapshot.sprints);
    if axis.is_empty() {
        return GridModel::Empty(EmptyState::NoBuckets);
    }
    let chantiers = filter.apply(&snapshot.chantiers);
    if chantiers.is_empty() {
        return GridModel::Empty(EmptyState::NoChantiers);
    }

    let logical = compute_logical_layout(&axis, snapshot, &chantiers);

    let header = axis
        .buckets
        .iter()
        .enumerate()
        .map(|(index, b)| HeaderCell {
            index,
            key: b.key.clone(),
            label: b.label.clone(),
            start: b.start,
            end: b.end,
            is_current: is_current_bucket(b, today),
        })
        .collect();

    let rows = chantiers
        .iter()
        .zip(&logical.rows)
        .map(|(chantier, row)| {
            let mut cells: Vec<GridCell> = (0..axis.len())
                .map(|bucket| GridCell {
                    bucket,
                    blocks: Vec::new(),
                })
                .collect();
            for block in &row.blocks {
                cells[block.start].blocks.push(PhaseBlock::new(snapshot, block));
            }
            GridRow {
                chantier: chantier.name.clone(),
                responsible: chantier.responsible.clone(),
                total_lanes: row.total_lanes,
                cells,
            }
        })
        .collect();

    GridModel::Grid(RoadmapGrid {
        axis,
        header,
        rows,
        logical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BucketAnchor, Chantier, Phase, PhaseLink, Sprint, TimeMode};
    use crate::roadmap::axis::DateRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(sprints: Vec<Sprint>) -> RoadmapSnapshot {
        RoadmapSnapshot::new(
            vec![Chantier::new("Alpha"), Chantier::new("Beta")],
            vec![
                Phase::new(
                    "Alpha",
                    "Cadrage",
                    PhaseCategory::Cadrage,
                    BucketAnchor::new(TimeMode::Sprint, "S1", "S2"),
                ),
                Phase::new(
                    "Beta",
                    "Dev",
                    PhaseCategory::Dev,
                    BucketAnchor::new(TimeMode::Sprint, "S2", "SprintXX"),
                ),
            ],
            sprints,
            vec![PhaseLink::new("Dev", "Spec", "https://example.org/spec")],
        )
    }

    fn sprints() -> Vec<Sprint> {
        vec![
            Sprint::new("S1", date(2025, 1, 6), date(2025, 1, 20)),
            Sprint::new("S2", date(2025, 1, 20), date(2025, 2, 3)),
            Sprint::new("S3", date(2025, 2, 3), date(2025, 2, 17)),
        ]
    }

    fn filter() -> RoadmapFilter {
        let mut f = RoadmapFilter::around(date(2025, 1, 22), TimeMode::Sprint, 8);
        f.range = DateRange::new(date(2025, 1, 1), date(2025, 3, 1));
        f
    }

    #[test]
    fn phases_sit_in_their_start_cell() {
        let model = build_grid(&snapshot(sprints()), &filter(), date(2025, 1, 22));
        let grid = model.grid().unwrap();
        assert_eq!(grid.header.len(), 3);
        assert!(grid.header[1].is_current);
        assert!(!grid.header[0].is_current);

        let alpha = grid.row("Alpha").unwrap();
        assert_eq!(alpha.cells[0].blocks.len(), 1);
        assert!(alpha.cells[1].is_drop_target());
        assert_eq!(alpha.cells[0].blocks[0].layout.span(), 2);

        let beta = grid.row("Beta").unwrap();
        let dev = &beta.cells[1].blocks[0];
        assert_eq!((dev.layout.start, dev.layout.end), (1, 2));
        assert!(dev.layout.clamped);
        assert_eq!(dev.link_count, 1);
        assert_eq!(grid.block(&PhaseKey::new("Beta", "Dev")).unwrap().name, "Dev");
    }

    #[test]
    fn empty_sprint_table_is_an_explicit_state() {
        let model = build_grid(&snapshot(Vec::new()), &filter(), date(2025, 1, 22));
        assert_eq!(model, GridModel::Empty(EmptyState::NoBuckets));
    }

    #[test]
    fn no_matching_chantier_is_an_explicit_state() {
        let mut f = filter();
        f.search = "zzz".into();
        let model = build_grid(&snapshot(sprints()), &f, date(2025, 1, 22));
        assert_eq!(model, GridModel::Empty(EmptyState::NoChantiers));
    }
}
