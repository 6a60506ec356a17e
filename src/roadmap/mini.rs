//! Read-only week-by-week view of one chantier's phases, shown in the
//! chantier detail window.

use chrono::NaiveDate;

use crate::model::{BucketAnchor, RoadmapSnapshot, TimeMode};
use crate::roadmap::axis::{date_of_week_code, monday_of, weeks_in_sprint, DateRange, TimeAxis};
use crate::roadmap::grid::PhaseBlock;
use crate::roadmap::layout::layout_row;

#[derive(Debug, Clone, PartialEq)]
pub struct MiniRoadmap {
    pub chantier: String,
    /// Always made of ISO weeks.
    pub axis: TimeAxis,
    pub total_lanes: usize,
    pub blocks: Vec<PhaseBlock>,
    /// Column holding the chantier's desired date, if visible.
    pub target_index: Option<usize>,
    pub current_index: Option<usize>,
}

/// Week codes an anchor starts and ends in, where they can be determined.
fn anchor_weeks(anchor: &BucketAnchor, snapshot: &RoadmapSnapshot) -> (Option<String>, Option<String>) {
    match anchor {
        BucketAnchor::Week { start, end } => (
            date_of_week_code(start).map(|_| start.clone()),
            date_of_week_code(end).map(|_| end.clone()),
        ),
        BucketAnchor::Sprint { start, end } => (
            snapshot
                .sprint(start)
                .and_then(|s| weeks_in_sprint(s).into_iter().next()),
            snapshot
                .sprint(end)
                .and_then(|s| weeks_in_sprint(s).into_iter().last()),
        ),
    }
}

/// The week window a chantier's phases cover, or `today`'s week plus
/// `fallback_weeks` when nothing can be placed.
pub fn mini_window(snapshot: &RoadmapSnapshot, chantier: &str, today: NaiveDate, fallback_weeks: u32) -> DateRange {
    let mut first: Option<NaiveDate> = None;
    let mut last: Option<NaiveDate> = None;
    for anchor in snapshot.phases_of(chantier).filter_map(|p| p.anchor.as_ref()) {
        let (start, end) = anchor_weeks(anchor, snapshot);
        for monday in [start, end].into_iter().flatten().filter_map(|c| date_of_week_code(&c)) {
            first = Some(first.map_or(monday, |f| f.min(monday)));
            last = Some(last.map_or(monday, |l| l.max(monday)));
        }
    }
    match (first, last) {
        (Some(first), Some(last)) => DateRange::new(first, last),
        _ => {
            let monday = monday_of(today);
            DateRange::new(monday, monday + chrono::Duration::weeks(i64::from(fallback_weeks)))
        }
    }
}

pub fn project_mini(
    snapshot: &RoadmapSnapshot,
    chantier: &str,
    today: NaiveDate,
    fallback_weeks: u32,
) -> MiniRoadmap {
    let range = mini_window(snapshot, chantier, today, fallback_weeks);
    let axis = TimeAxis::build(TimeMode::Week, range, &snapshot.sprints);

    let phases = snapshot
        .phases
        .iter()
        .enumerate()
        .filter(|(_, p)| p.chantier == chantier);
    let row = layout_row(&axis, &snapshot.sprints, chantier, phases);
    let blocks = row
        .blocks
        .iter()
        .map(|b| PhaseBlock::new(snapshot, b))
        .collect();

    let target_index = snapshot
        .chantier(chantier)
        .and_then(|c| c.target_date)
        .and_then(|d| axis.buckets.iter().position(|b| b.start <= d && d <= b.end));

    MiniRoadmap {
        chantier: chantier.to_string(),
        current_index: axis.current_index(today),
        axis,
        total_lanes: row.total_lanes,
        blocks,
        target_index,
    }
}
