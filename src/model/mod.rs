pub mod chantier;
pub mod phase;
pub mod snapshot;
pub mod sprint;

pub use chantier::Chantier;
pub use phase::{BucketAnchor, Phase, PhaseCategory, PhaseKey, PhaseLink};
pub use snapshot::RoadmapSnapshot;
pub use sprint::Sprint;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which kind of bucket the time axis is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeMode {
    #[default]
    Sprint,
    Week,
}

impl TimeMode {
    pub fn label(self) -> &'static str {
        match self {
            TimeMode::Sprint => "Sprints",
            TimeMode::Week => "Weeks",
        }
    }
}

/// Column headers of the roadmap collections.
pub mod columns {
    pub const CHANTIER: &str = "Chantier";
    pub const ARCHIVED: &str = "Archivé";
    pub const RESPONSIBLE: &str = "Responsable";
    pub const PERIMETER: &str = "Périmètre";
    pub const DESCRIPTION: &str = "Description";
    pub const TARGET_DATE: &str = "Date souhaitée";

    pub const PHASE: &str = "Phase";
    pub const TYPE: &str = "Type";
    pub const SPRINT_START: &str = "Sprint début";
    pub const SPRINT_END: &str = "Sprint fin";
    pub const WEEK_START: &str = "Semaine début";
    pub const WEEK_END: &str = "Semaine fin";

    pub const SPRINT: &str = "Sprint";
    pub const START: &str = "Début";
    pub const END: &str = "Fin";

    pub const LINK_NAME: &str = "Nom";
    pub const LINK_URL: &str = "URL";
}

/// Try parsing a cell date with the formats the workbook is known to contain.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Spreadsheet exports sometimes carry a time part ("2025-01-06T00:00:00Z").
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
