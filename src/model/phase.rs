use egui::Color32;

use super::{columns, TimeMode};
use crate::store::{fields, Fields, Row, RowHandle};

/// Category of a phase; drives its bar color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhaseCategory {
    Eb,
    Cadrage,
    Dev,
    Recette,
    Mep,
    /// Any other value found in the sheet; kept verbatim so writes don't lose it.
    Other(String),
}

impl PhaseCategory {
    pub fn all() -> &'static [PhaseCategory] {
        &[
            PhaseCategory::Eb,
            PhaseCategory::Cadrage,
            PhaseCategory::Dev,
            PhaseCategory::Recette,
            PhaseCategory::Mep,
        ]
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "eb" => PhaseCategory::Eb,
            "cadrage" => PhaseCategory::Cadrage,
            "dev" => PhaseCategory::Dev,
            "recette" => PhaseCategory::Recette,
            "mep" => PhaseCategory::Mep,
            _ => PhaseCategory::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PhaseCategory::Eb => "EB",
            PhaseCategory::Cadrage => "Cadrage",
            PhaseCategory::Dev => "Dev",
            PhaseCategory::Recette => "Recette",
            PhaseCategory::Mep => "MEP",
            PhaseCategory::Other(raw) => raw,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            PhaseCategory::Eb => Color32::from_rgb(120, 144, 156),
            PhaseCategory::Cadrage => Color32::from_rgb(171, 71, 188),
            PhaseCategory::Dev => Color32::from_rgb(66, 133, 244),
            PhaseCategory::Recette => Color32::from_rgb(251, 140, 0),
            PhaseCategory::Mep => Color32::from_rgb(52, 168, 83),
            PhaseCategory::Other(_) => Color32::from_rgb(110, 115, 130),
        }
    }
}

/// Where a phase sits on the time axis: a pair of sprint names or of week codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketAnchor {
    Sprint { start: String, end: String },
    Week { start: String, end: String },
}

impl BucketAnchor {
    pub fn new(mode: TimeMode, start: impl Into<String>, end: impl Into<String>) -> Self {
        match mode {
            TimeMode::Sprint => BucketAnchor::Sprint {
                start: start.into(),
                end: end.into(),
            },
            TimeMode::Week => BucketAnchor::Week {
                start: start.into(),
                end: end.into(),
            },
        }
    }

    pub fn mode(&self) -> TimeMode {
        match self {
            BucketAnchor::Sprint { .. } => TimeMode::Sprint,
            BucketAnchor::Week { .. } => TimeMode::Week,
        }
    }

    pub fn start(&self) -> &str {
        match self {
            BucketAnchor::Sprint { start, .. } | BucketAnchor::Week { start, .. } => start,
        }
    }

    pub fn end(&self) -> &str {
        match self {
            BucketAnchor::Sprint { end, .. } | BucketAnchor::Week { end, .. } => end,
        }
    }

    /// Anchor columns to write; the other mode's columns are blanked.
    pub fn to_fields(&self) -> Fields {
        let (start, end, other_start, other_end) = match self {
            BucketAnchor::Sprint { .. } => (
                columns::SPRINT_START,
                columns::SPRINT_END,
                columns::WEEK_START,
                columns::WEEK_END,
            ),
            BucketAnchor::Week { .. } => (
                columns::WEEK_START,
                columns::WEEK_END,
                columns::SPRINT_START,
                columns::SPRINT_END,
            ),
        };
        fields([
            (start, self.start().to_string()),
            (end, self.end().to_string()),
            (other_start, String::new()),
            (other_end, String::new()),
        ])
    }

    fn from_row(row: &Row) -> Option<Self> {
        let pair = |start_col: &str, end_col: &str| {
            let start = row.text(start_col);
            let end = row.text(end_col);
            match (start, end) {
                (Some(s), Some(e)) => Some((s, e)),
                (Some(s), None) => Some((s.clone(), s)),
                (None, Some(e)) => Some((e.clone(), e)),
                (None, None) => None,
            }
        };
        if let Some((start, end)) = pair(columns::WEEK_START, columns::WEEK_END) {
            return Some(BucketAnchor::Week { start, end });
        }
        pair(columns::SPRINT_START, columns::SPRINT_END)
            .map(|(start, end)| BucketAnchor::Sprint { start, end })
    }
}

/// Logical identity of a phase: its chantier plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseKey {
    pub chantier: String,
    pub phase: String,
}

impl PhaseKey {
    pub fn new(chantier: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            chantier: chantier.into(),
            phase: phase.into(),
        }
    }
}

impl std::fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.chantier, self.phase)
    }
}

/// A time-boxed activity of a chantier.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub handle: Option<RowHandle>,
    pub chantier: String,
    pub name: String,
    pub category: PhaseCategory,
    pub description: Option<String>,
    /// `None` when the row carries neither sprint nor week references.
    pub anchor: Option<BucketAnchor>,
}

impl Phase {
    pub fn new(
        chantier: impl Into<String>,
        name: impl Into<String>,
        category: PhaseCategory,
        anchor: BucketAnchor,
    ) -> Self {
        Self {
            handle: None,
            chantier: chantier.into(),
            name: name.into(),
            category,
            description: None,
            anchor: Some(anchor),
        }
    }

    pub fn key(&self) -> PhaseKey {
        PhaseKey::new(&self.chantier, &self.name)
    }

    pub fn from_row(row: &Row) -> Option<Self> {
        let chantier = row.text(columns::CHANTIER)?;
        let name = row.text(columns::PHASE)?;
        Some(Self {
            handle: Some(row.handle),
            chantier,
            name,
            category: row
                .text(columns::TYPE)
                .map(|t| PhaseCategory::parse(&t))
                .unwrap_or(PhaseCategory::Other(String::new())),
            description: row.text(columns::DESCRIPTION),
            anchor: BucketAnchor::from_row(row),
        })
    }

    /// Every column the phase sheet holds for this phase.
    pub fn to_fields(&self) -> Fields {
        let mut out = fields([
            (columns::CHANTIER, self.chantier.clone()),
            (columns::PHASE, self.name.clone()),
            (columns::TYPE, self.category.label().to_string()),
            (
                columns::DESCRIPTION,
                self.description.clone().unwrap_or_default(),
            ),
        ]);
        if let Some(anchor) = &self.anchor {
            out.extend(anchor.to_fields());
        }
        out
    }
}

/// A named URL attached to a phase, keyed by the phase's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseLink {
    pub handle: Option<RowHandle>,
    pub phase: String,
    pub name: String,
    pub url: String,
}

impl PhaseLink {
    pub fn new(phase: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            handle: None,
            phase: phase.into(),
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            handle: Some(row.handle),
            phase: row.text(columns::PHASE)?,
            name: row.text(columns::LINK_NAME).unwrap_or_default(),
            url: row.text(columns::LINK_URL)?,
        })
    }

    pub fn to_fields(&self) -> Fields {
        fields([
            (columns::PHASE, self.phase.clone()),
            (columns::LINK_NAME, self.name.clone()),
            (columns::LINK_URL, self.url.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row {
            handle: RowHandle::new(7),
            fields: fields(pairs.iter().map(|(k, v)| (*k, v.to_string()))),
        }
    }

    #[test]
    fn week_anchor_wins_over_sprint_anchor() {
        let phase = Phase::from_row(&row(&[
            (columns::CHANTIER, "Alpha"),
            (columns::PHASE, "Dev"),
            (columns::SPRINT_START, "S1"),
            (columns::SPRINT_END, "S2"),
            (columns::WEEK_START, "2025S02"),
            (columns::WEEK_END, "2025S05"),
        ]))
        .unwrap();
        assert_eq!(
            phase.anchor,
            Some(BucketAnchor::Week {
                start: "2025S02".into(),
                end: "2025S05".into()
            })
        );
    }

    #[test]
    fn half_anchor_spans_a_single_bucket() {
        let phase = Phase::from_row(&row(&[
            (columns::CHANTIER, "Alpha"),
            (columns::PHASE, "MEP"),
            (columns::SPRINT_START, "S4"),
        ]))
        .unwrap();
        let anchor = phase.anchor.unwrap();
        assert_eq!((anchor.start(), anchor.end()), ("S4", "S4"));
    }

    #[test]
    fn unknown_category_is_preserved() {
        assert_eq!(PhaseCategory::parse(" recette "), PhaseCategory::Recette);
        let other = PhaseCategory::parse("Pilote");
        assert_eq!(other.label(), "Pilote");
    }

    #[test]
    fn anchor_fields_blank_the_other_mode() {
        let f = BucketAnchor::new(TimeMode::Sprint, "S1", "S3").to_fields();
        assert_eq!(f[columns::SPRINT_START], "S1");
        assert_eq!(f[columns::WEEK_START], "");
    }
}
