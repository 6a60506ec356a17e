use chrono::NaiveDate;

use super::{columns, parse_date};
use crate::store::{Row, RowHandle};

/// A workstream; one row of the roadmap grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Chantier {
    pub handle: Option<RowHandle>,
    pub name: String,
    pub archived: bool,
    pub responsible: Option<String>,
    pub perimeter: Option<String>,
    pub description: Option<String>,
    /// Desired completion date, highlighted on the mini roadmap.
    pub target_date: Option<NaiveDate>,
}

impl Chantier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            handle: None,
            name: name.into(),
            archived: false,
            responsible: None,
            perimeter: None,
            description: None,
            target_date: None,
        }
    }

    pub fn from_row(row: &Row) -> Option<Self> {
        let name = row.text(columns::CHANTIER)?;
        Some(Self {
            handle: Some(row.handle),
            name,
            archived: row
                .text(columns::ARCHIVED)
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            responsible: row.text(columns::RESPONSIBLE),
            perimeter: row.text(columns::PERIMETER),
            description: row.text(columns::DESCRIPTION),
            target_date: row
                .text(columns::TARGET_DATE)
                .as_deref()
                .and_then(parse_date),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "oui" | "yes" | "1" | "x"
    )
}
