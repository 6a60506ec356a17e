use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{columns, parse_date};
use crate::store::Row;

/// A named sprint spanning `[start, end]` as stored in the sprint sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Sprint {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Parse a sprint row; rows without a name or valid dates are skipped.
    pub fn from_row(row: &Row) -> Option<Self> {
        let name = row.text(columns::SPRINT)?;
        let start = row.text(columns::START).as_deref().and_then(parse_date);
        let end = row.text(columns::END).as_deref().and_then(parse_date);
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(name, start, end.max(start))),
            _ => {
                tracing::warn!(sprint = %name, "skipping sprint without valid dates");
                None
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
