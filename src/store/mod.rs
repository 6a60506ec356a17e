//! Persistence collaborator interface.
//!
//! The roadmap never owns its storage: rows are read as whole collections and
//! mutated through opaque [`RowHandle`]s handed out by the store. Handles are
//! only valid for the read that produced them, so callers re-read and re-match
//! by logical key before every write.

pub mod csv_workbook;
pub mod memory;

pub use csv_workbook::CsvWorkbook;
pub use memory::{MemoryStore, StoreCall};

use crate::error::StoreError;
use serde_json::Value;

/// Field map of a stored row (column header → cell value).
pub type Fields = serde_json::Map<String, Value>;

/// Collection names as they appear in the workbook.
pub mod collections {
    pub const CHANTIERS: &str = "Chantiers";
    pub const PHASES: &str = "Phases";
    pub const SPRINTS: &str = "Sprints";
    pub const PHASE_LINKS: &str = "PhasesLiens";

    pub const ALL: [&str; 4] = [CHANTIERS, PHASES, SPRINTS, PHASE_LINKS];
}

/// Opaque reference to a stored row, valid until the next write to its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowHandle(u64);

impl RowHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One row read from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub handle: RowHandle,
    pub fields: Fields,
}

impl Row {
    /// Cell as trimmed text; numbers and booleans are stringified, blanks are `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        cell_text(self.fields.get(column)?)
    }
}

pub(crate) fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Spreadsheet-backed storage consumed by the roadmap.
///
/// Calls are synchronous and each may fail independently; multi-row updates
/// are issued one call at a time with no transaction around them.
pub trait RoadmapStore {
    fn read_collection(&mut self, collection: &str) -> Result<Vec<Row>, StoreError>;

    fn insert_row(&mut self, collection: &str, fields: Fields) -> Result<(), StoreError>;

    fn update_row(
        &mut self,
        collection: &str,
        handle: RowHandle,
        fields: Fields,
    ) -> Result<(), StoreError>;

    fn delete_row(&mut self, collection: &str, handle: RowHandle) -> Result<(), StoreError>;

    /// Drop any cached copy of `collection` so the next read hits storage.
    fn invalidate_cache(&mut self, collection: &str);
}

impl<S: RoadmapStore + ?Sized> RoadmapStore for Box<S> {
    fn read_collection(&mut self, collection: &str) -> Result<Vec<Row>, StoreError> {
        (**self).read_collection(collection)
    }

    fn insert_row(&mut self, collection: &str, fields: Fields) -> Result<(), StoreError> {
        (**self).insert_row(collection, fields)
    }

    fn update_row(
        &mut self,
        collection: &str,
        handle: RowHandle,
        fields: Fields,
    ) -> Result<(), StoreError> {
        (**self).update_row(collection, handle, fields)
    }

    fn delete_row(&mut self, collection: &str, handle: RowHandle) -> Result<(), StoreError> {
        (**self).delete_row(collection, handle)
    }

    fn invalidate_cache(&mut self, collection: &str) {
        (**self).invalidate_cache(collection)
    }
}

/// Build a [`Fields`] map from `(column, text)` pairs.
pub fn fields<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Fields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_normalizes_cells() {
        let row = Row {
            handle: RowHandle::new(0),
            fields: json!({ "a": "  Dev ", "b": "", "c": 3, "d": true, "e": null })
                .as_object()
                .cloned()
                .unwrap(),
        };
        assert_eq!(row.text("a").as_deref(), Some("Dev"));
        assert_eq!(row.text("b"), None);
        assert_eq!(row.text("c").as_deref(), Some("3"));
        assert_eq!(row.text("d").as_deref(), Some("true"));
        assert_eq!(row.text("e"), None);
        assert_eq!(row.text("missing"), None);
    }
}
