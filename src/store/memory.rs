use std::collections::BTreeMap;

use super::{collections, Fields, RoadmapStore, Row, RowHandle};
use crate::error::StoreError;

/// A call made against a [`MemoryStore`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Read(String),
    Insert(String, Fields),
    Update(String, RowHandle, Fields),
    Delete(String, RowHandle),
    Invalidate(String),
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::Insert(..) | StoreCall::Update(..) | StoreCall::Delete(..)
        )
    }
}

/// In-memory store with positional row handles.
///
/// Handles are the row's current position, so deleting a row shifts every
/// handle after it, exactly like a spreadsheet re-indexing its rows.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<Fields>>,
    journal: Vec<StoreCall>,
    writes: usize,
    fail_writes_from: Option<usize>,
    fail_reads: bool,
}

impl MemoryStore {
    /// An empty store with the four roadmap collections registered.
    pub fn new() -> Self {
        let mut store = Self::default();
        for name in collections::ALL {
            store.tables.insert(name.to_string(), Vec::new());
        }
        store
    }

    pub fn with_rows(mut self, collection: &str, rows: impl IntoIterator<Item = Fields>) -> Self {
        self.tables
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Every write numbered `n` or later (zero-based) fails.
    pub fn fail_writes_from(&mut self, n: usize) {
        self.fail_writes_from = Some(n);
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn heal(&mut self) {
        self.fail_writes_from = None;
        self.fail_reads = false;
    }

    pub fn journal(&self) -> &[StoreCall] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn write_count(&self) -> usize {
        self.journal.iter().filter(|c| c.is_write()).count()
    }

    /// Current contents of a collection, without journaling a read.
    pub fn rows(&self, collection: &str) -> &[Fields] {
        self.tables.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, collection: &str) -> Result<&mut Vec<Fields>, StoreError> {
        self.tables
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
    }

    fn check_write(&mut self) -> Result<(), StoreError> {
        let n = self.writes;
        self.writes += 1;
        match self.fail_writes_from {
            Some(limit) if n >= limit => Err(StoreError::Backend(format!(
                "simulated failure on write {}",
                n
            ))),
            _ => Ok(()),
        }
    }

    fn position(
        &self,
        collection: &str,
        handle: RowHandle,
        len: usize,
    ) -> Result<usize, StoreError> {
        let idx = handle.raw() as usize;
        if idx < len {
            Ok(idx)
        } else {
            Err(StoreError::RowNotFound {
                collection: collection.to_string(),
                handle,
            })
        }
    }
}

impl RoadmapStore for MemoryStore {
    fn read_collection(&mut self, collection: &str) -> Result<Vec<Row>, StoreError> {
        self.journal.push(StoreCall::Read(collection.to_string()));
        if self.fail_reads {
            return Err(StoreError::Backend("simulated read failure".into()));
        }
        let table = self
            .tables
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(table
            .iter()
            .enumerate()
            .map(|(i, fields)| Row {
                handle: RowHandle::new(i as u64),
                fields: fields.clone(),
            })
            .collect())
    }

    fn insert_row(&mut self, collection: &str, fields: Fields) -> Result<(), StoreError> {
        self.journal
            .push(StoreCall::Insert(collection.to_string(), fields.clone()));
        self.check_write()?;
        self.table_mut(collection)?.push(fields);
        Ok(())
    }

    fn update_row(
        &mut self,
        collection: &str,
        handle: RowHandle,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.journal.push(StoreCall::Update(
            collection.to_string(),
            handle,
            fields.clone(),
        ));
        self.check_write()?;
        let len = self.rows(collection).len();
        let idx = self.position(collection, handle, len)?;
        let row = &mut self.table_mut(collection)?[idx];
        for (k, v) in fields {
            row.insert(k, v);
        }
        Ok(())
    }

    fn delete_row(&mut self, collection: &str, handle: RowHandle) -> Result<(), StoreError> {
        self.journal
            .push(StoreCall::Delete(collection.to_string(), handle));
        self.check_write()?;
        let len = self.rows(collection).len();
        let idx = self.position(collection, handle, len)?;
        self.table_mut(collection)?.remove(idx);
        Ok(())
    }

    fn invalidate_cache(&mut self, collection: &str) {
        self.journal
            .push(StoreCall::Invalidate(collection.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fields;

    fn named(name: &str) -> Fields {
        fields([("Phase", name.to_string())])
    }

    #[test]
    fn delete_shifts_later_handles() {
        let mut store = MemoryStore::new().with_rows(
            collections::PHASE_LINKS,
            [named("a"), named("b"), named("c")],
        );
        store
            .delete_row(collections::PHASE_LINKS, RowHandle::new(0))
            .unwrap();
        let rows = store.read_collection(collections::PHASE_LINKS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].handle, RowHandle::new(0));
        assert_eq!(rows[0].text("Phase").as_deref(), Some("b"));
    }

    #[test]
    fn update_merges_fields() {
        let mut store = MemoryStore::new().with_rows(collections::PHASES, [named("Dev")]);
        store
            .update_row(
                collections::PHASES,
                RowHandle::new(0),
                fields([("Sprint fin", "S3".to_string())]),
            )
            .unwrap();
        let row = &store.rows(collections::PHASES)[0];
        assert_eq!(row["Phase"], "Dev");
        assert_eq!(row["Sprint fin"], "S3");
    }

    #[test]
    fn injected_failures_still_journal_the_call() {
        let mut store = MemoryStore::new();
        store.fail_writes_from(0);
        let err = store.insert_row(collections::PHASES, named("x"));
        assert!(err.is_err());
        assert_eq!(store.write_count(), 1);
        assert!(store.rows(collections::PHASES).is_empty());
    }

    #[test]
    fn unknown_handle_is_reported() {
        let mut store = MemoryStore::new();
        let err = store
            .delete_row(collections::PHASES, RowHandle::new(4))
            .unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }
}
