use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{cell_text, Fields, RoadmapStore, Row, RowHandle};
use crate::error::StoreError;

/// A "spreadsheet" made of one CSV file per collection inside a directory.
///
/// Row handles are zero-based data-row positions, so they shift after a
/// delete. Reads are cached per collection until [`RoadmapStore::invalidate_cache`].
#[derive(Debug)]
pub struct CsvWorkbook {
    dir: PathBuf,
    cache: HashMap<String, Vec<Row>>,
}

struct Sheet {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CsvWorkbook {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sheet_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", collection))
    }

    fn load_sheet(&self, collection: &str) -> Result<Sheet, StoreError> {
        let path = self.sheet_path(collection);
        if !path.exists() {
            return Ok(Sheet {
                headers: Vec::new(),
                records: Vec::new(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let first_line = content.lines().next().unwrap_or("");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(detect_delimiter(first_line))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok(Sheet { headers, records })
    }

    fn save_sheet(&self, collection: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_path(self.sheet_path(collection))?;
        wtr.write_record(&sheet.headers)?;
        for record in &sheet.records {
            let padded: Vec<&str> = (0..sheet.headers.len())
                .map(|i| record.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            wtr.write_record(&padded)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn position(sheet: &Sheet, collection: &str, handle: RowHandle) -> Result<usize, StoreError> {
        let idx = handle.raw() as usize;
        if idx < sheet.records.len() {
            Ok(idx)
        } else {
            Err(StoreError::RowNotFound {
                collection: collection.to_string(),
                handle,
            })
        }
    }
}

impl Sheet {
    fn column(&mut self, header: &str) -> usize {
        if let Some(i) = self.headers.iter().position(|h| h == header) {
            return i;
        }
        self.headers.push(header.to_string());
        self.headers.len() - 1
    }

    fn write_fields(&mut self, idx: usize, fields: &Fields) {
        for (key, value) in fields {
            let col = self.column(key);
            let record = &mut self.records[idx];
            if record.len() <= col {
                record.resize(col + 1, String::new());
            }
            record[col] = cell_value(value);
        }
    }
}

fn cell_value(value: &Value) -> String {
    cell_text(value).unwrap_or_default()
}

/// Pick the separator with the most hits on the header line.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

impl RoadmapStore for CsvWorkbook {
    fn read_collection(&mut self, collection: &str) -> Result<Vec<Row>, StoreError> {
        if let Some(rows) = self.cache.get(collection) {
            return Ok(rows.clone());
        }
        let sheet = self.load_sheet(collection)?;
        let rows: Vec<Row> = sheet
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| Row {
                handle: RowHandle::new(i as u64),
                fields: sheet
                    .headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), Value::String(v.clone())))
                    .collect(),
            })
            .collect();
        tracing::debug!(collection, rows = rows.len(), "loaded sheet");
        self.cache.insert(collection.to_string(), rows.clone());
        Ok(rows)
    }

    fn insert_row(&mut self, collection: &str, fields: Fields) -> Result<(), StoreError> {
        let mut sheet = self.load_sheet(collection)?;
        sheet.records.push(Vec::new());
        let idx = sheet.records.len() - 1;
        sheet.write_fields(idx, &fields);
        self.save_sheet(collection, &sheet)
    }

    fn update_row(
        &mut self,
        collection: &str,
        handle: RowHandle,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut sheet = self.load_sheet(collection)?;
        let idx = Self::position(&sheet, collection, handle)?;
        sheet.write_fields(idx, &fields);
        self.save_sheet(collection, &sheet)
    }

    fn delete_row(&mut self, collection: &str, handle: RowHandle) -> Result<(), StoreError> {
        let mut sheet = self.load_sheet(collection)?;
        let idx = Self::position(&sheet, collection, handle)?;
        sheet.records.remove(idx);
        self.save_sheet(collection, &sheet)
    }

    fn invalidate_cache(&mut self, collection: &str) {
        self.cache.remove(collection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fields;

    #[test]
    fn insert_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = CsvWorkbook::open(dir.path()).unwrap();
        book.insert_row(
            "Sprints",
            fields([
                ("Sprint", "S1".to_string()),
                ("Début", "2025-01-06".to_string()),
                ("Fin", "2025-01-20".to_string()),
            ]),
        )
        .unwrap();
        let rows = book.read_collection("Sprints").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("Sprint").as_deref(), Some("S1"));
        assert_eq!(rows[0].text("Fin").as_deref(), Some("2025-01-20"));
    }

    #[test]
    fn reads_are_cached_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = CsvWorkbook::open(dir.path()).unwrap();
        assert!(book.read_collection("Phases").unwrap().is_empty());

        book.insert_row("Phases", fields([("Phase", "Dev".to_string())]))
            .unwrap();
        assert!(book.read_collection("Phases").unwrap().is_empty());

        book.invalidate_cache("Phases");
        assert_eq!(book.read_collection("Phases").unwrap().len(), 1);
    }

    #[test]
    fn delete_reindexes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = CsvWorkbook::open(dir.path()).unwrap();
        for name in ["a", "b", "c"] {
            book.insert_row("PhasesLiens", fields([("Phase", name.to_string())]))
                .unwrap();
        }
        book.delete_row("PhasesLiens", RowHandle::new(1)).unwrap();
        book.invalidate_cache("PhasesLiens");
        let rows = book.read_collection("PhasesLiens").unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.text("Phase")).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(rows[1].handle, RowHandle::new(1));
    }

    #[test]
    fn reads_comma_separated_sheets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Sprints.csv"),
            "Sprint,Début,Fin\nS1,2025-01-06,2025-01-20\n",
        )
        .unwrap();
        let mut book = CsvWorkbook::open(dir.path()).unwrap();
        let rows = book.read_collection("Sprints").unwrap();
        assert_eq!(rows[0].text("Début").as_deref(), Some("2025-01-06"));
    }

    #[test]
    fn update_of_missing_row_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = CsvWorkbook::open(dir.path()).unwrap();
        let err = book
            .update_row("Phases", RowHandle::new(0), Fields::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }
}
