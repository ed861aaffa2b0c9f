use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::models::{columns, PassportRecord};
use crate::utils::{PassportError, Result};

/// File-backed roster table: one header row followed by data rows.
///
/// Columns are always addressed by header name. The name index is built when
/// the table is loaded and rebuilt whenever the header is replaced.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl Table {
    /// In-memory table that is only written on [`Table::save`].
    pub fn new<P: AsRef<Path>>(path: P, header: Vec<String>) -> Self {
        let mut table = Table {
            path: path.as_ref().to_path_buf(),
            header,
            rows: Vec::new(),
            index: HashMap::new(),
        };
        table.rebuild_index();
        table
    }

    /// Reopen the roster at `path`, or create it with the standard header.
    ///
    /// Calling this repeatedly on the same path never writes a second header
    /// and never drops existing rows.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let table = Self::open(path)?;
            if !table.header.is_empty() {
                log::info!("Reopened roster {} with {} rows", path.display(), table.len());
                let missing = table.missing_columns();
                if !missing.is_empty() {
                    log::warn!(
                        "{} lacks roster columns {:?}, their values will be dropped",
                        path.display(),
                        missing
                    );
                }
                return Ok(table);
            }
            log::warn!("Roster {} exists but is empty, writing header", path.display());
        } else {
            log::info!("Creating roster {}", path.display());
        }

        let table = Self::new(path, standard_header());
        table.save()?;
        Ok(table)
    }

    /// Load an existing table file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                PassportError::TableError(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                PassportError::TableError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            records.push(record.iter().map(str::to_string).collect::<Vec<String>>());
        }

        let mut records = records.into_iter();
        let header = records.next().unwrap_or_default();
        let mut table = Self::new(path, header);
        table.rows = records.collect();
        log::debug!(
            "Loaded {} ({} columns, {} rows)",
            path.display(),
            table.header.len(),
            table.rows.len()
        );
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cell text at `row` (0-based, header excluded). Missing trailing cells
    /// read as empty.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        let cells = self.rows.get(row)?;
        Some(cells.get(col).map_or("", String::as_str))
    }

    /// Overwrite one cell. Returns `false` when the row or column does not exist.
    pub fn set_cell(&mut self, row: usize, column: &str, value: &str) -> bool {
        let Some(col) = self.column_index(column) else {
            return false;
        };
        let Some(cells) = self.rows.get_mut(row) else {
            return false;
        };
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        true
    }

    /// Roster columns absent from this table's header.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        columns::HEADER
            .iter()
            .copied()
            .filter(|column| !self.has_column(column))
            .collect()
    }

    /// Append raw cells as the next row. Returns the new row's index.
    pub fn append_row(&mut self, cells: Vec<String>) -> usize {
        self.rows.push(cells);
        self.rows.len() - 1
    }

    /// Append a record at the next free row, placing each value by column name.
    /// Returns the new row's index.
    pub fn append_record(&mut self, record: &PassportRecord) -> usize {
        let row = self
            .header
            .iter()
            .map(|column| record.cell_text(column).unwrap_or_default())
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// All rows read back as records.
    pub fn records(&self) -> Vec<PassportRecord> {
        self.rows
            .iter()
            .map(|row| {
                PassportRecord::from_cells(
                    self.header
                        .iter()
                        .zip(row.iter())
                        .map(|(column, text)| (column.as_str(), text.as_str())),
                )
            })
            .collect()
    }

    /// Write the table atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            PassportError::IoError(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| {
            PassportError::IoError(format!("Failed to create temporary file: {}", e))
        })?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(&mut temp_file);
            writer
                .write_record(&self.header)
                .map_err(|e| PassportError::TableError(format!("Failed to write header: {}", e)))?;
            for row in &self.rows {
                writer
                    .write_record(row)
                    .map_err(|e| PassportError::TableError(format!("Failed to write row: {}", e)))?;
            }
            writer
                .flush()
                .map_err(|e| PassportError::IoError(format!("Failed to flush table: {}", e)))?;
        }

        temp_file.persist(&self.path).map_err(|e| {
            PassportError::IoError(format!("Failed to save {}: {}", self.path.display(), e))
        })?;
        log::debug!("Saved {} ({} rows)", self.path.display(), self.rows.len());
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, name) in self.header.iter().enumerate() {
            // First occurrence wins for duplicated header names.
            self.index.entry(name.clone()).or_insert(position);
        }
    }
}

pub fn standard_header() -> Vec<String> {
    columns::HEADER.iter().map(|column| column.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use tempfile::tempdir;

    fn sample_record(number: &str) -> PassportRecord {
        PassportRecord {
            surname: Field::value("ERIKSSON"),
            given_name: Field::NeedsReview,
            passport_number: Field::value(number),
            scan_accuracy: 91.25,
            ..PassportRecord::default()
        }
    }

    #[test]
    fn open_or_create_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster.csv");

        let mut table = Table::open_or_create(&path).unwrap();
        table.append_record(&sample_record("L898902C3"));
        table.save().unwrap();

        let reopened = Table::open_or_create(&path).unwrap();
        assert_eq!(reopened.header(), standard_header().as_slice());
        assert_eq!(reopened.len(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Passport Number").count(), 1);
    }

    #[test]
    fn empty_file_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(&path, "").unwrap();

        let table = Table::open_or_create(&path).unwrap();
        assert_eq!(table.header().len(), 28);
        assert_eq!(Table::open(&path).unwrap().header().len(), 28);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = Table::open(dir.path().join("nope.csv"));
        assert!(matches!(result, Err(PassportError::TableError(_))));
    }

    #[test]
    fn records_survive_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("roster.csv");

        let mut table = Table::open_or_create(&path).unwrap();
        let first = table.append_record(&sample_record("A1"));
        let second = table.append_record(&sample_record("B2"));
        assert_eq!((first, second), (0, 1));
        table.save().unwrap();

        let records = Table::open(&path).unwrap().records();
        assert_eq!(records, vec![sample_record("A1"), sample_record("B2")]);
    }

    #[test]
    fn append_places_values_by_column_name() {
        let dir = tempdir().unwrap();
        let mut header = standard_header();
        header.reverse();
        let mut table = Table::new(dir.path().join("reversed.csv"), header);

        table.append_record(&sample_record("X9"));

        assert_eq!(table.cell(0, columns::PASSPORT_NUMBER), Some("X9"));
        assert_eq!(table.cell(0, columns::GIVEN_NAME), Some("CHECK"));
        assert_eq!(table.cell(0, columns::SCAN_ACCURACY), Some("91.25"));
        assert_eq!(table.rows()[0].last().map(String::as_str), Some(""));
    }

    #[test]
    fn reopened_legacy_roster_reports_missing_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(&path, "Passport Number,Last Name\nA1,ERIKSSON\n").unwrap();

        let mut table = Table::open_or_create(&path).unwrap();
        let missing = table.missing_columns();
        assert_eq!(missing.len(), columns::HEADER.len() - 2);
        assert!(missing.contains(&columns::EMAIL));
        assert!(!missing.contains(&columns::PASSPORT_NUMBER));

        table.append_record(&sample_record("B2"));
        table.append_record(&sample_record("C3"));
        assert_eq!(table.rows()[2], vec!["C3".to_string(), "ERIKSSON".to_string()]);
        assert!(Table::new(&path, standard_header()).missing_columns().is_empty());
    }

    #[test]
    fn set_cell_pads_short_rows() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("s.csv"), "Passport Number,Email\nA1\n").unwrap();
        let mut table = Table::open(dir.path().join("s.csv")).unwrap();

        assert_eq!(table.cell(0, "Email"), Some(""));
        assert!(table.set_cell(0, "Email", "a@example.com"));
        assert_eq!(table.cell(0, "Email"), Some("a@example.com"));
        assert!(!table.set_cell(0, "Phone Number", "1"));
        assert!(!table.set_cell(5, "Email", "x"));
    }
}
