//! Post-population roster scan.
//!
//! Produces highlight metadata for the rendering layer; table values are
//! never modified here.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{columns, Field};
use crate::storage::Table;
use crate::utils::{PassportError, Result};
use crate::validation::expiry::{ExpiryValidator, DEFAULT_HORIZON_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    NeedsReview,
    ExpiringSoon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellFlag {
    /// Data row index, header excluded.
    pub row: usize,
    pub column: String,
    pub kind: FlagKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    pub checked_on: String,
    pub horizon_days: u32,
    pub flags: Vec<CellFlag>,
}

impl HealthReport {
    pub fn row_flags(&self, row: usize) -> impl Iterator<Item = &CellFlag> {
        self.flags.iter().filter(move |flag| flag.row == row)
    }

    /// Distinct flag kinds raised for `row`.
    pub fn row_kinds(&self, row: usize) -> BTreeSet<FlagKind> {
        self.row_flags(row).map(|flag| flag.kind).collect()
    }

    pub fn is_flagged(&self, row: usize, kind: FlagKind) -> bool {
        self.row_flags(row).any(|flag| flag.kind == kind)
    }

    pub fn flagged_rows(&self, kind: FlagKind) -> BTreeSet<usize> {
        self.flags
            .iter()
            .filter(|flag| flag.kind == kind)
            .map(|flag| flag.row)
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PassportError::SerializationError(format!("Failed to encode flags: {}", e)))
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| {
            PassportError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

pub struct RowHealthScanner {
    horizon_days: u32,
}

impl Default for RowHealthScanner {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_DAYS)
    }
}

impl RowHealthScanner {
    pub fn new(horizon_days: u32) -> Self {
        RowHealthScanner { horizon_days }
    }

    /// Scan every data row for review sentinels and near-term expiry.
    pub fn scan(&self, table: &Table, today: NaiveDate) -> HealthReport {
        let mut report = HealthReport {
            checked_on: today.format("%d-%m-%Y").to_string(),
            horizon_days: self.horizon_days,
            flags: Vec::new(),
        };

        self.scan_sentinels(table, &mut report);
        self.scan_expiry(table, today, &mut report);

        log::info!(
            "Health scan of {} rows: {} need review, {} expiring within {} days",
            table.len(),
            report.flagged_rows(FlagKind::NeedsReview).len(),
            report.flagged_rows(FlagKind::ExpiringSoon).len(),
            self.horizon_days
        );
        report
    }

    fn scan_sentinels(&self, table: &Table, report: &mut HealthReport) {
        for row in 0..table.len() {
            for column in table.header() {
                let text = table.cell(row, column).unwrap_or_default();
                if contains_sentinel(text) {
                    report.flags.push(CellFlag {
                        row,
                        column: column.clone(),
                        kind: FlagKind::NeedsReview,
                    });
                }
            }
        }
    }

    fn scan_expiry(&self, table: &Table, today: NaiveDate, report: &mut HealthReport) {
        if !table.has_column(columns::EXPIRY_DATE) {
            log::warn!(
                "{} has no '{}' column, skipping expiry scan",
                table.path().display(),
                columns::EXPIRY_DATE
            );
            return;
        }

        for row in 0..table.len() {
            let text = table.cell(row, columns::EXPIRY_DATE).unwrap_or_default();
            if contains_sentinel(text) {
                continue;
            }
            if text.trim().is_empty() {
                log::debug!("Row {} has no expiry date", row);
                continue;
            }

            match ExpiryValidator::parse_date(text) {
                Some(expiry) => {
                    if ExpiryValidator::expires_within(expiry, today, self.horizon_days) {
                        report.flags.push(CellFlag {
                            row,
                            column: columns::EXPIRY_DATE.to_string(),
                            kind: FlagKind::ExpiringSoon,
                        });
                    }
                }
                None => {
                    log::warn!("Error parsing Passport Expiry Date: '{}' in row {}", text, row);
                }
            }
        }
    }
}

fn contains_sentinel(text: &str) -> bool {
    text.to_uppercase().contains(Field::SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::standard_header;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn roster(expiry_dates: &[&str]) -> Table {
        let mut table = Table::new("mem.csv", standard_header());
        for expiry in expiry_dates {
            let mut cells = vec![String::new(); columns::HEADER.len()];
            let col = table.column_index(columns::EXPIRY_DATE).unwrap();
            cells[col] = expiry.to_string();
            table.append_row(cells);
        }
        table
    }

    fn in_days(days: u64) -> String {
        (today() + Days::new(days)).format("%d-%m-%Y").to_string()
    }

    #[test]
    fn expiry_flag_boundary() {
        let table = roster(&[&in_days(180), &in_days(181), &in_days(0)]);
        let report = RowHealthScanner::default().scan(&table, today());

        assert!(report.is_flagged(0, FlagKind::ExpiringSoon));
        assert!(!report.is_flagged(1, FlagKind::ExpiringSoon));
        assert!(report.is_flagged(2, FlagKind::ExpiringSoon));
    }

    #[test]
    fn sentinel_cells_need_review_case_insensitively() {
        let mut table = roster(&["CHECK", "", "01-01-2040"]);
        table.set_cell(1, columns::LAST_NAME, "check");
        table.set_cell(2, columns::EMAIL, "recheck later");

        let report = RowHealthScanner::default().scan(&table, today());

        assert_eq!(
            report.row_kinds(0).into_iter().collect::<Vec<_>>(),
            vec![FlagKind::NeedsReview]
        );
        assert!(report.is_flagged(1, FlagKind::NeedsReview));
        assert!(report.is_flagged(2, FlagKind::NeedsReview));
        assert!(!report.is_flagged(2, FlagKind::ExpiringSoon));
        assert_eq!(report.flagged_rows(FlagKind::NeedsReview).len(), 3);
    }

    #[test]
    fn unparseable_expiry_is_left_unflagged() {
        let table = roster(&["2025-03-02", "soon"]);
        let report = RowHealthScanner::default().scan(&table, today());
        assert!(report.flags.is_empty());
    }

    #[test]
    fn header_is_never_scanned() {
        let table = Table::new("mem.csv", vec!["CHECK".to_string()]);
        let report = RowHealthScanner::default().scan(&table, today());
        assert!(report.flags.is_empty());
    }

    #[test]
    fn custom_horizon_is_respected() {
        let table = roster(&[&in_days(31)]);
        assert!(!RowHealthScanner::new(30).scan(&table, today()).is_flagged(0, FlagKind::ExpiringSoon));
        assert!(RowHealthScanner::new(31).scan(&table, today()).is_flagged(0, FlagKind::ExpiringSoon));
    }

    #[test]
    fn report_serializes_flag_kinds_in_snake_case() {
        let table = roster(&["CHECK"]);
        let json = RowHealthScanner::default().scan(&table, today()).to_json().unwrap();
        assert!(json.contains("\"needs_review\""));
        assert!(json.contains("\"checked_on\": \"01-03-2025\""));
    }
}
