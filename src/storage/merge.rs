use std::collections::HashMap;

use crate::utils::{PassportError, Result};

use super::Table;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Target rows that found a source row with the same key.
    pub matched_rows: usize,
    /// Target rows with a non-empty key and no source match.
    pub unmatched_rows: usize,
    /// Requested columns absent from either table.
    pub skipped_columns: Vec<String>,
}

/// Copy `copy_columns` from `source` into every `target` row whose
/// `join_column` value equals a source row's value exactly.
///
/// When several source rows share a key the first one wins. A missing join
/// column in either table aborts before anything is written.
pub fn merge_columns(
    source: &Table,
    target: &mut Table,
    join_column: &str,
    copy_columns: &[&str],
) -> Result<MergeSummary> {
    if !source.has_column(join_column) {
        return Err(PassportError::MergeConfig {
            column: join_column.to_string(),
            table: "source",
        });
    }
    if !target.has_column(join_column) {
        return Err(PassportError::MergeConfig {
            column: join_column.to_string(),
            table: "target",
        });
    }

    let mut summary = MergeSummary::default();
    let mut columns = Vec::with_capacity(copy_columns.len());
    for column in copy_columns {
        if source.has_column(column) && target.has_column(column) {
            columns.push(*column);
        } else {
            log::warn!("Column '{}' not found in one of the tables, skipping", column);
            summary.skipped_columns.push(column.to_string());
        }
    }

    let mut first_match: HashMap<&str, usize> = HashMap::new();
    for row in 0..source.len() {
        match source.cell(row, join_column) {
            Some(key) if !key.is_empty() => {
                first_match.entry(key).or_insert(row);
            }
            _ => {}
        }
    }

    for row in 0..target.len() {
        let key = match target.cell(row, join_column) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => continue,
        };
        let Some(&source_row) = first_match.get(key.as_str()) else {
            log::debug!("No source row for {} '{}'", join_column, key);
            summary.unmatched_rows += 1;
            continue;
        };

        for column in &columns {
            let value = source.cell(source_row, column).unwrap_or_default();
            target.set_cell(row, column, value);
        }
        summary.matched_rows += 1;
    }

    log::info!(
        "Merged {} columns by '{}' from {} into {}: {} matched, {} unmatched",
        columns.len(),
        join_column,
        source.path().display(),
        target.path().display(),
        summary.matched_rows,
        summary.unmatched_rows
    );
    Ok(summary)
}
