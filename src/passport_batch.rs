use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::PipelineConfig;
use crate::models::PassportRecord;
use crate::processing::*;
use crate::storage::{merge_columns, MergeSummary, Table};
use crate::utils::{PassportError, Result};
use crate::validation::{HealthReport, RowHealthScanner};

#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: BatchId,
    /// Rows appended by this batch, in order.
    pub rows: Vec<usize>,
    /// How many of those rows came from a failed or timed-out extraction.
    pub degraded: usize,
    pub health: HealthReport,
    pub merge: Option<MergeSummary>,
}

/// Runs a directory of passport scans into the roster.
pub struct PassportBatch {
    config: PipelineConfig,
    extractor: Arc<dyn MrzExtractor>,
    progress: ProgressRegistry,
}

impl PassportBatch {
    pub fn new(config: PipelineConfig, extractor: Arc<dyn MrzExtractor>) -> Self {
        PassportBatch {
            config,
            extractor,
            progress: ProgressRegistry::new(),
        }
    }

    /// Share an existing registry, e.g. one polled by a progress endpoint.
    pub fn with_progress(mut self, progress: ProgressRegistry) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> &ProgressRegistry {
        &self.progress
    }

    /// Passport scans in `image_dir`, sorted by file name.
    pub fn collect_images(&self, image_dir: &Path) -> Result<Vec<PathBuf>> {
        let name_filter = self.config.file_name_regex()?;
        let entries = fs::read_dir(image_dir).map_err(|e| {
            PassportError::IoError(format!("Failed to read {}: {}", image_dir.display(), e))
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| PassportError::IoError(format!("Failed to list directory: {}", e)))?
                .path();
            if !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !name_filter.is_match(&name) {
                continue;
            }
            if !self.config.extension_allowed(&path) {
                log::info!("Skipping file: {}. File type not allowed.", path.display());
                continue;
            }
            images.push(path);
        }

        images.sort();
        Ok(images)
    }

    /// Extract and build one record. Never fails: extraction errors and
    /// timeouts yield a degraded record.
    pub fn process_file(&self, image_path: &Path) -> (PassportRecord, bool) {
        match extract_with_timeout(
            Arc::clone(&self.extractor),
            image_path,
            self.config.ocr_timeout(),
        ) {
            Ok(ocr) => (RecordBuilder::build(image_path, &ocr), false),
            Err(err) => (RecordBuilder::degraded(image_path, &err.to_string()), true),
        }
    }

    /// Process every scan in `image_dir` into `table`, then scan row health and
    /// merge curated columns from `source` when given.
    ///
    /// The table is saved after the appends and again after a successful
    /// merge; a merge configuration error leaves the appended rows on disk.
    pub fn run(
        &self,
        image_dir: &Path,
        table: &mut Table,
        source: Option<&Table>,
        today: NaiveDate,
    ) -> Result<BatchReport> {
        let handle = self.progress.start();
        let images = self.collect_images(image_dir)?;
        log::info!(
            "Batch {}: {} passport files in {}",
            handle.id(),
            images.len(),
            image_dir.display()
        );

        let mut rows = Vec::with_capacity(images.len());
        let mut degraded = 0;
        for (index, image_path) in images.iter().enumerate() {
            let (record, failed) = self.process_file(image_path);
            if failed {
                degraded += 1;
            }
            rows.push(table.append_record(&record));
            handle.update(index + 1, images.len());
            log::debug!("Batch {}: processed {}", handle.id(), image_path.display());
        }
        handle.update(images.len(), images.len());
        table.save()?;

        let health = RowHealthScanner::new(self.config.expiry_horizon_days).scan(table, today);
        health.write_json(flags_path(table.path()))?;

        let merge = match source {
            Some(source) => {
                let summary = merge_columns(
                    source,
                    table,
                    &self.config.join_column,
                    &self.config.copy_column_refs(),
                )?;
                table.save()?;
                Some(summary)
            }
            None => None,
        };

        log::info!(
            "Batch {} complete: {} rows appended ({} degraded), roster saved to {}",
            handle.id(),
            rows.len(),
            degraded,
            table.path().display()
        );

        Ok(BatchReport {
            batch_id: handle.id(),
            rows,
            degraded,
            health,
            merge,
        })
    }
}

/// Sidecar file holding the highlight flags for `table_path`.
pub fn flags_path(table_path: &Path) -> PathBuf {
    let mut name = table_path.as_os_str().to_os_string();
    name.push(".flags.json");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn only_passport_images_are_collected() {
        let dir = tempdir().unwrap();
        for name in ["b_passport.png", "a_Passport.JPG", "passport.xlsx", "visa.jpg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("passport_dir.jpg")).unwrap();

        let batch = PassportBatch::new(
            PipelineConfig::default(),
            Arc::new(ManifestExtractor::new(HashMap::new())),
        );
        let names: Vec<String> = batch
            .collect_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a_Passport.JPG", "b_passport.png"]);
    }

    #[test]
    fn missing_ocr_result_degrades_the_record() {
        let batch = PassportBatch::new(
            PipelineConfig::default(),
            Arc::new(ManifestExtractor::new(HashMap::new())),
        );
        let (record, failed) = batch.process_file(Path::new("ghost_passport.jpg"));

        assert!(failed);
        assert!(record.passport_number.is_needs_review());
    }

    #[test]
    fn flags_path_is_a_sidecar() {
        assert_eq!(
            flags_path(Path::new("out/roster.csv")),
            PathBuf::from("out/roster.csv.flags.json")
        );
    }
}
