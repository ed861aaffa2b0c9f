use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::OcrOutput;
use crate::utils::{PassportError, Result};

/// External MRZ extraction capability: one call per image.
pub trait MrzExtractor: Send + Sync {
    fn extract(&self, image_path: &Path) -> Result<OcrOutput>;
}

/// Extractor backed by a JSON manifest of results already fetched from the
/// extraction service, keyed by image file name.
///
/// ```json
/// { "erika_passport.jpg": { "mrz_line_1": "P<UTO...", "mrz_line_2": "L89...",
///   "mrz_line_1_confidence": 0.99, "mrz_line_2_confidence": 0.98 } }
/// ```
#[derive(Debug, Default)]
pub struct ManifestExtractor {
    entries: HashMap<String, OcrOutput>,
}

impl ManifestExtractor {
    pub fn new(entries: HashMap<String, OcrOutput>) -> Self {
        ManifestExtractor { entries }
    }

    pub fn from_file<P: AsRef<Path>>(manifest_path: P) -> Result<Self> {
        let manifest_path = manifest_path.as_ref();
        let content = std::fs::read_to_string(manifest_path).map_err(|e| {
            PassportError::IoError(format!(
                "Failed to read OCR manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, OcrOutput> = serde_json::from_str(content).map_err(|e| {
            PassportError::SerializationError(format!("Invalid OCR manifest: {}", e))
        })?;
        log::info!("Loaded OCR manifest with {} entries", entries.len());
        Ok(Self::new(entries))
    }
}

impl MrzExtractor for ManifestExtractor {
    fn extract(&self, image_path: &Path) -> Result<OcrOutput> {
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PassportError::MrzExtractionError(format!(
                    "No file name in {}",
                    image_path.display()
                ))
            })?;

        self.entries.get(&file_name).cloned().ok_or_else(|| {
            PassportError::MrzExtractionError(format!("No OCR result for {}", file_name))
        })
    }
}

/// Run one extraction on a worker thread and give up after `timeout`.
///
/// A worker that overruns is left detached; its result is discarded.
pub fn extract_with_timeout(
    extractor: Arc<dyn MrzExtractor>,
    image_path: &Path,
    timeout: Duration,
) -> Result<OcrOutput> {
    let (sender, receiver) = mpsc::channel();
    let worker_path: PathBuf = image_path.to_path_buf();

    thread::Builder::new()
        .name("mrz-extract".to_string())
        .spawn(move || {
            let result = extractor.extract(&worker_path);
            // The receiver is gone if the caller already timed out.
            let _ = sender.send(result);
        })
        .map_err(|e| {
            PassportError::MrzExtractionError(format!("Failed to spawn extraction worker: {}", e))
        })?;

    match receiver.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(PassportError::OcrTimeout {
            path: image_path.to_path_buf(),
            seconds: timeout.as_secs(),
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(PassportError::MrzExtractionError(
            format!("Extraction worker for {} exited without a result", image_path.display()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowExtractor(Duration);

    impl MrzExtractor for SlowExtractor {
        fn extract(&self, _image_path: &Path) -> Result<OcrOutput> {
            thread::sleep(self.0);
            Ok(OcrOutput {
                mrz_line_1: String::new(),
                mrz_line_2: String::new(),
                mrz_line_1_confidence: 1.0,
                mrz_line_2_confidence: 1.0,
            })
        }
    }

    const MANIFEST: &str = r#"{
        "a_passport.jpg": {
            "mrz_line_1": "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<",
            "mrz_line_2": "L898902C36UTO7408122F1204159ZE184226B<<<<<10",
            "mrz_line_1_confidence": 0.9,
            "mrz_line_2_confidence": 0.8
        }
    }"#;

    #[test]
    fn manifest_lookup_is_by_file_name() {
        let extractor = ManifestExtractor::from_json(MANIFEST).unwrap();

        let output = extractor.extract(Path::new("/tmp/batch/a_passport.jpg")).unwrap();
        assert_eq!(output.mrz_line_1.len(), 44);
        assert!((output.mrz_line_2_confidence - 0.8).abs() < 1e-9);

        let missing = extractor.extract(Path::new("b_passport.jpg"));
        assert!(matches!(missing, Err(PassportError::MrzExtractionError(_))));
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        let result = ManifestExtractor::from_json("[1, 2, 3]");
        assert!(matches!(result, Err(PassportError::SerializationError(_))));
    }

    #[test]
    fn fast_extraction_returns_within_timeout() {
        let extractor: Arc<dyn MrzExtractor> = Arc::new(SlowExtractor(Duration::ZERO));
        let result = extract_with_timeout(extractor, Path::new("x.png"), Duration::from_secs(5));
        assert!(result.is_ok());
    }

    #[test]
    fn stalled_extraction_times_out() {
        let extractor: Arc<dyn MrzExtractor> = Arc::new(SlowExtractor(Duration::from_secs(2)));
        let result =
            extract_with_timeout(extractor, Path::new("x.png"), Duration::from_millis(50));
        assert!(matches!(result, Err(PassportError::OcrTimeout { .. })));
    }
}
