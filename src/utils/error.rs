use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PassportError>;

#[derive(Debug, Error)]
pub enum PassportError {
    #[error("MRZ extraction error: {0}")]
    MrzExtractionError(String),

    #[error("OCR timed out after {seconds}s for {}", path.display())]
    OcrTimeout { path: PathBuf, seconds: u64 },

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Table error: {0}")]
    TableError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The join column is missing, so the merge was refused before any write.
    #[error("Merge configuration error: column '{column}' not found in {table} table")]
    MergeConfig { column: String, table: &'static str },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
