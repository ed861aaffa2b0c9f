pub mod normalizer;
pub mod ocr;
pub mod progress;
pub mod record_builder;

pub use normalizer::FieldNormalizer;
pub use ocr::{extract_with_timeout, ManifestExtractor, MrzExtractor};
pub use progress::{BatchId, ProgressHandle, ProgressRegistry};
pub use record_builder::RecordBuilder;
