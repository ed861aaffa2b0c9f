use std::path::Path;

use crate::models::columns::DEFAULT_PASSPORT_TYPE;
use crate::models::{Field, MrzCheck, MrzData, OcrOutput, PassportRecord};
use crate::processing::FieldNormalizer;
use crate::validation::MrzValidator;

/// Turns one OCR result into a roster row. Always produces a record: when the
/// MRZ cannot be trusted the affected fields are marked for review instead.
pub struct RecordBuilder;

impl RecordBuilder {
    pub fn build(file_path: &Path, ocr: &OcrOutput) -> PassportRecord {
        let mut record = Self::provenance(file_path, ocr.accuracy_percent());
        record.mrz1 = Field::value(ocr.mrz_line_1.as_str());
        record.mrz2 = Field::value(ocr.mrz_line_2.as_str());

        match MrzValidator::validate(&ocr.mrz_line_1, &ocr.mrz_line_2) {
            MrzCheck::StructurallyInvalid { line_lengths } => {
                log::warn!(
                    "{}: MRZ lines are {}/{} characters, marking identity fields for review",
                    file_path.display(),
                    line_lengths.0,
                    line_lengths.1
                );
                Self::mark_identity_for_review(&mut record);
            }
            MrzCheck::Parsed(mrz) => {
                if !mrz.check_digits.all_valid() {
                    log::warn!(
                        "{}: MRZ check digits failed ({:?}), keeping extracted values",
                        file_path.display(),
                        mrz.check_digits
                    );
                }
                Self::fill_identity(&mut record, &mrz);
            }
        }

        record
    }

    /// Record for an image whose extraction failed outright (error or timeout).
    pub fn degraded(file_path: &Path, reason: &str) -> PassportRecord {
        log::warn!("{}: extraction failed ({}), emitting review row", file_path.display(), reason);
        let mut record = Self::provenance(file_path, 0.0);
        Self::mark_identity_for_review(&mut record);
        record
    }

    fn provenance(file_path: &Path, scan_accuracy: f64) -> PassportRecord {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        PassportRecord {
            passport_type: Field::value(DEFAULT_PASSPORT_TYPE),
            scan_accuracy,
            file_name: Field::Value(file_name),
            file_path: Field::value(file_path.to_string_lossy()),
            ..PassportRecord::default()
        }
    }

    fn mark_identity_for_review(record: &mut PassportRecord) {
        record.given_name = Field::NeedsReview;
        record.surname = Field::NeedsReview;
        record.gender = Field::NeedsReview;
        record.date_of_birth = Field::NeedsReview;
        record.place_of_birth = Field::NeedsReview;
        record.nationality = Field::NeedsReview;
        record.passport_number = Field::NeedsReview;
        record.expiry_date = Field::NeedsReview;
    }

    // Check-digit failures do not blank values; only unparseable dates do.
    fn fill_identity(record: &mut PassportRecord, mrz: &MrzData) {
        record.given_name = Field::from_option(mrz.given_names.clone());
        record.surname = Field::from_option(mrz.surname.clone());
        record.gender = Field::value(mrz.sex.as_str());
        record.date_of_birth = Field::from_option(FieldNormalizer::normalize_date(&mrz.date_of_birth));
        record.place_of_birth = Field::Value(FieldNormalizer::resolve_country(&mrz.issuing_country));
        record.nationality = Field::Value(FieldNormalizer::resolve_country(&mrz.nationality));
        record.passport_number = Field::value(mrz.document_number.as_str());
        record.expiry_date = Field::from_option(FieldNormalizer::normalize_date(&mrz.date_of_expiry));
    }
}
