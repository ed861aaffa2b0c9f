use serde::{Deserialize, Serialize};

use super::columns;

/// A single roster cell value.
///
/// `Value("")` means "not applicable / not yet known" while `NeedsReview`
/// means a human has to verify the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Value(String),
    NeedsReview,
}

impl Field {
    /// Text written to the table in place of a value that needs review.
    pub const SENTINEL: &'static str = "CHECK";

    pub fn value(value: impl Into<String>) -> Self {
        Field::Value(value.into())
    }

    pub fn empty() -> Self {
        Field::Value(String::new())
    }

    /// `None` becomes `NeedsReview`.
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(Field::NeedsReview, Field::Value)
    }

    pub fn from_cell(text: &str) -> Self {
        if text == Self::SENTINEL {
            Field::NeedsReview
        } else {
            Field::Value(text.to_string())
        }
    }

    pub fn as_cell(&self) -> &str {
        match self {
            Field::Value(value) => value,
            Field::NeedsReview => Self::SENTINEL,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Field::Value(value) => Some(value),
            Field::NeedsReview => None,
        }
    }

    pub fn is_needs_review(&self) -> bool {
        matches!(self, Field::NeedsReview)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Value(value) if value.is_empty())
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::empty()
    }
}

/// Output of the external OCR / structured-extraction service for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub mrz_line_1: String,
    pub mrz_line_2: String,
    #[serde(default)]
    pub mrz_line_1_confidence: f64,
    #[serde(default)]
    pub mrz_line_2_confidence: f64,
}

impl OcrOutput {
    /// Mean line confidence scaled to a 0-100 percentage.
    pub fn accuracy_percent(&self) -> f64 {
        (self.mrz_line_1_confidence + self.mrz_line_2_confidence) / 2.0 * 100.0
    }
}

/// Outcome of each TD3 check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckDigitValidity {
    pub document_number: bool,
    pub date_of_birth: bool,
    pub date_of_expiry: bool,
    pub optional_data: bool,
    pub composite: bool,
}

impl CheckDigitValidity {
    pub fn all_valid(&self) -> bool {
        self.document_number
            && self.date_of_birth
            && self.date_of_expiry
            && self.optional_data
            && self.composite
    }
}

/// Fields decoded from a TD3 MRZ pair. Dates stay in raw `YYMMDD` form and
/// codes are stripped of trailing fillers.
#[derive(Debug, Clone, PartialEq)]
pub struct MrzData {
    pub document_type: String,
    pub issuing_country: String,
    /// `None` when the extractor reported the surname as absent.
    pub surname: Option<String>,
    pub given_names: Option<String>,
    pub document_number: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub sex: String,
    pub date_of_expiry: String,
    pub optional_data: String,
    pub check_digits: CheckDigitValidity,
    pub raw_mrz_lines: [String; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub enum MrzCheck {
    /// One of the lines is not 44 characters long; nothing was parsed.
    StructurallyInvalid { line_lengths: (usize, usize) },
    Parsed(MrzData),
}

/// One roster row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassportRecord {
    pub role: Field,
    pub game: Field,
    pub purpose_of_visit: Field,
    pub given_name: Field,
    pub surname: Field,
    pub gender: Field,
    pub date_of_birth: Field,
    pub place_of_birth: Field,
    pub nationality: Field,
    pub arrival_date: Field,
    pub departure_date: Field,
    pub departure_city: Field,
    pub departure_airport: Field,
    pub duration_of_stay: Field,
    pub entry_type: Field,
    pub residence_address: Field,
    pub passport_number: Field,
    pub issuing_date: Field,
    pub expiry_date: Field,
    pub issuance_city: Field,
    pub passport_type: Field,
    pub phone_number: Field,
    pub email: Field,
    pub scan_accuracy: f64,
    pub file_name: Field,
    pub file_path: Field,
    pub mrz1: Field,
    pub mrz2: Field,
}

impl PassportRecord {
    pub fn field(&self, column: &str) -> Option<&Field> {
        let field = match column {
            columns::ROLE => &self.role,
            columns::GAME => &self.game,
            columns::PURPOSE_OF_VISIT => &self.purpose_of_visit,
            columns::GIVEN_NAME => &self.given_name,
            columns::LAST_NAME => &self.surname,
            columns::GENDER => &self.gender,
            columns::DATE_OF_BIRTH => &self.date_of_birth,
            columns::PLACE_OF_BIRTH => &self.place_of_birth,
            columns::NATIONALITY => &self.nationality,
            columns::ARRIVAL_DATE => &self.arrival_date,
            columns::DEPARTURE_DATE => &self.departure_date,
            columns::DEPARTURE_CITY => &self.departure_city,
            columns::DEPARTURE_AIRPORT => &self.departure_airport,
            columns::DURATION_OF_STAY => &self.duration_of_stay,
            columns::ENTRY_TYPE => &self.entry_type,
            columns::RESIDENCE_ADDRESS => &self.residence_address,
            columns::PASSPORT_NUMBER => &self.passport_number,
            columns::ISSUING_DATE => &self.issuing_date,
            columns::EXPIRY_DATE => &self.expiry_date,
            columns::ISSUANCE_CITY => &self.issuance_city,
            columns::PASSPORT_TYPE => &self.passport_type,
            columns::PHONE_NUMBER => &self.phone_number,
            columns::EMAIL => &self.email,
            columns::FILE_NAME => &self.file_name,
            columns::FILE_PATH => &self.file_path,
            columns::MRZ1 => &self.mrz1,
            columns::MRZ2 => &self.mrz2,
            _ => return None,
        };
        Some(field)
    }

    pub fn field_mut(&mut self, column: &str) -> Option<&mut Field> {
        let field = match column {
            columns::ROLE => &mut self.role,
            columns::GAME => &mut self.game,
            columns::PURPOSE_OF_VISIT => &mut self.purpose_of_visit,
            columns::GIVEN_NAME => &mut self.given_name,
            columns::LAST_NAME => &mut self.surname,
            columns::GENDER => &mut self.gender,
            columns::DATE_OF_BIRTH => &mut self.date_of_birth,
            columns::PLACE_OF_BIRTH => &mut self.place_of_birth,
            columns::NATIONALITY => &mut self.nationality,
            columns::ARRIVAL_DATE => &mut self.arrival_date,
            columns::DEPARTURE_DATE => &mut self.departure_date,
            columns::DEPARTURE_CITY => &mut self.departure_city,
            columns::DEPARTURE_AIRPORT => &mut self.departure_airport,
            columns::DURATION_OF_STAY => &mut self.duration_of_stay,
            columns::ENTRY_TYPE => &mut self.entry_type,
            columns::RESIDENCE_ADDRESS => &mut self.residence_address,
            columns::PASSPORT_NUMBER => &mut self.passport_number,
            columns::ISSUING_DATE => &mut self.issuing_date,
            columns::EXPIRY_DATE => &mut self.expiry_date,
            columns::ISSUANCE_CITY => &mut self.issuance_city,
            columns::PASSPORT_TYPE => &mut self.passport_type,
            columns::PHONE_NUMBER => &mut self.phone_number,
            columns::EMAIL => &mut self.email,
            columns::FILE_NAME => &mut self.file_name,
            columns::FILE_PATH => &mut self.file_path,
            columns::MRZ1 => &mut self.mrz1,
            columns::MRZ2 => &mut self.mrz2,
            _ => return None,
        };
        Some(field)
    }

    /// Text stored in the table for `column`, or `None` for an unknown column.
    pub fn cell_text(&self, column: &str) -> Option<String> {
        if column == columns::SCAN_ACCURACY {
            return Some(self.scan_accuracy.to_string());
        }
        self.field(column).map(|field| field.as_cell().to_string())
    }

    /// Rebuild a record from a table row, matching cells to fields by header name.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut record = PassportRecord::default();
        for (column, text) in cells {
            if column == columns::SCAN_ACCURACY {
                record.scan_accuracy = text.trim().parse().unwrap_or_else(|_| {
                    log::warn!("Unreadable scan accuracy '{}', using 0", text);
                    0.0
                });
            } else if let Some(field) = record.field_mut(column) {
                *field = Field::from_cell(text);
            }
        }
        record
    }

    /// Columns of this record currently holding `NeedsReview`.
    pub fn needs_review_columns(&self) -> Vec<&'static str> {
        columns::HEADER
            .iter()
            .copied()
            .filter(|column| self.field(column).is_some_and(Field::is_needs_review))
            .collect()
    }
}
