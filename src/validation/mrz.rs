use std::ops::Range;

use crate::models::{CheckDigitValidity, MrzCheck, MrzData};

/// Characters per line of a TD3 (passport) MRZ.
pub const TD3_LINE_LENGTH: usize = 44;

const CHECK_WEIGHTS: [u32; 3] = [7, 3, 1];

// Stringified absence produced by the extraction layer.
const ABSENT_TOKEN: &str = "None";

/// ICAO Doc 9303 TD3 check-digit validator.
pub struct MrzValidator;

impl MrzValidator {
    /// Parse and check a TD3 MRZ pair.
    ///
    /// Individual check-digit failures never abort parsing; they are reported
    /// through [`CheckDigitValidity`] so the caller can fall back per field.
    pub fn validate(line1: &str, line2: &str) -> MrzCheck {
        let line_lengths = (line1.chars().count(), line2.chars().count());
        if line_lengths.0 != TD3_LINE_LENGTH || line_lengths.1 != TD3_LINE_LENGTH {
            log::warn!(
                "MRZ is not TD3 shaped: line lengths {} and {} (expected {})",
                line_lengths.0,
                line_lengths.1,
                TD3_LINE_LENGTH
            );
            return MrzCheck::StructurallyInvalid { line_lengths };
        }

        let line1: Vec<char> = line1.chars().collect();
        let line2: Vec<char> = line2.chars().collect();
        let span = |line: &[char], range: Range<usize>| line[range].iter().collect::<String>();

        // Line 1: document type, issuing state, primary<<secondary identifier
        let document_type = strip_filler(&span(&line1, 0..2));
        let issuing_country = strip_filler(&span(&line1, 2..5));
        let (surname, given_names) = Self::split_names(&span(&line1, 5..44));

        // Line 2: number, nationality, birth, sex, expiry, optional data
        let number_field = span(&line2, 0..9);
        let birth_field = span(&line2, 13..19);
        let expiry_field = span(&line2, 21..27);
        let optional_field = span(&line2, 28..42);
        let composite_field = format!(
            "{}{}{}",
            span(&line2, 0..10),
            span(&line2, 13..20),
            span(&line2, 21..43)
        );

        let check_digits = CheckDigitValidity {
            document_number: Self::verify(&number_field, line2[9]),
            date_of_birth: Self::verify(&birth_field, line2[19]),
            date_of_expiry: Self::verify(&expiry_field, line2[27]),
            optional_data: Self::verify(&optional_field, line2[42]),
            composite: Self::verify(&composite_field, line2[43]),
        };
        if !check_digits.all_valid() {
            log::warn!("MRZ check digit mismatch: {:?}", check_digits);
        }

        let sex = match line2[20] {
            '<' => "X".to_string(),
            other => other.to_string(),
        };

        MrzCheck::Parsed(MrzData {
            document_type,
            issuing_country,
            surname,
            given_names,
            document_number: strip_filler(&number_field),
            nationality: strip_filler(&span(&line2, 10..13)),
            date_of_birth: birth_field,
            sex,
            date_of_expiry: expiry_field,
            optional_data: strip_filler(&optional_field),
            check_digits,
            raw_mrz_lines: [line1.iter().collect(), line2.iter().collect()],
        })
    }

    /// Weighted modulo-10 check digit over `data` (weights 7-3-1).
    ///
    /// Returns `None` if `data` holds a character outside `0-9`, `A-Z` and `<`.
    pub fn check_digit(data: &str) -> Option<u32> {
        let mut sum = 0;
        for (index, c) in data.chars().enumerate() {
            sum += Self::char_value(c)? * CHECK_WEIGHTS[index % CHECK_WEIGHTS.len()];
        }
        Some(sum % 10)
    }

    fn char_value(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
            '<' => Some(0),
            _ => None,
        }
    }

    fn verify(data: &str, check: char) -> bool {
        match Self::check_digit(data) {
            Some(expected) => Self::char_value(check) == Some(expected),
            None => false,
        }
    }

    fn split_names(names: &str) -> (Option<String>, Option<String>) {
        let (primary, secondary) = names.split_once("<<").unwrap_or((names, ""));
        (name_or_absent(primary), name_or_absent(secondary))
    }
}

fn strip_filler(value: &str) -> String {
    value.trim_matches('<').to_string()
}

// An empty name stays `Some("")`; only the absent token maps to `None`.
fn name_or_absent(raw: &str) -> Option<String> {
    let name = raw.trim_matches('<').replace('<', " ");
    let name = name.trim();
    if name == ABSENT_TOKEN {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // ICAO Doc 9303 part 4 specimen.
    const SPECIMEN_1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const SPECIMEN_2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    fn parsed(line1: &str, line2: &str) -> MrzData {
        match MrzValidator::validate(line1, line2) {
            MrzCheck::Parsed(data) => data,
            other => panic!("expected parsed MRZ, got {other:?}"),
        }
    }

    #[rstest]
    #[case("L898902C3", 6)]
    #[case("740812", 2)]
    #[case("120415", 9)]
    #[case("ZE184226B<<<<<", 1)]
    #[case("L898902C3674081221204159ZE184226B<<<<<1", 0)]
    #[case("<<<<<<<<<<<<<<", 0)]
    fn check_digit_matches_icao_examples(#[case] data: &str, #[case] expected: u32) {
        assert_eq!(MrzValidator::check_digit(data), Some(expected));
    }

    #[test]
    fn check_digit_rejects_foreign_characters() {
        assert_eq!(MrzValidator::check_digit("L8989-2C3"), None);
        assert_eq!(MrzValidator::check_digit("l898902c3"), None);
    }

    #[test]
    fn specimen_parses_with_all_checks_valid() {
        let data = parsed(SPECIMEN_1, SPECIMEN_2);

        assert!(data.check_digits.all_valid());
        assert_eq!(data.document_type, "P");
        assert_eq!(data.issuing_country, "UTO");
        assert_eq!(data.surname.as_deref(), Some("ERIKSSON"));
        assert_eq!(data.given_names.as_deref(), Some("ANNA MARIA"));
        assert_eq!(data.document_number, "L898902C3");
        assert_eq!(data.nationality, "UTO");
        assert_eq!(data.date_of_birth, "740812");
        assert_eq!(data.sex, "F");
        assert_eq!(data.date_of_expiry, "120415");
        assert_eq!(data.optional_data, "ZE184226B");
        assert_eq!(data.raw_mrz_lines, [SPECIMEN_1.to_string(), SPECIMEN_2.to_string()]);
    }

    #[test]
    fn corrupted_birth_date_only_fails_its_own_checks() {
        // 740812 -> 740813 without touching the check digits
        let line2 = "L898902C36UTO7408132F1204159ZE184226B<<<<<10";
        let data = parsed(SPECIMEN_1, line2);

        assert!(data.check_digits.document_number);
        assert!(!data.check_digits.date_of_birth);
        assert!(data.check_digits.date_of_expiry);
        assert!(data.check_digits.optional_data);
        assert!(!data.check_digits.composite);
        assert_eq!(data.date_of_birth, "740813");
    }

    #[rstest]
    #[case(&SPECIMEN_1[..43], SPECIMEN_2)]
    #[case(SPECIMEN_1, "L898902C36UTO7408122F1204159ZE184226B<<<<<10<")]
    #[case("", "")]
    fn wrong_length_is_structurally_invalid(#[case] line1: &str, #[case] line2: &str) {
        assert!(matches!(
            MrzValidator::validate(line1, line2),
            MrzCheck::StructurallyInvalid { .. }
        ));
    }

    #[test]
    fn none_surname_is_absent() {
        let line1 = "P<UTONone<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<<<<<";
        let data = parsed(line1, SPECIMEN_2);
        assert_eq!(data.surname, None);
        assert_eq!(data.given_names.as_deref(), Some("ANNA MARIA"));
    }

    #[rstest]
    #[case("P<UTOERIKSSON<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<", Some("ERIKSSON"), Some(""))]
    #[case("P<UTO<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<<<<<<<<<", Some(""), Some("ANNA MARIA"))]
    fn empty_name_is_kept_as_empty(
        #[case] line1: &str,
        #[case] surname: Option<&str>,
        #[case] given: Option<&str>,
    ) {
        let data = parsed(line1, SPECIMEN_2);
        assert_eq!(data.surname.as_deref(), surname);
        assert_eq!(data.given_names.as_deref(), given);
    }

    #[test]
    fn literal_none_token_is_absent() {
        let line1 = "P<UTOERIKSSON<<None<<<<<<<<<<<<<<<<<<<<<<<<<";
        let data = parsed(line1, SPECIMEN_2);
        assert_eq!(data.surname.as_deref(), Some("ERIKSSON"));
        assert_eq!(data.given_names, None);
    }

    #[test]
    fn unspecified_sex_is_reported_as_x() {
        let line2 = "L898902C36UTO7408122<1204159ZE184226B<<<<<10";
        assert_eq!(parsed(SPECIMEN_1, line2).sex, "X");
    }
}
