use chrono::NaiveDate;

use crate::models::CountryTable;

/// Two-digit years below this belong to the 2000s, the rest to the 1900s
/// (the POSIX `%y` rule). A birth year of `65` therefore reads as 2065.
pub const CENTURY_PIVOT: u32 = 69;

pub struct FieldNormalizer;

impl FieldNormalizer {
    /// Convert an MRZ `YYMMDD` date to `DD-MM-YYYY`.
    ///
    /// Returns `None` when the input is not six digits or not a calendar date.
    pub fn normalize_date(raw: &str) -> Option<String> {
        match Self::parse_mrz_date(raw) {
            Some(date) => Some(date.format("%d-%m-%Y").to_string()),
            None => {
                log::warn!("Error parsing MRZ date: '{}'", raw);
                None
            }
        }
    }

    pub fn parse_mrz_date(raw: &str) -> Option<NaiveDate> {
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let year = raw[0..2].parse::<u32>().ok()?;
        let month = raw[2..4].parse::<u32>().ok()?;
        let day = raw[4..6].parse::<u32>().ok()?;

        let full_year = if year < CENTURY_PIVOT { 2000 + year } else { 1900 + year };
        NaiveDate::from_ymd_opt(full_year as i32, month, day)
    }

    /// Full country name for an MRZ code, or the code itself when unknown.
    pub fn resolve_country(code: &str) -> String {
        match CountryTable::lookup(code) {
            Some(name) => name.to_string(),
            None => {
                if !code.is_empty() {
                    log::debug!("Unknown country code '{}', keeping as-is", code);
                }
                code.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("991231", "31-12-1999")]
    #[case("740812", "12-08-1974")]
    #[case("690101", "01-01-1969")]
    #[case("681231", "31-12-2068")]
    #[case("000229", "29-02-2000")]
    #[case("270415", "15-04-2027")]
    fn valid_dates_are_reformatted(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(FieldNormalizer::normalize_date(raw).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("991332")]
    #[case("990230")]
    #[case("010229")]
    #[case("991200")]
    #[case("9912")]
    #[case("99123")]
    #[case("9912310")]
    #[case("99<231")]
    #[case("None")]
    #[case("")]
    fn invalid_dates_fail(#[case] raw: &str) {
        assert_eq!(FieldNormalizer::normalize_date(raw), None);
    }

    #[test]
    fn known_countries_resolve_to_names() {
        assert_eq!(FieldNormalizer::resolve_country("DEU"), "Germany");
        assert_eq!(FieldNormalizer::resolve_country("D"), "Germany");
        assert_eq!(FieldNormalizer::resolve_country("SAU"), "Saudi Arabia");
    }

    #[test]
    fn unknown_countries_pass_through() {
        assert_eq!(FieldNormalizer::resolve_country("UTO"), "UTO");
        assert_eq!(FieldNormalizer::resolve_country(""), "");
    }
}
