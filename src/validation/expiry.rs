use chrono::{Days, NaiveDate};

/// Passports expiring within this many days of processing are flagged.
pub const DEFAULT_HORIZON_DAYS: u32 = 180;

pub struct ExpiryValidator;

impl ExpiryValidator {
    /// True when `expiry` falls on or before `today + horizon_days`.
    /// Already-expired passports are included.
    pub fn expires_within(expiry: NaiveDate, today: NaiveDate, horizon_days: u32) -> bool {
        match today.checked_add_days(Days::new(u64::from(horizon_days))) {
            Some(limit) => expiry <= limit,
            None => true,
        }
    }

    // Parse a roster date in the format "DD-MM-YYYY"
    pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str.trim(), "%d-%m-%Y").ok()
    }
}
