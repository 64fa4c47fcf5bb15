//! Ethiopian calendar conversion.
//!
//! The Ethiopian calendar has 13 months: 12 months of 30 days followed by the
//! epagomenal month Pagume of 5 days (6 in a leap year). An Ethiopian year
//! begins on Gregorian September 11, shifted to September 12 when the
//! *following* Gregorian year is a leap year. Both conversions here hang off
//! that anchor; everything else is flat 30-day month arithmetic.
//!
//! Draw scheduling (cycle rollover, countdown) depends on these functions, so
//! they are kept pure and are tested by exhaustive round-trip.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::errors::EqubError;

/// Ethiopian month names, transliterated.
pub const MONTH_NAMES_EN: [&str; 13] = [
    "Meskerem", "Tikimt", "Hidar", "Tahsas", "Tir", "Yekatit", "Megabit",
    "Miyazya", "Ginbot", "Sene", "Hamle", "Nehase", "Pagume",
];

/// Ethiopian month names in Amharic.
pub const MONTH_NAMES_AM: [&str; 13] = [
    "መስከረም", "ጥቅምት", "ኅዳር", "ታኅሣሥ", "ጥር", "የካቲት", "መጋቢት",
    "ሚያዝያ", "ግንቦት", "ሰኔ", "ሐምሌ", "ነሐሴ", "ጳጉሜ",
];

/// A date in the Ethiopian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthiopianDate {
    pub year: i32,
    /// 1-13; month 13 is Pagume.
    pub month: u32,
    /// 1-30 (1-5/6 within Pagume).
    pub day: u32,
}

impl EthiopianDate {
    /// e.g. "Tir 1, 2016"
    pub fn format_en(&self) -> String {
        format!("{} {}, {}", MONTH_NAMES_EN[(self.month - 1) as usize], self.day, self.year)
    }

    /// e.g. "ጥር 1, 2016"
    pub fn format_am(&self) -> String {
        format!("{} {}, {}", MONTH_NAMES_AM[(self.month - 1) as usize], self.day, self.year)
    }
}

fn gregorian_is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// True when the Ethiopian year ends with a 6-day Pagume.
pub fn is_ethiopian_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 3
}

/// Gregorian date of Meskerem 1 for the Ethiopian year that starts within
/// `gregorian_year`. September 12 when the following Gregorian year is a
/// leap year, September 11 otherwise.
fn new_year_anchor(gregorian_year: i32) -> NaiveDate {
    let day = if gregorian_is_leap(gregorian_year + 1) { 12 } else { 11 };
    NaiveDate::from_ymd_opt(gregorian_year, 9, day)
        .expect("September 11/12 exists in every year")
}

/// Convert an Ethiopian date to its Gregorian equivalent.
///
/// Month and day are range-checked (1-13 / 1-30). Whether a given day exists
/// within Pagume is the caller's concern; out-of-range Pagume days simply
/// land in the following Ethiopian year.
pub fn to_gregorian(year: i32, month: u32, day: u32) -> Result<NaiveDate, EqubError> {
    if !(1..=13).contains(&month) || !(1..=30).contains(&day) {
        return Err(EqubError::InvalidDate(format!(
            "ethiopian date {}-{}-{} is out of range",
            year, month, day
        )));
    }

    let anchor = new_year_anchor(year + 7);
    let offset = (month - 1) * 30 + (day - 1);
    Ok(anchor + Duration::days(i64::from(offset)))
}

/// Convert a Gregorian date to its Ethiopian equivalent. Total over all
/// Gregorian dates.
pub fn to_ethiopian(date: NaiveDate) -> EthiopianDate {
    let gregorian_year = date.year();
    let anchor = new_year_anchor(gregorian_year);

    let (year, offset) = if date >= anchor {
        (gregorian_year - 7, (date - anchor).num_days())
    } else {
        // Before this year's new year: measure from the previous anchor.
        let previous_anchor = new_year_anchor(gregorian_year - 1);
        (gregorian_year - 8, (date - previous_anchor).num_days())
    };

    EthiopianDate {
        year,
        month: (offset / 30) as u32 + 1,
        day: (offset % 30) as u32 + 1,
    }
}

/// Parse an ISO `YYYY-MM-DD` Gregorian date string.
pub fn parse_gregorian(value: &str) -> Result<NaiveDate, EqubError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| EqubError::InvalidDate(format!("malformed gregorian date '{}'", value)))
}
