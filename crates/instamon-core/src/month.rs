//! Calendar-month bucket key (`MM/YYYY`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone};

use crate::ValidationError;

/// A calendar month, displayed as `MM/YYYY`.
///
/// Ordering is chronological (year first, then month), so a
/// `BTreeMap<MonthKey, _>` iterates oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` when `month` is outside `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month of `timestamp` in the timestamp's own offset.
    #[must_use]
    pub fn from_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidMonth(s.to_string());
        let (month, year) = s.trim().split_once('/').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if month.is_empty() || month.len() > 2 || !all_digits(month) || year.len() != 4 || !all_digits(year) {
            return Err(invalid());
        }
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}
