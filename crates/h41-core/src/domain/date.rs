use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Duration, Month};

use crate::ValidationError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static MONTH_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("month-name date pattern is valid")
});

/// Calendar date serialized as `YYYY-MM-DD`.
///
/// Release URLs use the compact `YYYYMMDD` form and table headers use the
/// month-name form (`Jan 7, 2026`); both are produced and parsed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate(Date);

impl IsoDate {
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidIsoDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Parses `YYYY-MM-DD`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let invalid = || ValidationError::InvalidIsoDate {
            value: input.to_owned(),
        };

        let mut parts = trimmed.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;
        Self::from_ymd(year, month, day).map_err(|_| invalid())
    }

    /// Parses the `YYYYMMDD` form used in release URLs.
    pub fn parse_compact(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidIsoDate {
            value: input.to_owned(),
        };
        if input.len() != 8 || !input.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }

        let year = input[0..4].parse::<i32>().map_err(|_| invalid())?;
        let month = input[4..6].parse::<u8>().map_err(|_| invalid())?;
        let day = input[6..8].parse::<u8>().map_err(|_| invalid())?;
        Self::from_ymd(year, month, day).map_err(|_| invalid())
    }

    /// First month-name date (`Jan 7, 2026`, `January 7, 2026`, `Jan. 7, 2026`) in `text`.
    pub fn find_in_text(text: &str) -> Option<Self> {
        Self::find_all_in_text(text).into_iter().next()
    }

    pub fn find_all_in_text(text: &str) -> Vec<Self> {
        MONTH_NAME_DATE
            .captures_iter(text)
            .filter_map(|captures| {
                let month = month_from_prefix(captures.get(1)?.as_str())?;
                let day = captures.get(2)?.as_str().parse::<u8>().ok()?;
                let year = captures.get(3)?.as_str().parse::<i32>().ok()?;
                Self::from_ymd(year, month, day).ok()
            })
            .collect()
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }

    pub fn format_compact(self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }

    /// Header style used by the release tables, e.g. `Jan 7, 2026`.
    pub fn format_long(self) -> String {
        let month = MONTH_ABBREVIATIONS[usize::from(u8::from(self.0.month())) - 1];
        format!("{month} {}, {}", self.0.day(), self.0.year())
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    pub fn abs_days_between(self, other: Self) -> i64 {
        self.days_until(other).abs()
    }

    pub fn minus_days(self, days: i64) -> Option<Self> {
        self.0.checked_sub(Duration::days(days)).map(Self)
    }

    pub fn plus_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }
}

fn month_from_prefix(prefix: &str) -> Option<u8> {
    let prefix = prefix.to_ascii_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|name| name.to_ascii_lowercase() == prefix)
        .and_then(|index| u8::try_from(index + 1).ok())
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for IsoDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for IsoDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_iso_dates() {
        let date = IsoDate::parse("2026-01-08").expect("must parse");
        assert_eq!(date.format_iso(), "2026-01-08");
        assert_eq!(date.format_compact(), "20260108");
        assert_eq!(date.format_long(), "Jan 8, 2026");
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        let err = IsoDate::parse("2026-02-30").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidIsoDate { .. }));
        assert!(IsoDate::parse("2026-1-8").is_err());
        assert!(IsoDate::parse_compact("2026010").is_err());
    }

    #[test]
    fn finds_month_name_dates_in_header_text() {
        let dates = IsoDate::find_all_in_text(
            "Change from week ended Dec. 31, 2025 and January 7, 2026 (Sept 3, 2025)",
        );
        assert_eq!(
            dates,
            vec![
                IsoDate::from_ymd(2025, 12, 31).expect("valid"),
                IsoDate::from_ymd(2026, 1, 7).expect("valid"),
                IsoDate::from_ymd(2025, 9, 3).expect("valid"),
            ]
        );
    }

    #[test]
    fn day_arithmetic_spans_year_boundaries() {
        let start = IsoDate::parse("2026-01-08").expect("valid");
        let year_ago = start.minus_days(364).expect("in range");
        assert_eq!(year_ago.format_iso(), "2025-01-09");
        assert_eq!(start.days_until(year_ago), -364);
        assert_eq!(start.abs_days_between(year_ago), 364);
    }
}
