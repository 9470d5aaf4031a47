use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

/// Calendar day used as the aggregation key. Displays as `DD-MM-YYYY`
/// (the day-file naming scheme).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(Date);

impl Day {
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    pub fn date(self) -> Date {
        self.0
    }

    /// `YYYY-MM-DD`, used by the flat listing.
    pub fn iso(self) -> String {
        self.0
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day()))
    }
}

impl From<Date> for Day {
    fn from(d: Date) -> Self {
        Self(d)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{:04}", self.0.day(), u8::from(self.0.month()), self.0.year())
    }
}

impl FromStr for Day {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), format_description!("[day]-[month]-[year]"))
            .map(Self)
            .map_err(|e| format!("expected DD-MM-YYYY: {e}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("empty timestamp")]
    Empty,
    #[error("unrecognized timestamp \"{input}\"")]
    Unrecognized { input: String },
}

/// Above this a numeric epoch is taken to be in milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;
/// Shorter all-digit strings are compact dates or garbage, never epochs.
const EPOCH_MIN_DIGITS: usize = 9;

/// Permissive timestamp parser, truncating to the calendar day in the
/// timestamp's own offset (no timezone conversion).
///
/// Accepts RFC 3339, RFC 2822, the classic Twitter `created_at` layout
/// (`Sat May 01 10:00:00 +0000 2021`), ISO date-times with or without offset,
/// a handful of date-only layouts and numeric Unix epochs (s or ms).
pub fn parse_created_at(raw: &str) -> Result<Day, DateError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }
    parse_compact(s)
        .or_else(|| parse_epoch(s))
        .or_else(|| parse_with_offset(s))
        .or_else(|| parse_local(s))
        .or_else(|| parse_date_only(s))
        .map(Day)
        .ok_or_else(|| DateError::Unrecognized { input: s.to_string() })
}

/// ISO 8601 basic format: `20210501` or `20210501T100000Z`.
fn parse_compact(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year][month][day]"))
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(s, format_description!("[year][month][day]T[hour][minute][second]Z"))
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            OffsetDateTime::parse(
                s,
                format_description!("[year][month][day]T[hour][minute][second][offset_hour sign:mandatory][offset_minute]"),
            )
            .ok()
            .map(|dt| dt.date())
        })
}

fn parse_epoch(s: &str) -> Option<Date> {
    if s.len() < EPOCH_MIN_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    let secs = if n > EPOCH_MILLIS_THRESHOLD { n / 1000 } else { n };
    OffsetDateTime::from_unix_timestamp(secs).ok().map(|dt| dt.date())
}

fn parse_with_offset(s: &str) -> Option<Date> {
    OffsetDateTime::parse(s, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc2822))
        .or_else(|_| {
            OffsetDateTime::parse(
                s,
                format_description!(
                    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
                ),
            )
        })
        .or_else(|_| {
            OffsetDateTime::parse(
                s,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"),
            )
        })
        .or_else(|_| {
            OffsetDateTime::parse(
                s,
                format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory][offset_minute]"
                ),
            )
        })
        .or_else(|_| {
            OffsetDateTime::parse(
                s,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"),
            )
        })
        .or_else(|_| {
            OffsetDateTime::parse(
                s,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"),
            )
        })
        .ok()
        .map(|dt| dt.date())
}

fn parse_local(s: &str) -> Option<Date> {
    PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]")))
        .ok()
        .map(|dt| dt.date())
}

fn parse_date_only(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .or_else(|_| Date::parse(s, format_description!("[year]/[month]/[day]")))
        .or_else(|_| Date::parse(s, format_description!("[month padding:none]/[day padding:none]/[year]")))
        .or_else(|_| Date::parse(s, format_description!("[month repr:long] [day padding:none], [year]")))
        .or_else(|_| Date::parse(s, format_description!("[month repr:short] [day padding:none], [year]")))
        .or_else(|_| Date::parse(s, format_description!("[day padding:none] [month repr:long] [year]")))
        .or_else(|_| Date::parse(s, format_description!("[day padding:none] [month repr:short] [year]")))
        .ok()
}
