use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use time::{Date, Month};

/// A rendered calendar caption such as `"May 2025"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCaption {
    pub month: Month,
    pub year: i32,
}

impl MonthCaption {
    /// Parse a caption of the form `<English month name> <4-digit year>`.
    /// Returns `None` for anything else; captions are UI text and may be
    /// empty or mid-render when read.
    pub fn parse(caption: &str) -> Option<Self> {
        static CAPTION: OnceLock<Regex> = OnceLock::new();
        let re = CAPTION.get_or_init(|| Regex::new(r"^([A-Za-z]+)\s+(\d{4})$").unwrap());
        let caps = re.captures(caption.trim())?;
        let month = month_from_name(&caps[1])?;
        let year = caps[2].parse().ok()?;
        Some(Self { month, year })
    }

    pub fn of(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// The caption one month later, rolling the year over December.
    pub fn succ(self) -> Self {
        Self {
            month: self.month.next(),
            year: if self.month == Month::December {
                self.year + 1
            } else {
                self.year
            },
        }
    }
}

impl fmt::Display for MonthCaption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

fn month_from_name(name: &str) -> Option<Month> {
    Some(match name.to_ascii_lowercase().as_str() {
        "january" => Month::January,
        "february" => Month::February,
        "march" => Month::March,
        "april" => Month::April,
        "may" => Month::May,
        "june" => Month::June,
        "july" => Month::July,
        "august" => Month::August,
        "september" => Month::September,
        "october" => Month::October,
        "november" => Month::November,
        "december" => Month::December,
        _ => return None,
    })
}

#[derive(Debug, Error)]
#[error("invalid date '{0}', expected YYYY-MM-DD")]
pub struct InvalidDate(pub String);

/// Parse a `YYYY-MM-DD` string into a calendar date.
pub fn parse_iso_date(s: &str) -> Result<Date, InvalidDate> {
    let err = || InvalidDate(s.to_string());
    let mut parts = s.splitn(3, '-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let month: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let day: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let month = Month::try_from(month).map_err(|_| err())?;
    Date::from_calendar_date(year, month, day).map_err(|_| err())
}

pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
