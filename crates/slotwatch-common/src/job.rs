use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use time::{Date, OffsetDateTime};

/// Coarse partition of a day used to filter raw time labels.
///
/// Unrecognized strings parse to `Any`: an unknown window means
/// "don't filter", not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Lunch,
    Dinner,
    Any,
}

impl FromStr for TimeWindow {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "lunch" => TimeWindow::Lunch,
            "dinner" => TimeWindow::Dinner,
            _ => TimeWindow::Any,
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Lunch => write!(f, "lunch"),
            TimeWindow::Dinner => write!(f, "dinner"),
            TimeWindow::Any => write!(f, "any"),
        }
    }
}

/// One standing request to watch a date/time-window/party-size combination.
///
/// Jobs live in memory for the lifetime of the process and are mutated only
/// by the scheduler. `notified` is monotonic: once set it never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorJob {
    pub id: String,
    pub date: Date,
    pub window: TimeWindow,
    pub party_size: u32,
    pub poll_interval: Duration,
    pub last_checked: OffsetDateTime,
    pub enabled: bool,
    pub notified: bool,
}

impl MonitorJob {
    /// `last_checked` starts at the epoch so the first tick always runs.
    pub fn new(
        id: String,
        date: Date,
        window: TimeWindow,
        party_size: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            id,
            date,
            window,
            party_size,
            poll_interval,
            last_checked: OffsetDateTime::UNIX_EPOCH,
            enabled: true,
            notified: false,
        }
    }

    pub fn is_eligible(&self, now: OffsetDateTime) -> bool {
        self.enabled && !self.notified && now - self.last_checked >= self.poll_interval
    }
}
