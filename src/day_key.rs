//! UTC calendar days, the unit of puzzle rotation.
//!
//! A [`DayKey`] is always a real calendar date written as `YYYY-MM-DD`.
//! Day arithmetic goes through UTC midnight epoch milliseconds so local time
//! never leaks in.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PuzzleError;

pub const MS_PER_DAY: i64 = 86_400_000;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The UTC calendar day containing `instant`.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Milliseconds since the epoch at 00:00:00 UTC of this day.
    pub fn utc_midnight_ms(&self) -> i64 {
        self.0.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
    }

    pub fn from_utc_midnight_ms(ms: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(ms).map(Self::from_utc)
    }

    /// Shift by whole days. `None` only at the edges of the representable range.
    pub fn checked_offset(&self, days: i64) -> Option<Self> {
        let delta = days.checked_mul(MS_PER_DAY)?;
        Self::from_utc_midnight_ms(self.utc_midnight_ms().checked_add(delta)?)
    }

    pub fn prev(&self) -> Option<Self> {
        self.checked_offset(-1)
    }

    pub fn next(&self) -> Option<Self> {
        self.checked_offset(1)
    }

    /// The `count` days before this one, most recent first.
    pub fn preceding(&self, count: usize) -> Vec<Self> {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        (1..=count)
            .map_while(|back| self.checked_offset(-back))
            .collect()
    }

    /// True when this day's UTC midnight is strictly earlier than `other`'s.
    pub fn is_before(&self, other: &DayKey) -> bool {
        self.utc_midnight_ms() < other.utc_midnight_ms()
    }
}

/// Exact `NNNN-NN-NN` shape check; calendar validity is left to chrono.
fn has_day_key_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl FromStr for DayKey {
    type Err = PuzzleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if !has_day_key_shape(trimmed) {
            return Err(PuzzleError::InvalidInput(format!(
                "day key '{trimmed}' is not YYYY-MM-DD"
            )));
        }
        NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| PuzzleError::InvalidInput(format!("day key '{trimmed}' is not a calendar date")))
    }
}

impl TryFrom<String> for DayKey {
    type Error = PuzzleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(day: DayKey) -> Self {
        day.to_string()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

/// Source of "now" for the service. The server day is never taken from a client.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> DayKey {
        DayKey::from_utc(self.now())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for tests and replaying a given day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on `day`.
    pub fn on(day: DayKey) -> Self {
        Self(day.date().and_time(NaiveTime::MIN).and_utc() + TimeDelta::hours(12))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
