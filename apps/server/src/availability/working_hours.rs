//! Per-weekday working windows of a craftsman.
//!
//! Only the first range of a day is consulted. A craftsman with a split shift
//! (e.g. `["8:00-12:00", "14:00-18:00"]`) is treated as working `8:00-12:00`
//! only; additional ranges are kept for storage but never scheduled.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::time_range::TimeRange;

/// Canonical day keys, indexed 0=Sunday..6=Saturday.
pub const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Lowercase English name of a weekday, the key used in [`WorkingHours`].
pub fn weekday_name(weekday: Weekday) -> &'static str {
    DAY_NAMES[weekday.num_days_from_sunday() as usize]
}

/// Weekday name of a calendar date.
pub fn day_name_of(date: NaiveDate) -> &'static str {
    weekday_name(date.weekday())
}

/// Mapping from day name to its time-range strings, e.g.
/// `{"monday": ["9:00-17:00"], "saturday": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingHours(BTreeMap<String, Vec<String>>);

impl WorkingHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and the craftsman endpoints.
    pub fn with_day(mut self, day: &str, ranges: &[&str]) -> Self {
        self.0.insert(
            day.to_string(),
            ranges.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    /// First range of the day at `index` (0=Sunday). `None` for unknown
    /// indexes, absent days and empty lists.
    pub fn first_range_for_index(&self, index: usize) -> Option<&str> {
        let day = DAY_NAMES.get(index)?;
        self.0.get(*day)?.first().map(String::as_str)
    }

    pub fn first_range(&self, weekday: Weekday) -> Option<&str> {
        self.first_range_for_index(weekday.num_days_from_sunday() as usize)
    }

    /// Rejects unknown day keys and unparseable ranges. Only used on writes;
    /// stored data is read leniently.
    pub fn validate(&self) -> Result<(), String> {
        for (day, ranges) in &self.0 {
            if !DAY_NAMES.contains(&day.as_str()) {
                return Err(format!("unknown day '{}'", day));
            }
            if let Some(bad) = ranges.iter().find(|r| TimeRange::parse(r).is_none()) {
                return Err(format!("invalid time range '{}' for {}", bad, day));
            }
        }
        Ok(())
    }
}

/// The day's working window, with an absent map meaning "never works".
pub fn window_for(hours: Option<&WorkingHours>, weekday: Weekday) -> Option<&str> {
    hours?.first_range(weekday)
}
