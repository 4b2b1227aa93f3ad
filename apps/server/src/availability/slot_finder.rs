//! Forward search for free half-hour slots across a bounded number of days.

use chrono::{Datelike, Days, NaiveDateTime, Timelike};

use super::conflict::has_conflict;
use super::time_range::TimeRange;
use super::working_hours::{day_name_of, window_for, WorkingHours};
use super::SchedulingStore;
use crate::error::SchedulingError;

/// Minute marks offered within every hour.
const MINUTE_MARKS: [u32; 2] = [0, 30];

pub struct SlotFinder<'a> {
    store: &'a dyn SchedulingStore,
    /// Local wall-clock "now", sampled once per search.
    now: NaiveDateTime,
}

impl<'a> SlotFinder<'a> {
    pub fn new(store: &'a dyn SchedulingStore, now: NaiveDateTime) -> Self {
        Self { store, now }
    }

    /// Up to `slots_to_return` free slots, earliest first, starting on the
    /// requested day and scanning `days_to_check` days forward.
    ///
    /// Results are ascending because days and marks are only ever visited
    /// forward in time.
    pub async fn find_slots(
        &self,
        craftsman_id: i64,
        hours: Option<&WorkingHours>,
        requested: NaiveDateTime,
        days_to_check: u32,
        slots_to_return: usize,
    ) -> Result<Vec<NaiveDateTime>, SchedulingError> {
        let mut slots = Vec::new();
        if slots_to_return == 0 {
            return Ok(slots);
        }

        for day_offset in 0..days_to_check {
            // the calendar ends before the horizon near the maximum date
            let Some(date) = requested
                .date()
                .checked_add_days(Days::new(u64::from(day_offset)))
            else {
                break;
            };
            let Some(window) = window_for(hours, date.weekday()) else {
                continue;
            };
            let Some(range) = TimeRange::parse(window) else {
                tracing::warn!(
                    "craftsman {}: skipping {} ({}), unparseable working hours '{}'",
                    craftsman_id,
                    date,
                    day_name_of(date),
                    window
                );
                continue;
            };

            let bookings = self.store.appointments_on(craftsman_id, date).await?;
            tracing::debug!(
                "craftsman {}: scanning {} {} with {} bookings",
                craftsman_id,
                date,
                window,
                bookings.len()
            );

            let start_hour = range.start_hour();
            let start_mark = range.start_minute % 60;
            for hour in start_hour..range.end_hour() {
                for minute in MINUTE_MARKS {
                    if hour == start_hour && minute < start_mark {
                        continue;
                    }
                    if hour * 60 + minute >= range.end_minute {
                        continue;
                    }
                    // hours past 23 cannot form a timestamp
                    let Some(candidate) = date.and_hms_opt(hour, minute, 0) else {
                        continue;
                    };
                    if candidate < self.now {
                        continue;
                    }
                    if day_offset == 0
                        && hour == requested.hour()
                        && minute == requested.minute()
                    {
                        continue;
                    }
                    if has_conflict(candidate, &bookings) {
                        continue;
                    }

                    slots.push(candidate);
                    if slots.len() >= slots_to_return {
                        return Ok(slots);
                    }
                }
            }
        }

        Ok(slots)
    }
}
