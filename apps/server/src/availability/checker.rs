//! Single-point availability decision: working hours first, then bookings.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

use super::conflict::is_booked_at;
use super::time_range::TimeRange;
use super::working_hours::{weekday_name, window_for, WorkingHours};
use super::SchedulingStore;
use crate::error::SchedulingError;
use crate::models::{Appointment, Craftsman};

/// Appointments within this many hours of a requested instant are fetched
/// for the point check.
pub const NEAR_WINDOW_HOURS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    DoesNotWork { day: &'static str },
    InvalidTimeRange,
    OutsideWorkingHours,
    ConflictingAppointments,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::DoesNotWork { day } => write!(f, "does not work on {}", day),
            UnavailableReason::InvalidTimeRange => f.write_str("invalid time range format"),
            UnavailableReason::OutsideWorkingHours => f.write_str("outside working hours"),
            UnavailableReason::ConflictingAppointments => {
                f.write_str("has conflicting appointments")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub reason: Option<UnavailableReason>,
    /// The day's working window as stored, when the craftsman works that day.
    pub working_hours: Option<String>,
    pub appointments: Vec<Appointment>,
}

impl AvailabilityCheck {
    fn unavailable(reason: UnavailableReason, working_hours: Option<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            working_hours,
            appointments: Vec::new(),
        }
    }
}

/// Working-hours phase. `Ok` carries the day's window string; `Err` the
/// reason the request fails before bookings are even looked at.
pub fn check_working_hours(
    hours: Option<&WorkingHours>,
    date: NaiveDate,
    time: Option<NaiveTime>,
) -> Result<String, (UnavailableReason, Option<String>)> {
    let weekday = date.weekday();
    let window = match window_for(hours, weekday) {
        Some(w) => w.to_string(),
        None => {
            return Err((
                UnavailableReason::DoesNotWork {
                    day: weekday_name(weekday),
                },
                None,
            ))
        }
    };

    let Some(time) = time else {
        return Ok(window);
    };

    let range = match TimeRange::parse(&window) {
        Some(r) => r,
        None => {
            tracing::warn!("unparseable working hours '{}' on {}", window, date);
            return Err((UnavailableReason::InvalidTimeRange, Some(window)));
        }
    };

    let minute_of_day = time.hour() * 60 + time.minute();
    if !range.contains_minute(minute_of_day) {
        return Err((UnavailableReason::OutsideWorkingHours, Some(window)));
    }

    Ok(window)
}

/// Both phases for one craftsman. Without a time the day's appointments are
/// returned and the day counts as available as long as the craftsman works.
pub async fn check_craftsman(
    store: &dyn SchedulingStore,
    craftsman: &Craftsman,
    date: NaiveDate,
    time: Option<NaiveTime>,
) -> Result<AvailabilityCheck, SchedulingError> {
    let hours = craftsman.working_hours();
    let window = match check_working_hours(hours.as_ref(), date, time) {
        Ok(window) => window,
        Err((reason, window)) => return Ok(AvailabilityCheck::unavailable(reason, window)),
    };

    let Some(time) = time else {
        let appointments = store.appointments_on(craftsman.id, date).await?;
        return Ok(AvailabilityCheck {
            available: true,
            reason: None,
            working_hours: Some(window),
            appointments,
        });
    };

    let requested = date.and_time(time);
    let appointments = store
        .appointments_near(craftsman.id, requested, Duration::hours(NEAR_WINDOW_HOURS))
        .await?;

    let booked = is_booked_at(requested, &appointments);
    Ok(AvailabilityCheck {
        available: !booked,
        reason: booked.then_some(UnavailableReason::ConflictingAppointments),
        working_hours: Some(window),
        appointments,
    })
}
