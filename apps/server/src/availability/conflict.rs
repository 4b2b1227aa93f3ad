//! Overlap rules between candidate slots and booked appointments.
//!
//! Intervals are half-open `[start, end)`: touching intervals never conflict.

use chrono::{Duration, NaiveDateTime};

use crate::error::SchedulingError;
use crate::models::Appointment;

/// Width assumed for every candidate during alternative-slot search,
/// independent of the booked appointments' own durations.
pub const SEARCH_SLOT_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// The end saturates at the last representable instant.
    pub fn new(start: NaiveDateTime, minutes: i64) -> Self {
        let end = start
            .checked_add_signed(Duration::minutes(minutes.max(0)))
            .unwrap_or(NaiveDateTime::MAX);
        Self { start, end }
    }

    pub fn of_appointment(appointment: &Appointment) -> Self {
        Self::new(appointment.scheduled_at, appointment.duration_minutes)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Candidate `self` against booked `other`.
    pub fn conflicts_with(&self, other: &Interval) -> bool {
        let start_inside = other.contains(self.start);
        let end_inside = other.start < self.end && self.end <= other.end;
        let encloses = self.start <= other.start && other.end <= self.end;
        start_inside || end_inside || encloses
    }
}

/// Whether a one-hour slot starting at `slot_start` overlaps any booking.
pub fn has_conflict(slot_start: NaiveDateTime, bookings: &[Appointment]) -> bool {
    let candidate = Interval::new(slot_start, SEARCH_SLOT_MINUTES);
    bookings
        .iter()
        .any(|appointment| candidate.conflicts_with(&Interval::of_appointment(appointment)))
}

/// Whether `instant` falls inside a booking, using each booking's stored
/// duration.
pub fn is_booked_at(instant: NaiveDateTime, bookings: &[Appointment]) -> bool {
    bookings
        .iter()
        .any(|appointment| Interval::of_appointment(appointment).contains(instant))
}

/// `[center - window, center + window]`, rejected when either bound falls
/// outside the calendar.
pub fn window_around(
    center: NaiveDateTime,
    window: Duration,
) -> Result<(NaiveDateTime, NaiveDateTime), SchedulingError> {
    center
        .checked_sub_signed(window)
        .zip(center.checked_add_signed(window))
        .ok_or_else(|| {
            SchedulingError::validation(format!("{} is outside the supported date range", center))
        })
}
