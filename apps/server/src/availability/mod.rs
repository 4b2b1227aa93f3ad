//! Craftsman availability and alternative-slot recommendation.
//!
//! The engine is read-only: it never reserves a slot. Everything it knows
//! about craftsmen and bookings comes through [`SchedulingStore`], and "now"
//! comes from an injected [`Clock`], so it runs the same against sqlite and
//! against the in-memory store used in tests.

pub mod checker;
pub mod clock;
pub mod conflict;
pub mod message;
pub mod slot_finder;
pub mod time_range;
pub mod working_hours;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::SchedulingError;
use crate::models::{Appointment, Craftsman};

pub use checker::{AvailabilityCheck, UnavailableReason};
pub use clock::{Clock, FixedClock, LocalZone, SystemClock};
pub use slot_finder::SlotFinder;
pub use working_hours::WorkingHours;

pub const DEFAULT_DAYS_TO_CHECK: u32 = 7;
pub const DEFAULT_SLOTS_TO_RETURN: u32 = 3;

/// Read access to craftsmen and their (non-cancelled) appointments.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn find_craftsman(&self, id: i64) -> Result<Option<Craftsman>, SchedulingError>;

    /// Appointments starting on `date`, ordered by start time.
    async fn appointments_on(
        &self,
        craftsman_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    /// Appointments whose `[start, end)` overlaps `[center - window, center + window]`.
    async fn appointments_near(
        &self,
        craftsman_id: i64,
        center: NaiveDateTime,
        window: Duration,
    ) -> Result<Vec<Appointment>, SchedulingError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativesOutcome {
    pub craftsman_name: String,
    pub is_available: bool,
    pub requested_date_time: NaiveDateTime,
    pub reason: Option<UnavailableReason>,
    /// Ascending; empty whenever `is_available` is true.
    pub alternative_slots: Vec<NaiveDateTime>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    zone: LocalZone,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>, zone: LocalZone) -> Self {
        Self { store, clock, zone }
    }

    pub fn zone(&self) -> LocalZone {
        self.zone
    }

    async fn craftsman(&self, id: i64) -> Result<Craftsman, SchedulingError> {
        self.store
            .find_craftsman(id)
            .await?
            .ok_or(SchedulingError::CraftsmanNotFound(id))
    }

    /// Is the craftsman bookable on `date` (at `time`, when given)?
    pub async fn check_availability(
        &self,
        craftsman_id: i64,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<AvailabilityCheck, SchedulingError> {
        let craftsman = self.craftsman(craftsman_id).await?;
        checker::check_craftsman(self.store.as_ref(), &craftsman, date, time).await
    }

    /// Point check at `requested`; when that fails, the nearest free slots.
    pub async fn check_with_alternatives(
        &self,
        craftsman_id: i64,
        requested: NaiveDateTime,
        days_to_check: u32,
        slots_to_return: u32,
    ) -> Result<AlternativesOutcome, SchedulingError> {
        let craftsman = self.craftsman(craftsman_id).await?;
        let check = checker::check_craftsman(
            self.store.as_ref(),
            &craftsman,
            requested.date(),
            Some(requested.time()),
        )
        .await?;

        let alternative_slots = if check.available {
            Vec::new()
        } else {
            let now = self.zone.now(self.clock.as_ref());
            SlotFinder::new(self.store.as_ref(), now)
                .find_slots(
                    craftsman.id,
                    craftsman.working_hours().as_ref(),
                    requested,
                    days_to_check,
                    slots_to_return as usize,
                )
                .await?
        };

        tracing::info!(
            "craftsman {} at {}: available={}, {} alternatives",
            craftsman.id,
            requested,
            check.available,
            alternative_slots.len()
        );

        Ok(AlternativesOutcome {
            craftsman_name: craftsman.name,
            is_available: check.available,
            requested_date_time: requested,
            reason: check.reason,
            alternative_slots,
        })
    }
}
