//! In-memory store and fixtures for engine and handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::availability::conflict::{window_around, Interval};
use crate::availability::{FixedClock, SchedulingStore, WorkingHours};
use crate::error::SchedulingError;
use crate::models::{Appointment, Craftsman, STATUS_CANCELLED, STATUS_SCHEDULED};

/// `"2026-10-19 10:00"` → local wall-clock time.
pub fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap()
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
}

/// Clock frozen at a UTC instant; pair with `LocalZone::utc()`.
pub fn frozen_clock(raw: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock(at(raw).and_utc()))
}

pub fn appointment(craftsman_id: i64, scheduled_at: &str, duration_minutes: i64) -> Appointment {
    Appointment {
        id: 0,
        craftsman_id,
        customer_name: None,
        title: None,
        scheduled_at: at(scheduled_at),
        duration_minutes,
        status: STATUS_SCHEDULED.into(),
        created_at: "2026-10-01 08:00:00".into(),
    }
}

pub fn craftsman_with(id: i64, hours: WorkingHours) -> Craftsman {
    Craftsman {
        id,
        name: format!("Craftsman {}", id),
        email: None,
        phone: None,
        working_hours: Some(serde_json::to_string(&hours).unwrap()),
        created_at: "2026-10-01 08:00:00".into(),
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    craftsmen: RwLock<Vec<Craftsman>>,
    appointments: RwLock<Vec<Appointment>>,
    failing: bool,
    day_fetches: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_craftsman(self, craftsman: Craftsman) -> Self {
        self.craftsmen.write().unwrap().push(craftsman);
        self
    }

    pub fn with_appointment(self, mut appointment: Appointment) -> Self {
        {
            let mut appointments = self.appointments.write().unwrap();
            appointment.id = appointments.len() as i64 + 1;
            appointments.push(appointment);
        }
        self
    }

    /// Every query fails as if the database were unreachable.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of `appointments_on` calls so far.
    pub fn day_fetches(&self) -> usize {
        self.day_fetches.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), SchedulingError> {
        if self.failing {
            return Err(SchedulingError::Database("connection refused".into()));
        }
        Ok(())
    }

    fn active_for(&self, craftsman_id: i64) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.craftsman_id == craftsman_id && a.status != STATUS_CANCELLED)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.scheduled_at);
        found
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn find_craftsman(&self, id: i64) -> Result<Option<Craftsman>, SchedulingError> {
        self.check_failing()?;
        let craftsmen = self.craftsmen.read().unwrap();
        Ok(craftsmen.iter().find(|c| c.id == id).cloned())
    }

    async fn appointments_on(
        &self,
        craftsman_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.day_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self
            .active_for(craftsman_id)
            .into_iter()
            .filter(|a| a.scheduled_at.date() == date)
            .collect())
    }

    async fn appointments_near(
        &self,
        craftsman_id: i64,
        center: NaiveDateTime,
        window: Duration,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.check_failing()?;
        let (lower, upper) = window_around(center, window)?;
        Ok(self
            .active_for(craftsman_id)
            .into_iter()
            .filter(|a| {
                let booked = Interval::of_appointment(a);
                booked.start <= upper && booked.end > lower
            })
            .collect())
    }
}
