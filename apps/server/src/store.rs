use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use crate::availability::conflict::window_around;
use crate::availability::SchedulingStore;
use crate::error::SchedulingError;
use crate::models::{Appointment, Craftsman, STATUS_CANCELLED, STATUS_SCHEDULED};

/// Timestamp layout stored in `appointments.scheduled_at`; lexical order
/// matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const APPOINTMENT_SELECT: &str =
    "SELECT id, craftsman_id, customer_name, title, scheduled_at, duration_minutes, status, created_at
     FROM appointments";

const CRAFTSMAN_SELECT: &str =
    "SELECT id, name, email, phone, working_hours, created_at FROM craftsmen";

/// [`SchedulingStore`] over the service's sqlite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_craftsman(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        working_hours_json: Option<&str>,
    ) -> Result<Craftsman, SchedulingError> {
        let id = sqlx::query(
            "INSERT INTO craftsmen (name, email, phone, working_hours) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(working_hours_json)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        self.find_craftsman(id)
            .await?
            .ok_or(SchedulingError::CraftsmanNotFound(id))
    }

    /// Returns `false` when no craftsman has this id.
    pub async fn update_working_hours(
        &self,
        id: i64,
        working_hours_json: &str,
    ) -> Result<bool, SchedulingError> {
        let result = sqlx::query("UPDATE craftsmen SET working_hours = ? WHERE id = ?")
            .bind(working_hours_json)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn create_appointment(
        &self,
        craftsman_id: i64,
        scheduled_at: NaiveDateTime,
        duration_minutes: i64,
        customer_name: Option<&str>,
        title: Option<&str>,
    ) -> Result<Appointment, SchedulingError> {
        let id = sqlx::query(
            "INSERT INTO appointments (craftsman_id, customer_name, title, scheduled_at, duration_minutes, status)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(craftsman_id)
        .bind(customer_name)
        .bind(title)
        .bind(scheduled_at.format(TIMESTAMP_FORMAT).to_string())
        .bind(duration_minutes)
        .bind(STATUS_SCHEDULED)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        self.find_appointment(id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {}", id)))
    }

    pub async fn find_appointment(&self, id: i64) -> Result<Option<Appointment>, SchedulingError> {
        let query = format!("{} WHERE id = ?", APPOINTMENT_SELECT);
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(appointment)
    }

    /// Returns `false` when the appointment does not exist or is already
    /// cancelled.
    pub async fn cancel_appointment(&self, id: i64) -> Result<bool, SchedulingError> {
        let result = sqlx::query("UPDATE appointments SET status = ? WHERE id = ? AND status != ?")
            .bind(STATUS_CANCELLED)
            .bind(id)
            .bind(STATUS_CANCELLED)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SchedulingStore for SqliteStore {
    async fn find_craftsman(&self, id: i64) -> Result<Option<Craftsman>, SchedulingError> {
        let query = format!("{} WHERE id = ?", CRAFTSMAN_SELECT);
        let craftsman = sqlx::query_as::<_, Craftsman>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(craftsman)
    }

    async fn appointments_on(
        &self,
        craftsman_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let query = format!(
            "{} WHERE craftsman_id = ? AND date(scheduled_at) = ? AND status != ?
             ORDER BY scheduled_at ASC",
            APPOINTMENT_SELECT
        );
        let appointments = sqlx::query_as::<_, Appointment>(&query)
            .bind(craftsman_id)
            .bind(date.format("%Y-%m-%d").to_string())
            .bind(STATUS_CANCELLED)
            .fetch_all(&self.db)
            .await?;
        Ok(appointments)
    }

    async fn appointments_near(
        &self,
        craftsman_id: i64,
        center: NaiveDateTime,
        window: Duration,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let (lower, upper) = window_around(center, window)?;
        let lower = lower.format(TIMESTAMP_FORMAT).to_string();
        let upper = upper.format(TIMESTAMP_FORMAT).to_string();
        let query = format!(
            "{} WHERE craftsman_id = ? AND status != ?
               AND scheduled_at <= ?
               AND datetime(scheduled_at, '+' || duration_minutes || ' minutes') > ?
             ORDER BY scheduled_at ASC",
            APPOINTMENT_SELECT
        );
        let appointments = sqlx::query_as::<_, Appointment>(&query)
            .bind(craftsman_id)
            .bind(STATUS_CANCELLED)
            .bind(upper)
            .bind(lower)
            .fetch_all(&self.db)
            .await?;
        Ok(appointments)
    }
}
