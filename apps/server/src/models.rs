use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::availability::WorkingHours;

/// Appointment lifecycle states. Only `cancelled` stops blocking the calendar.
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_CANCELLED: &str = "cancelled";

// ── Database models ──

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Craftsman {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// JSON-encoded [`WorkingHours`]; NULL when never configured.
    pub working_hours: Option<String>,
    pub created_at: String,
}

impl Craftsman {
    /// Decoded working hours. Undecodable JSON counts as "no working hours".
    pub fn working_hours(&self) -> Option<WorkingHours> {
        let raw = self.working_hours.as_deref()?;
        match serde_json::from_str::<WorkingHours>(raw) {
            Ok(hours) => Some(hours),
            Err(e) => {
                tracing::warn!(
                    "craftsman {}: ignoring undecodable working hours: {}",
                    self.id,
                    e
                );
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i64,
    pub craftsman_id: i64,
    pub customer_name: Option<String>,
    pub title: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: String,
    pub created_at: String,
}

// ── API request/response types ──

#[derive(Debug, Deserialize)]
pub struct CreateCraftsmanRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<WorkingHours>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkingHoursRequest {
    pub working_hours: WorkingHours,
}

#[derive(Debug, Serialize)]
pub struct CraftsmanResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<WorkingHours>,
    pub created_at: String,
}

impl From<Craftsman> for CraftsmanResponse {
    fn from(c: Craftsman) -> Self {
        let working_hours = c.working_hours();
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            working_hours,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub craftsman_id: i64,
    pub scheduled_at: String,
    pub duration_minutes: Option<i64>,
    pub customer_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<String>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
pub struct AlternativesRequest {
    pub craftsman_id: i64,
    pub requested_date_time: Option<String>,
    pub days_to_check: Option<u32>,
    pub slots_to_return: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub is_available: bool,
    pub requested_date_time: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub alternative_slots: Vec<DateTime<FixedOffset>>,
    pub message_to_send: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
