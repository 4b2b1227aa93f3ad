use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    availability::{clock::parse_date, SchedulingStore},
    error::SchedulingError,
    models::*,
    AppState,
};

const DEFAULT_DURATION_MINUTES: i64 = 60;
const MAX_DURATION_MINUTES: i64 = 24 * 60;

async fn require_craftsman(state: &AppState, id: i64) -> Result<(), SchedulingError> {
    state
        .store
        .find_craftsman(id)
        .await?
        .map(|_| ())
        .ok_or(SchedulingError::CraftsmanNotFound(id))
}

/// GET /api/craftsmen/{id}/appointments?date=YYYY-MM-DD
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, SchedulingError> {
    let raw_date = query
        .date
        .as_deref()
        .ok_or_else(|| SchedulingError::validation("date is required"))?;
    let date = parse_date(raw_date)
        .ok_or_else(|| SchedulingError::validation(format!("invalid date '{}'", raw_date)))?;

    require_craftsman(&state, id).await?;
    let appointments = state.store.appointments_on(id, date).await?;

    Ok(Json(ApiResponse::success(appointments)))
}

/// POST /api/appointments — book a craftsman. No availability check is made
/// here; callers consult the availability endpoints first.
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<Json<ApiResponse<Appointment>>, SchedulingError> {
    let scheduled_at = state
        .config
        .zone
        .parse_date_time(&body.scheduled_at)
        .ok_or_else(|| {
            SchedulingError::validation(format!("invalid scheduled_at '{}'", body.scheduled_at))
        })?;

    let duration = body.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    if !(1..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(SchedulingError::validation(format!(
            "duration_minutes must be between 1 and {}",
            MAX_DURATION_MINUTES
        )));
    }

    require_craftsman(&state, body.craftsman_id).await?;

    let appointment = state
        .store
        .create_appointment(
            body.craftsman_id,
            scheduled_at,
            duration,
            body.customer_name.as_deref(),
            body.title.as_deref(),
        )
        .await?;

    tracing::info!(
        "Created appointment {} for craftsman {} at {}",
        appointment.id,
        appointment.craftsman_id,
        appointment.scheduled_at
    );
    Ok(Json(ApiResponse::success(appointment)))
}

/// POST /api/appointments/{id}/cancel — frees the slot for future searches.
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, SchedulingError> {
    if state.store.cancel_appointment(id).await? {
        tracing::info!("Cancelled appointment {}", id);
        return Ok(Json(ApiResponse::success("Appointment cancelled")));
    }

    match state.store.find_appointment(id).await? {
        Some(_) => Err(SchedulingError::validation("appointment is already cancelled")),
        None => Err(SchedulingError::NotFound(format!("appointment {}", id))),
    }
}
