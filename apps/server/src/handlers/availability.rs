use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::{
    availability::{
        clock::{parse_date, parse_time},
        message::compose_message,
    },
    error::SchedulingError,
    models::*,
    AppState,
};

/// Treats `?time=` and `"   "` like a missing value.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/craftsmen/{id}/availability?date=YYYY-MM-DD[&time=HH:MM]
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, SchedulingError> {
    let raw_date = non_empty(params.date.as_deref())
        .ok_or_else(|| SchedulingError::validation("date is required"))?;
    let date = parse_date(raw_date)
        .ok_or_else(|| SchedulingError::validation(format!("invalid date '{}'", raw_date)))?;
    let time = match non_empty(params.time.as_deref()) {
        Some(raw) => Some(
            parse_time(raw)
                .ok_or_else(|| SchedulingError::validation(format!("invalid time '{}'", raw)))?,
        ),
        None => None,
    };

    let check = state.availability.check_availability(id, date, time).await?;

    Ok(Json(ApiResponse::success(AvailabilityResponse {
        available: check.available,
        reason: check.reason.map(|r| r.to_string()),
        working_hours: check.working_hours,
        appointments: check.appointments,
    })))
}

/// POST /api/availability/alternatives — point check plus nearest free slots.
pub async fn check_with_alternatives(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AlternativesRequest>,
) -> Result<Json<ApiResponse<AlternativesResponse>>, SchedulingError> {
    let zone = state.availability.zone();

    let raw = non_empty(body.requested_date_time.as_deref())
        .ok_or_else(|| SchedulingError::validation("requested_date_time is required"))?;
    let requested = zone.parse_date_time(raw).ok_or_else(|| {
        SchedulingError::validation(format!("invalid requested_date_time '{}'", raw))
    })?;
    let (days_to_check, slots_to_return) = state
        .config
        .search_limits(body.days_to_check, body.slots_to_return)
        .map_err(SchedulingError::Validation)?;

    let outcome = state
        .availability
        .check_with_alternatives(body.craftsman_id, requested, days_to_check, slots_to_return)
        .await?;

    let message_to_send = compose_message(
        &outcome.craftsman_name,
        &outcome.requested_date_time,
        outcome.reason.as_ref(),
        &outcome.alternative_slots,
    );

    let timestamp = |local: NaiveDateTime| {
        zone.to_timestamp(local).ok_or_else(|| {
            SchedulingError::validation(format!("{} is outside the supported date range", local))
        })
    };

    Ok(Json(ApiResponse::success(AlternativesResponse {
        is_available: outcome.is_available,
        requested_date_time: timestamp(outcome.requested_date_time)?,
        reason: outcome.reason.map(|r| r.to_string()),
        alternative_slots: outcome
            .alternative_slots
            .into_iter()
            .map(timestamp)
            .collect::<Result<_, _>>()?,
        message_to_send,
    })))
}
