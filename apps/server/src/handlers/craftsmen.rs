use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    availability::{SchedulingStore, WorkingHours},
    error::SchedulingError,
    models::*,
    AppState,
};

fn encode_working_hours(hours: &WorkingHours) -> Result<String, SchedulingError> {
    hours.validate().map_err(SchedulingError::Validation)?;
    serde_json::to_string(hours)
        .map_err(|e| SchedulingError::validation(format!("working_hours: {}", e)))
}

/// POST /api/craftsmen — register a craftsman, optionally with working hours.
pub async fn create_craftsman(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCraftsmanRequest>,
) -> Result<Json<ApiResponse<CraftsmanResponse>>, SchedulingError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(SchedulingError::validation("name is required"));
    }

    let working_hours = body
        .working_hours
        .as_ref()
        .map(encode_working_hours)
        .transpose()?;

    let craftsman = state
        .store
        .create_craftsman(
            name,
            body.email.as_deref(),
            body.phone.as_deref(),
            working_hours.as_deref(),
        )
        .await?;

    tracing::info!("Created craftsman {} ({})", craftsman.id, craftsman.name);
    Ok(Json(ApiResponse::success(craftsman.into())))
}

/// GET /api/craftsmen/{id}
pub async fn get_craftsman(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CraftsmanResponse>>, SchedulingError> {
    let craftsman = state
        .store
        .find_craftsman(id)
        .await?
        .ok_or(SchedulingError::CraftsmanNotFound(id))?;

    Ok(Json(ApiResponse::success(craftsman.into())))
}

/// PUT /api/craftsmen/{id}/working-hours — replace the weekly schedule.
pub async fn update_working_hours(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateWorkingHoursRequest>,
) -> Result<Json<ApiResponse<CraftsmanResponse>>, SchedulingError> {
    let encoded = encode_working_hours(&body.working_hours)?;

    if !state.store.update_working_hours(id, &encoded).await? {
        return Err(SchedulingError::CraftsmanNotFound(id));
    }

    let craftsman = state
        .store
        .find_craftsman(id)
        .await?
        .ok_or(SchedulingError::CraftsmanNotFound(id))?;

    tracing::info!("Updated working hours of craftsman {}", id);
    Ok(Json(ApiResponse::success(craftsman.into())))
}
