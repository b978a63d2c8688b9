use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use buziz_core::ServiceError;

use crate::model::{CreatePatternRequest, CreateShiftRequest, RecurringPattern, Shift};
use crate::service::ScheduleService;

type ServiceState = Arc<ScheduleService>;

pub fn router(service: ServiceState) -> Router {
    Router::new()
        .route("/{officeId}/shifts", get(list_shifts).post(create_shift))
        .route(
            "/{officeId}/shifts/{shiftId}",
            get(get_shift).delete(delete_shift),
        )
        .route(
            "/{officeId}/recurring",
            get(list_patterns).post(create_pattern),
        )
        .route("/{officeId}/recurring/@materialize", post(materialize))
        .route(
            "/{officeId}/recurring/{patternId}",
            get(get_pattern).delete(delete_pattern),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

async fn list_shifts(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = service.list_shifts(&office_id)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

async fn create_shift(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
    Json(req): Json<CreateShiftRequest>,
) -> Result<Json<Shift>, ServiceError> {
    Ok(Json(service.create_shift(&office_id, req)?))
}

async fn get_shift(
    State(service): State<ServiceState>,
    Path((office_id, shift_id)): Path<(String, String)>,
) -> Result<Json<Shift>, ServiceError> {
    Ok(Json(service.get_shift(&office_id, &shift_id)?))
}

async fn delete_shift(
    State(service): State<ServiceState>,
    Path((office_id, shift_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_shift(&office_id, &shift_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Recurring patterns
// ---------------------------------------------------------------------------

async fn list_patterns(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = service.list_patterns(&office_id)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

async fn create_pattern(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
    Json(req): Json<CreatePatternRequest>,
) -> Result<Json<RecurringPattern>, ServiceError> {
    Ok(Json(service.create_pattern(&office_id, req)?))
}

async fn get_pattern(
    State(service): State<ServiceState>,
    Path((office_id, pattern_id)): Path<(String, String)>,
) -> Result<Json<RecurringPattern>, ServiceError> {
    Ok(Json(service.get_pattern(&office_id, &pattern_id)?))
}

async fn delete_pattern(
    State(service): State<ServiceState>,
    Path((office_id, pattern_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_pattern(&office_id, &pattern_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// POST /:officeId/recurring/@materialize
// ---------------------------------------------------------------------------

async fn materialize(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let generated = service.materialize(&office_id)?;
    Ok(Json(serde_json::json!({ "generated": generated })))
}
