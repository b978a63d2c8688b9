use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use buziz_core::{ListParams, ListResult, ServiceError};

use crate::model::{ClockEntry, ClockRequest};
use crate::service::TimeclockService;

type ServiceState = Arc<TimeclockService>;

pub fn router(service: ServiceState) -> Router {
    Router::new()
        .route("/in", post(clock_in))
        .route("/out", post(clock_out))
        .route("/active/{employeeId}", get(active))
        .route("/history/{officeId}", get(history))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// POST /in, POST /out
// ---------------------------------------------------------------------------

async fn clock_in(
    State(service): State<ServiceState>,
    Json(req): Json<ClockRequest>,
) -> Result<Json<ClockEntry>, ServiceError> {
    Ok(Json(service.clock_in(&req.employee_id, &req.office_id)?))
}

async fn clock_out(
    State(service): State<ServiceState>,
    Json(req): Json<ClockRequest>,
) -> Result<Json<ClockEntry>, ServiceError> {
    Ok(Json(service.clock_out(&req.employee_id, &req.office_id)?))
}

// ---------------------------------------------------------------------------
// GET /active/:employeeId, GET /history/:officeId
// ---------------------------------------------------------------------------

async fn active(
    State(service): State<ServiceState>,
    Path(employee_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let entry = service.active_entry(&employee_id)?;
    Ok(Json(serde_json::json!({ "active": entry })))
}

async fn history(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<ClockEntry>>, ServiceError> {
    let all = service.history(&office_id)?;
    let total = all.len();
    let items = all
        .into_iter()
        .skip(params.offset)
        .take(params.limit)
        .collect();
    Ok(Json(ListResult { items, total }))
}
