use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use buziz_core::{ListParams, ListResult, ServiceError};

use crate::api::ServiceState;
use crate::model::{Employee, PermissionCheckQuery};

pub(crate) fn router() -> Router<ServiceState> {
    Router::new()
        .route("/offices/{id}/employees", get(list_employees))
        .route(
            "/offices/{id}/employees/{employeeId}",
            get(get_employee).patch(update_employee).delete(remove_employee),
        )
        .route(
            "/offices/{id}/employees/{employeeId}/permissions/@check",
            get(check_permission),
        )
}

// ---------------------------------------------------------------------------
// GET /offices/:id/employees
// ---------------------------------------------------------------------------

async fn list_employees(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Employee>>, ServiceError> {
    let all = service.list_employees(&office_id)?;
    let total = all.len();
    let items = all
        .into_iter()
        .skip(params.offset)
        .take(params.limit)
        .collect();
    Ok(Json(ListResult { items, total }))
}

// ---------------------------------------------------------------------------
// GET /offices/:id/employees/:employeeId
// ---------------------------------------------------------------------------

async fn get_employee(
    State(service): State<ServiceState>,
    Path((office_id, employee_id)): Path<(String, String)>,
) -> Result<Json<Employee>, ServiceError> {
    Ok(Json(service.get_employee(&office_id, &employee_id)?))
}

// ---------------------------------------------------------------------------
// PATCH /offices/:id/employees/:employeeId — JSON merge-patch
// ---------------------------------------------------------------------------

async fn update_employee(
    State(service): State<ServiceState>,
    Path((office_id, employee_id)): Path<(String, String)>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Employee>, ServiceError> {
    Ok(Json(service.update_employee(&office_id, &employee_id, patch)?))
}

// ---------------------------------------------------------------------------
// DELETE /offices/:id/employees/:employeeId
// ---------------------------------------------------------------------------

async fn remove_employee(
    State(service): State<ServiceState>,
    Path((office_id, employee_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.remove_employee(&office_id, &employee_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// GET /offices/:id/employees/:employeeId/permissions/@check
// ---------------------------------------------------------------------------

async fn check_permission(
    State(service): State<ServiceState>,
    Path((office_id, employee_id)): Path<(String, String)>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let allowed = service.has_permission(&office_id, &employee_id, &query.capability)?;
    Ok(Json(serde_json::json!({
        "capability": query.capability,
        "allowed": allowed,
    })))
}
