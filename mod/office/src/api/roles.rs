use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use buziz_core::ServiceError;

use crate::api::ServiceState;
use crate::model::{CreateRoleRequest, Role};

pub(crate) fn router() -> Router<ServiceState> {
    Router::new()
        .route("/offices/{id}/roles", get(list_roles).post(create_role))
        .route(
            "/offices/{id}/roles/{roleId}",
            get(get_role).patch(update_role).delete(delete_role),
        )
}

// ---------------------------------------------------------------------------
// GET / POST /offices/:id/roles
// ---------------------------------------------------------------------------

async fn list_roles(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = service.list_roles(&office_id)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

async fn create_role(
    State(service): State<ServiceState>,
    Path(office_id): Path<String>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<Role>, ServiceError> {
    Ok(Json(service.create_role(&office_id, req)?))
}

// ---------------------------------------------------------------------------
// GET / PATCH / DELETE /offices/:id/roles/:roleId
// ---------------------------------------------------------------------------

async fn get_role(
    State(service): State<ServiceState>,
    Path((office_id, role_id)): Path<(String, String)>,
) -> Result<Json<Role>, ServiceError> {
    Ok(Json(service.get_role(&office_id, &role_id)?))
}

async fn update_role(
    State(service): State<ServiceState>,
    Path((office_id, role_id)): Path<(String, String)>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Role>, ServiceError> {
    Ok(Json(service.update_role(&office_id, &role_id, patch)?))
}

async fn delete_role(
    State(service): State<ServiceState>,
    Path((office_id, role_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_role(&office_id, &role_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
