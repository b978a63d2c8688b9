use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use buziz_core::ServiceError;

use crate::api::ServiceState;
use crate::model::{
    CreateOfficeRequest, Employee, JoinOfficeRequest, Office, RenameOfficeRequest,
    SetCurrentOfficeRequest, Subscription,
};

pub(crate) fn router() -> Router<ServiceState> {
    Router::new()
        .route("/offices", post(create_office))
        .route("/offices/@join", post(join_office))
        .route("/offices/{id}", get(get_office))
        .route("/offices/{id}/@rename", post(rename_office))
        .route(
            "/offices/{id}/subscription",
            get(get_subscription).put(put_subscription),
        )
        .route("/users/{userId}/offices", get(user_offices))
        .route(
            "/users/{userId}/current-office",
            get(current_office).put(set_current_office),
        )
}

// ---------------------------------------------------------------------------
// POST /offices
// ---------------------------------------------------------------------------

async fn create_office(
    State(service): State<ServiceState>,
    Json(req): Json<CreateOfficeRequest>,
) -> Result<Json<Office>, ServiceError> {
    Ok(Json(service.create_office(req)?))
}

// ---------------------------------------------------------------------------
// POST /offices/@join
// ---------------------------------------------------------------------------

async fn join_office(
    State(service): State<ServiceState>,
    Json(req): Json<JoinOfficeRequest>,
) -> Result<Json<Employee>, ServiceError> {
    Ok(Json(service.join_office(req)?))
}

// ---------------------------------------------------------------------------
// GET /offices/:id
// ---------------------------------------------------------------------------

async fn get_office(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Office>, ServiceError> {
    Ok(Json(service.get_office(&id)?))
}

// ---------------------------------------------------------------------------
// POST /offices/:id/@rename
// ---------------------------------------------------------------------------

async fn rename_office(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(req): Json<RenameOfficeRequest>,
) -> Result<Json<Office>, ServiceError> {
    Ok(Json(service.rename_office(&id, &req.name)?))
}

// ---------------------------------------------------------------------------
// GET / PUT /offices/:id/subscription
// ---------------------------------------------------------------------------

async fn get_subscription(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>, ServiceError> {
    Ok(Json(service.subscription(&id)?))
}

async fn put_subscription(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(sub): Json<Subscription>,
) -> Result<Json<Subscription>, ServiceError> {
    Ok(Json(service.set_subscription(&id, sub)?))
}

// ---------------------------------------------------------------------------
// GET /users/:userId/offices
// ---------------------------------------------------------------------------

async fn user_offices(
    State(service): State<ServiceState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = service.user_offices(&user_id)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

// ---------------------------------------------------------------------------
// GET / PUT /users/:userId/current-office
// ---------------------------------------------------------------------------

async fn current_office(
    State(service): State<ServiceState>,
    Path(user_id): Path<String>,
) -> Result<Json<Option<Office>>, ServiceError> {
    Ok(Json(service.current_office(&user_id)?))
}

async fn set_current_office(
    State(service): State<ServiceState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetCurrentOfficeRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.set_current_office(&user_id, &req.office_id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
