use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use buziz_core::{ListParams, ListResult, ServiceError};

use crate::model::{PutRecordRequest, Record, ReplaceAllRequest};
use crate::service::RecordsService;

type ServiceState = Arc<RecordsService>;

pub fn router(service: ServiceState) -> Router {
    Router::new()
        .route(
            "/{officeId}/{dataType}",
            get(list_records).put(replace_all),
        )
        .route("/{officeId}/{dataType}/@watch", get(watch))
        .route(
            "/{officeId}/{dataType}/{recordId}",
            get(get_record).put(put_record).delete(delete_record),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// GET / PUT /:officeId/:dataType
// ---------------------------------------------------------------------------

async fn list_records(
    State(service): State<ServiceState>,
    Path((office_id, data_type)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Record>>, ServiceError> {
    let all = service.list(&office_id, &data_type)?;
    let total = all.len();
    let items = all
        .into_iter()
        .skip(params.offset)
        .take(params.limit)
        .collect();
    Ok(Json(ListResult { items, total }))
}

async fn replace_all(
    State(service): State<ServiceState>,
    Path((office_id, data_type)): Path<(String, String)>,
    Json(req): Json<ReplaceAllRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = service.replace_all(&office_id, &data_type, req.items)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

// ---------------------------------------------------------------------------
// GET /:officeId/:dataType/@watch
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WatchQuery {
    #[serde(default)]
    since: Option<u64>,
    #[serde(default = "default_watch_timeout")]
    timeout: u64,
}

fn default_watch_timeout() -> u64 {
    30
}

async fn watch(
    State(service): State<ServiceState>,
    Path((office_id, data_type)): Path<(String, String)>,
    Query(query): Query<WatchQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (revision, items) = service
        .watch(&office_id, &data_type, query.since, query.timeout)
        .await?;
    Ok(Json(serde_json::json!({
        "revision": revision,
        "items": items,
        "total": items.len(),
    })))
}

// ---------------------------------------------------------------------------
// GET / PUT / DELETE /:officeId/:dataType/:recordId
// ---------------------------------------------------------------------------

async fn get_record(
    State(service): State<ServiceState>,
    Path((office_id, data_type, record_id)): Path<(String, String, String)>,
) -> Result<Json<Record>, ServiceError> {
    Ok(Json(service.get(&office_id, &data_type, &record_id)?))
}

async fn put_record(
    State(service): State<ServiceState>,
    Path((office_id, data_type, record_id)): Path<(String, String, String)>,
    Json(req): Json<PutRecordRequest>,
) -> Result<Json<Record>, ServiceError> {
    Ok(Json(service.put(
        &office_id,
        &data_type,
        &record_id,
        req.expected_version,
        req.data,
    )?))
}

async fn delete_record(
    State(service): State<ServiceState>,
    Path((office_id, data_type, record_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete(&office_id, &data_type, &record_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
