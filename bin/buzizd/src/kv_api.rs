//! `/kv` data plane — raw key-value access for remote clients.
//!
//! The wire format (base64 values, batch envelope) is defined next to
//! `RemoteStore` in buziz-kv so both sides stay in sync.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use buziz_kv::KVStore;
use buziz_kv::remote::{BatchRequest, KeyValueBody, ScanEntry, ScanResponse};

type KvState = Arc<dyn KVStore>;

pub fn router(kv: KvState) -> Router {
    Router::new()
        .route("/kv", get(scan))
        .route("/kv/@batch", post(batch))
        .route("/kv/{key}", get(get_key).put(put_key).delete(delete_key))
        .with_state(kv)
}

fn storage_error(e: impl std::fmt::Display) -> Response {
    let body = serde_json::json!({ "code": "STORAGE", "message": e.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn bad_request(msg: &str) -> Response {
    let body = serde_json::json!({ "code": "VALIDATION", "message": msg });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// GET / PUT / DELETE /kv/:key
// ---------------------------------------------------------------------------

async fn get_key(State(kv): State<KvState>, Path(key): Path<String>) -> Response {
    match kv.get(&key) {
        Ok(Some(bytes)) => Json(KeyValueBody {
            value: B64.encode(&bytes),
        })
        .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => storage_error(e),
    }
}

async fn put_key(
    State(kv): State<KvState>,
    Path(key): Path<String>,
    Json(body): Json<KeyValueBody>,
) -> Response {
    let bytes = match B64.decode(&body.value) {
        Ok(b) => b,
        Err(_) => return bad_request("value is not valid base64"),
    };
    match kv.set(&key, &bytes) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error(e),
    }
}

async fn delete_key(State(kv): State<KvState>, Path(key): Path<String>) -> Response {
    match kv.delete(&key) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error(e),
    }
}

// ---------------------------------------------------------------------------
// POST /kv/@batch
// ---------------------------------------------------------------------------

async fn batch(State(kv): State<KvState>, Json(req): Json<BatchRequest>) -> Response {
    let mut decoded = Vec::with_capacity(req.set.len());
    for entry in &req.set {
        match B64.decode(&entry.value) {
            Ok(bytes) => decoded.push((entry.key.as_str(), bytes)),
            Err(_) => return bad_request("value is not valid base64"),
        }
    }
    let pairs: Vec<(&str, &[u8])> = decoded.iter().map(|(k, v)| (*k, v.as_slice())).collect();

    if !pairs.is_empty() {
        if let Err(e) = kv.batch_set(&pairs) {
            return storage_error(e);
        }
    }

    let keys: Vec<&str> = req.delete.iter().map(String::as_str).collect();
    if !keys.is_empty() {
        if let Err(e) = kv.batch_delete(&keys) {
            return storage_error(e);
        }
    }

    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// GET /kv?prefix=
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScanQuery {
    #[serde(default)]
    prefix: String,
}

async fn scan(State(kv): State<KvState>, Query(query): Query<ScanQuery>) -> Response {
    match kv.scan(&query.prefix) {
        Ok(entries) => {
            let items = entries
                .into_iter()
                .map(|(key, value)| ScanEntry {
                    key,
                    value: B64.encode(&value),
                })
                .collect();
            Json(ScanResponse { items }).into_response()
        }
        Err(e) => storage_error(e),
    }
}
