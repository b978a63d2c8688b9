//! Route registration — module routes + system endpoints + data plane.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use buziz_kv::KVStore;

use crate::auth_middleware::{self, TokenState};

/// Build the complete router.
pub fn build_router(
    kv: Arc<dyn KVStore>,
    token: Arc<TokenState>,
    module_routes: Vec<(&str, Router)>,
) -> Router {
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router = Router::new()
        .merge(system_routes)
        .merge(crate::kv_api::router(kv));

    // Mount each module's routes under /{module_name}. Module routers
    // carry their own state already.
    for (name, router) in module_routes {
        app = app.nest(&format!("/{name}"), router);
    }

    app.layer(middleware::from_fn_with_state(
        token,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "buzizd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
