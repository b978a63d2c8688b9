mod employees;
mod offices;
mod roles;

use std::sync::Arc;

use axum::Router;

use crate::service::OfficeService;

pub(crate) type ServiceState = Arc<OfficeService>;

pub fn router(service: Arc<OfficeService>) -> Router {
    Router::new()
        .merge(offices::router())
        .merge(employees::router())
        .merge(roles::router())
        .with_state(service)
}
