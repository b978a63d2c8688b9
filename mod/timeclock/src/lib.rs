//! Timeclock module — clock-in/out with wage computation.
//!
//! Clock state is split across two keys: an append-only per-office
//! history (`office:{id}:clock-history:{entryId}`) and a single
//! active-clock slot per employee (`employee:{id}:active-clock`).
//! Clocking out fills in the hours worked and the wages earned from the
//! employee's pay rate.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use buziz_core::Module;
use buziz_kv::KVStore;

use crate::service::TimeclockService;

/// Timeclock module implementing the Module trait.
pub struct TimeclockModule {
    service: Arc<TimeclockService>,
}

impl TimeclockModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let service = Arc::new(TimeclockService::new(kv));
        Self { service }
    }

    pub fn service(&self) -> &Arc<TimeclockService> {
        &self.service
    }
}

impl Module for TimeclockModule {
    fn name(&self) -> &str {
        "timeclock"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
