//! Shift scheduling — calendar shifts plus recurring patterns.
//!
//! Patterns are expanded into concrete shifts over a 90-day forward
//! horizon, at pattern creation, on demand, and periodically by a
//! background worker. Expansion never duplicates a (date, pattern)
//! pair, so re-running it is safe.

pub mod api;
pub mod expand;
pub mod model;
pub mod service;
pub mod worker;

use std::sync::Arc;

use axum::Router;

use buziz_core::Module;
use buziz_kv::KVStore;

use crate::service::ScheduleService;

/// Schedule module implementing the Module trait.
pub struct ScheduleModule {
    service: Arc<ScheduleService>,
}

impl ScheduleModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let service = Arc::new(ScheduleService::new(kv));
        Self { service }
    }

    pub fn service(&self) -> &Arc<ScheduleService> {
        &self.service
    }
}

impl Module for ScheduleModule {
    fn name(&self) -> &str {
        "schedule"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
