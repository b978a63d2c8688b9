//! Generic per-office record collections.
//!
//! Any collection name not claimed by another module maps to keys under
//! `office:{id}:{dataType}:`. Records carry a version for optimistic
//! concurrency, and every collection has a long-poll watch endpoint
//! backed by an in-process revision counter.

pub mod api;
pub mod model;
pub mod service;
pub mod watch;

use std::sync::Arc;

use axum::Router;

use buziz_core::Module;
use buziz_kv::KVStore;

use crate::service::RecordsService;

/// Records module implementing the Module trait.
pub struct RecordsModule {
    service: Arc<RecordsService>,
}

impl RecordsModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let service = Arc::new(RecordsService::new(kv));
        Self { service }
    }

    pub fn service(&self) -> &Arc<RecordsService> {
        &self.service
    }
}

impl Module for RecordsModule {
    fn name(&self) -> &str {
        "data"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
