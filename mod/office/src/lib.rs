//! Office module — multi-tenant offices, employees, roles, permissions.
//!
//! # Resources
//!
//! - **Office** — a tenant unit joined by a 6-character code
//! - **Employee** — a user's membership record within one office
//! - **Role** — a named capability bundle; `"all"` is a wildcard
//! - **Subscription** — the office's billing plan record
//!
//! # Usage
//!
//! ```ignore
//! use buziz_office::OfficeModule;
//!
//! let module = OfficeModule::new(kv);
//! let router = module.routes(); // Mount under /office
//! ```

pub mod api;
pub mod keys;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use buziz_core::Module;
use buziz_kv::KVStore;

use crate::service::OfficeService;

/// Office module implementing the Module trait.
pub struct OfficeModule {
    service: Arc<OfficeService>,
}

impl OfficeModule {
    /// Create a new OfficeModule over the given store.
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let service = Arc::new(OfficeService::new(kv));
        Self { service }
    }

    /// Get a reference to the underlying OfficeService.
    pub fn service(&self) -> &Arc<OfficeService> {
        &self.service
    }
}

impl Module for OfficeModule {
    fn name(&self) -> &str {
        "office"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
