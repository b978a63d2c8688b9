mod employee;
mod office;
mod role;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use buziz_core::ServiceError;
use buziz_kv::{KVError, KVStore};

/// Service layer for offices, employees, roles, and subscriptions.
///
/// All state lives in the KV store as JSON documents; the operations are
/// split across `service/office.rs`, `service/employee.rs`, and
/// `service/role.rs`.
pub struct OfficeService {
    pub(crate) kv: Arc<dyn KVStore>,
}

impl OfficeService {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    // -----------------------------------------------------------------------
    // JSON record helpers
    // -----------------------------------------------------------------------

    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, ServiceError> {
        match self.kv.get(key).map_err(kv_err)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv.set(key, &bytes).map_err(kv_err)
    }

    /// Scan a prefix and deserialize every value.
    pub(crate) fn scan_json<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, ServiceError> {
        let entries = self.kv.scan(prefix).map_err(kv_err)?;
        entries
            .iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))
            })
            .collect()
    }
}

pub(crate) fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}
