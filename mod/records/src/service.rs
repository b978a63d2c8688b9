use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use buziz_core::{ServiceError, new_id, now_rfc3339};
use buziz_kv::{KVError, KVStore};

use crate::model::Record;
use crate::watch::WatchSet;

/// Collection names owned by other modules. Writing through the generic
/// data plane would bypass their invariants.
const RESERVED_TYPES: &[&str] = &[
    "employees",
    "roles",
    "subscription",
    "clock-history",
    "shifts",
    "recurring",
];

const MAX_WATCH_SECS: u64 = 120;

fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

fn record_key(office_id: &str, data_type: &str, record_id: &str) -> String {
    format!("office:{office_id}:{data_type}:{record_id}")
}

fn collection_prefix(office_id: &str, data_type: &str) -> String {
    format!("office:{office_id}:{data_type}:")
}

pub struct RecordsService {
    kv: Arc<dyn KVStore>,
    watches: WatchSet,
}

impl RecordsService {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            watches: WatchSet::new(),
        }
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Full collection, ordered by key. A never-written pair is an empty
    /// list, not an error.
    pub fn list(&self, office_id: &str, data_type: &str) -> Result<Vec<Record>, ServiceError> {
        validate_data_type(data_type)?;
        let entries = self
            .kv
            .scan(&collection_prefix(office_id, data_type))
            .map_err(kv_err)?;
        entries
            .iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))
            })
            .collect()
    }

    pub fn get(
        &self,
        office_id: &str,
        data_type: &str,
        record_id: &str,
    ) -> Result<Record, ServiceError> {
        validate_data_type(data_type)?;
        self.load(office_id, data_type, record_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("record {record_id}")))
    }

    /// Create (version 1) or replace a record. Replacing requires the
    /// caller's `expected_version` to match the stored one; a mismatch
    /// means another writer got there first.
    pub fn put(
        &self,
        office_id: &str,
        data_type: &str,
        record_id: &str,
        expected_version: Option<u64>,
        data: serde_json::Value,
    ) -> Result<Record, ServiceError> {
        validate_data_type(data_type)?;
        let now = now_rfc3339();

        let record = match self.load(office_id, data_type, record_id)? {
            None => {
                if let Some(v) = expected_version {
                    return Err(ServiceError::Conflict(format!(
                        "record {record_id} no longer exists (expected version {v})"
                    )));
                }
                Record {
                    id: record_id.to_string(),
                    version: 1,
                    created_at: now.clone(),
                    updated_at: now,
                    data,
                }
            }
            Some(existing) => {
                let expected = expected_version.ok_or_else(|| {
                    ServiceError::Validation(
                        "expectedVersion is required when replacing an existing record".into(),
                    )
                })?;
                if expected != existing.version {
                    return Err(ServiceError::Conflict(format!(
                        "version mismatch on record {record_id}: expected {expected}, found {}",
                        existing.version
                    )));
                }
                Record {
                    version: existing.version + 1,
                    updated_at: now,
                    data,
                    ..existing
                }
            }
        };

        let bytes =
            serde_json::to_vec(&record).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv
            .set(&record_key(office_id, data_type, record_id), &bytes)
            .map_err(kv_err)?;
        self.watches.handle(office_id, data_type).bump();
        Ok(record)
    }

    pub fn delete(
        &self,
        office_id: &str,
        data_type: &str,
        record_id: &str,
    ) -> Result<(), ServiceError> {
        validate_data_type(data_type)?;
        if self.load(office_id, data_type, record_id)?.is_none() {
            return Err(ServiceError::NotFound(format!("record {record_id}")));
        }
        self.kv
            .delete(&record_key(office_id, data_type, record_id))
            .map_err(kv_err)?;
        self.watches.handle(office_id, data_type).bump();
        Ok(())
    }

    /// Replace the whole collection in one batch: delete everything
    /// stored, write the new items with fresh version-1 envelopes. Items
    /// carrying an `"id"` string keep it; the rest get generated ids.
    pub fn replace_all(
        &self,
        office_id: &str,
        data_type: &str,
        items: Vec<serde_json::Value>,
    ) -> Result<Vec<Record>, ServiceError> {
        validate_data_type(data_type)?;
        let now = now_rfc3339();

        let records: Vec<Record> = items
            .into_iter()
            .map(|data| {
                let id = data
                    .get("id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(new_id);
                Record {
                    id,
                    version: 1,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                    data,
                }
            })
            .collect();

        let old_keys: Vec<String> = self
            .kv
            .scan(&collection_prefix(office_id, data_type))
            .map_err(kv_err)?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        let old_refs: Vec<&str> = old_keys.iter().map(String::as_str).collect();
        self.kv.batch_delete(&old_refs).map_err(kv_err)?;

        let encoded: Vec<(String, Vec<u8>)> = records
            .iter()
            .map(|r| {
                let bytes =
                    serde_json::to_vec(r).map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok((record_key(office_id, data_type, &r.id), bytes))
            })
            .collect::<Result<_, ServiceError>>()?;
        let pairs: Vec<(&str, &[u8])> = encoded
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        self.kv.batch_set(&pairs).map_err(kv_err)?;

        info!(
            "replaced collection {data_type} in office {office_id}: {} items",
            records.len()
        );
        self.watches.handle(office_id, data_type).bump();
        Ok(records)
    }

    // -----------------------------------------------------------------------
    // Long-poll watch
    // -----------------------------------------------------------------------

    /// Wait up to `timeout_secs` for the collection's revision to move
    /// past `since` (or to move at all when `since` is absent), then
    /// return the current revision and contents.
    pub async fn watch(
        &self,
        office_id: &str,
        data_type: &str,
        since: Option<u64>,
        timeout_secs: u64,
    ) -> Result<(u64, Vec<Record>), ServiceError> {
        validate_data_type(data_type)?;
        let watch = self.watches.handle(office_id, data_type);

        // Register the waiter before reading the revision so a bump in
        // between is not lost: notify_waiters() only wakes futures that
        // already exist.
        let notified = watch.notified();
        let revision = watch.revision();

        if since.is_some_and(|since| revision != since) {
            return Ok((revision, self.list(office_id, data_type)?));
        }

        let timeout = Duration::from_secs(timeout_secs.min(MAX_WATCH_SECS));
        // Woken or timed out, either way return the current state.
        let _ = tokio::time::timeout(timeout, notified).await;
        Ok((watch.revision(), self.list(office_id, data_type)?))
    }
}

fn validate_data_type(data_type: &str) -> Result<(), ServiceError> {
    if data_type.is_empty()
        || !data_type
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ServiceError::Validation(format!(
            "invalid data type {data_type:?}: lowercase letters, digits, and hyphens only"
        )));
    }
    if RESERVED_TYPES.contains(&data_type) {
        return Err(ServiceError::Validation(format!(
            "data type {data_type:?} is reserved"
        )));
    }
    Ok(())
}

impl RecordsService {
    fn load(
        &self,
        office_id: &str,
        data_type: &str,
        record_id: &str,
    ) -> Result<Option<Record>, ServiceError> {
        match self
            .kv
            .get(&record_key(office_id, data_type, record_id))
            .map_err(kv_err)?
        {
            Some(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record: {e}")))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
