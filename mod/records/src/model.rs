use serde::{Deserialize, Serialize};

/// A record in a generic per-office collection.
///
/// The envelope (id, version, timestamps) is ours; `data` is whatever the
/// client stored. `version` starts at 1 and increments on every replace,
/// so concurrent writers can detect that they lost a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,

    pub version: u64,

    pub created_at: String,

    pub updated_at: String,

    pub data: serde_json::Value,
}

/// Body for `PUT /data/{office}/{type}/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRecordRequest {
    /// Required when replacing an existing record; must match the stored
    /// version or the write is rejected.
    #[serde(default)]
    pub expected_version: Option<u64>,

    pub data: serde_json::Value,
}

/// Body for `PUT /data/{office}/{type}` (whole-collection replace).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllRequest {
    pub items: Vec<serde_json::Value>,
}
