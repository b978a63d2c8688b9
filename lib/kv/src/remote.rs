use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::error::KVError;
use crate::traits::KVStore;

// ---------------------------------------------------------------------------
// Wire types — shared with the daemon's /kv data plane
// ---------------------------------------------------------------------------

/// Body for `GET/PUT /kv/{key}`. Values travel base64-encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyValueBody {
    pub value: String,
}

/// One entry in a scan response or batch-set request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanEntry {
    pub key: String,
    pub value: String,
}

/// Response for `GET /kv?prefix=`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub items: Vec<ScanEntry>,
}

/// Body for `POST /kv/@batch`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub set: Vec<ScanEntry>,
    #[serde(default)]
    pub delete: Vec<String>,
}

fn remote(e: impl std::fmt::Display) -> KVError {
    KVError::Remote(e.to_string())
}

// ---------------------------------------------------------------------------
// RemoteStore
// ---------------------------------------------------------------------------

/// RemoteStore is a KVStore over a buzizd `/kv` data plane.
///
/// Every operation is a blocking HTTP call with a bearer token. Any
/// transport failure or non-2xx status maps to `KVError::Remote`, which is
/// what the fallback store watches for. Intended for synchronous callers
/// (the CLI); the daemon itself always runs on a local store.
pub struct RemoteStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RemoteStore {
    /// Build a client for the given server URL, with an optional bearer token.
    pub fn new(server: &str, token: &str) -> Result<Self, KVError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if !token.is_empty() {
            let val = format!("Bearer {token}");
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&val).map_err(remote)?,
            );
        }

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(remote)?;

        Ok(Self {
            client,
            base_url: server.trim_end_matches('/').to_string(),
        })
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/kv/{}", self.base_url, key)
    }

    fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, KVError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(KVError::Remote(format!(
                "{} {}",
                resp.status(),
                resp.url()
            )))
        }
    }
}

impl KVStore for RemoteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let resp = self.client.get(self.key_url(key)).send().map_err(remote)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: KeyValueBody = Self::check(resp)?.json().map_err(remote)?;
        let bytes = B64
            .decode(&body.value)
            .map_err(|e| KVError::Serialization(e.to_string()))?;
        Ok(Some(bytes))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let body = KeyValueBody {
            value: B64.encode(value),
        };
        let resp = self
            .client
            .put(self.key_url(key))
            .json(&body)
            .send()
            .map_err(remote)?;
        Self::check(resp)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let resp = self
            .client
            .delete(self.key_url(key))
            .send()
            .map_err(remote)?;
        Self::check(resp)?;
        Ok(())
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let body = BatchRequest {
            set: entries
                .iter()
                .map(|(k, v)| ScanEntry {
                    key: k.to_string(),
                    value: B64.encode(v),
                })
                .collect(),
            delete: Vec::new(),
        };
        let resp = self
            .client
            .post(format!("{}/kv/@batch", self.base_url))
            .json(&body)
            .send()
            .map_err(remote)?;
        Self::check(resp)?;
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let body = BatchRequest {
            set: Vec::new(),
            delete: keys.iter().map(|k| k.to_string()).collect(),
        };
        let resp = self
            .client
            .post(format!("{}/kv/@batch", self.base_url))
            .json(&body)
            .send()
            .map_err(remote)?;
        Self::check(resp)?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let resp = self
            .client
            .get(format!("{}/kv", self.base_url))
            .query(&[("prefix", prefix)])
            .send()
            .map_err(remote)?;
        let body: ScanResponse = Self::check(resp)?.json().map_err(remote)?;

        let mut results = Vec::with_capacity(body.items.len());
        for entry in body.items {
            let bytes = B64
                .decode(&entry.value)
                .map_err(|e| KVError::Serialization(e.to_string()))?;
            results.push((entry.key, bytes));
        }
        Ok(results)
    }

    /// Probe `GET /health` — idempotent and side-effect-free.
    fn ping(&self) -> Result<(), KVError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .map_err(remote)?;
        Self::check(resp)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_url_keeps_namespaced_keys() {
        let store = RemoteStore::new("http://localhost:8080/", "").unwrap();
        assert_eq!(
            store.key_url("office:abc:employees:1"),
            "http://localhost:8080/kv/office:abc:employees:1"
        );
    }

    #[test]
    fn batch_request_roundtrip() {
        let req = BatchRequest {
            set: vec![ScanEntry {
                key: "k".into(),
                value: B64.encode(b"v"),
            }],
            delete: vec!["old".into()],
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: BatchRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.set.len(), 1);
        assert_eq!(back.delete, vec!["old".to_string()]);
        assert_eq!(B64.decode(&back.set[0].value).unwrap(), b"v");
    }

    #[test]
    fn unreachable_server_is_remote_error() {
        // Port 9 (discard) is not listening; the probe must fail fast
        // with a Remote error rather than panicking.
        let store = RemoteStore::new("http://127.0.0.1:9", "").unwrap();
        match store.ping() {
            Err(KVError::Remote(_)) => {}
            other => panic!("expected Remote error, got {other:?}"),
        }
    }
}
