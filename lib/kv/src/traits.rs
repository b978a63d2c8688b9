use crate::error::KVError;

/// KVStore provides the key-value storage interface every backend implements.
///
/// Keys follow a namespaced convention: `office:{officeId}:employees:{id}`,
/// `employee:{employeeId}:active-clock`, `office-code:{CODE}`, etc. Values
/// are JSON documents. Domain services are written against this trait so
/// they behave identically whether the backing store is the embedded
/// database, an in-memory map, or a remote endpoint.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any existing value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Set several key-value pairs in one write.
    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError>;

    /// Delete several keys in one write.
    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Idempotent, side-effect-free reachability check.
    ///
    /// Local backends are always reachable; the remote backend probes its
    /// endpoint. Used by the fallback store's startup health check.
    fn ping(&self) -> Result<(), KVError> {
        Ok(())
    }
}
