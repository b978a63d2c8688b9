use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage(e: impl Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// RedbStore is a KVStore implementation backed by redb — a pure-Rust
/// embedded key-value database. This is the local persistence layer: the
/// daemon's primary store, and the CLI's offline fallback.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage)?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.batch_set(&[(key, value)])
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.batch_delete(&[key])
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            for (key, value) in entries {
                table.insert(*key, *value).map_err(storage)?;
            }
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            for key in keys {
                table.remove(*key).map_err(storage)?;
            }
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage)?;

        for entry in iter {
            let entry = entry.map_err(storage)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (RedbStore, tempfile::NamedTempFile) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        (RedbStore::open(tmp.path()).unwrap(), tmp)
    }

    #[test]
    fn set_get_delete() {
        let (store, _tmp) = test_store();
        assert_eq!(store.get("office:abc").unwrap(), None);

        store.set("office:abc", b"{\"name\":\"HQ\"}").unwrap();
        assert_eq!(store.get("office:abc").unwrap().unwrap(), b"{\"name\":\"HQ\"}");

        store.delete("office:abc").unwrap();
        assert_eq!(store.get("office:abc").unwrap(), None);
    }

    #[test]
    fn delete_absent_key_is_ok() {
        let (store, _tmp) = test_store();
        store.delete("never-written").unwrap();
    }

    #[test]
    fn scan_by_prefix_sorted() {
        let (store, _tmp) = test_store();
        store.set("office:a:employees:2", b"two").unwrap();
        store.set("office:a:employees:1", b"one").unwrap();
        store.set("office:b:employees:1", b"other").unwrap();
        store.set("office:a:roles:1", b"role").unwrap();

        let results = store.scan("office:a:employees:").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "office:a:employees:1");
        assert_eq!(results[1].0, "office:a:employees:2");
    }

    #[test]
    fn batch_ops() {
        let (store, _tmp) = test_store();
        store
            .batch_set(&[("k:1", b"a".as_slice()), ("k:2", b"b".as_slice())])
            .unwrap();
        assert_eq!(store.scan("k:").unwrap().len(), 2);

        store.batch_delete(&["k:1", "k:2"]).unwrap();
        assert!(store.scan("k:").unwrap().is_empty());
    }

    #[test]
    fn ping_always_ok() {
        let (store, _tmp) = test_store();
        store.ping().unwrap();
    }
}
