use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::error::KVError;
use crate::traits::KVStore;

/// FallbackStore is a two-backend KV store:
///
/// - **Primary** (usually remote): preferred while reachable.
/// - **Fallback** (local persistence): takes over permanently after the
///   first primary failure.
///
/// The degrade is one-way and sticky for the life of the value: `connect`
/// pings the primary once at startup, and any later primary error flips
/// the `degraded` flag and retries the same call against the fallback.
/// There is no recovery path back to the primary without constructing a
/// new store. Fallback-side errors propagate as-is.
///
/// Callers see identically-shaped data regardless of which backend served
/// a call; which one did is an implementation detail surfaced only through
/// logs and [`FallbackStore::is_degraded`].
pub struct FallbackStore<P: KVStore, F: KVStore> {
    primary: P,
    fallback: F,
    degraded: AtomicBool,
}

impl<P: KVStore, F: KVStore> FallbackStore<P, F> {
    /// Build the store, probing the primary once.
    ///
    /// If the reachability check fails the store starts degraded and the
    /// primary is never consulted again.
    pub fn connect(primary: P, fallback: F) -> Self {
        let degraded = match primary.ping() {
            Ok(()) => false,
            Err(e) => {
                warn!("primary store unreachable, starting on fallback: {e}");
                true
            }
        };
        if !degraded {
            info!("primary store reachable");
        }
        Self {
            primary,
            fallback,
            degraded: AtomicBool::new(degraded),
        }
    }

    /// Whether the store has switched to the fallback backend.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn degrade(&self, op: &str, err: &KVError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!("primary store failed during {op}, degrading to fallback for the rest of the session: {err}");
        }
    }

    /// Run `op` against the primary unless degraded; on primary failure,
    /// flip the sticky flag and retry the same call against the fallback.
    fn dispatch<T>(
        &self,
        name: &str,
        op: impl Fn(&dyn KVStore) -> Result<T, KVError>,
    ) -> Result<T, KVError> {
        if !self.is_degraded() {
            match op(&self.primary) {
                Ok(v) => return Ok(v),
                Err(e) => self.degrade(name, &e),
            }
        }
        op(&self.fallback)
    }
}

impl<P: KVStore, F: KVStore> KVStore for FallbackStore<P, F> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        self.dispatch("get", |s| s.get(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.dispatch("set", |s| s.set(key, value))
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.dispatch("delete", |s| s.delete(key))
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        self.dispatch("batch_set", |s| s.batch_set(entries))
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        self.dispatch("batch_delete", |s| s.batch_delete(keys))
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        self.dispatch("scan", |s| s.scan(prefix))
    }

    fn ping(&self) -> Result<(), KVError> {
        if self.is_degraded() {
            self.fallback.ping()
        } else {
            self.primary.ping()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::memory::MemoryStore;

    /// Test double: delegates to a MemoryStore until `fail_after` calls
    /// have happened, then errors forever.
    struct FlakyStore {
        inner: MemoryStore,
        calls: AtomicUsize,
        fail_after: usize,
    }

    impl FlakyStore {
        fn new(fail_after: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                calls: AtomicUsize::new(0),
                fail_after,
            }
        }

        fn tick(&self) -> Result<(), KVError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.fail_after {
                Err(KVError::Remote("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    impl KVStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
            self.tick()?;
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
            self.tick()?;
            self.inner.set(key, value)
        }
        fn delete(&self, key: &str) -> Result<(), KVError> {
            self.tick()?;
            self.inner.delete(key)
        }
        fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
            self.tick()?;
            self.inner.batch_set(entries)
        }
        fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
            self.tick()?;
            self.inner.batch_delete(keys)
        }
        fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
            self.tick()?;
            self.inner.scan(prefix)
        }
        fn ping(&self) -> Result<(), KVError> {
            self.tick()
        }
    }

    #[test]
    fn healthy_primary_serves_all_calls() {
        let store = FallbackStore::connect(FlakyStore::new(usize::MAX), MemoryStore::new());
        assert!(!store.is_degraded());

        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"v");
        assert!(!store.is_degraded());
    }

    #[test]
    fn unreachable_primary_starts_degraded() {
        // fail_after = 0: the startup ping itself fails.
        let store = FallbackStore::connect(FlakyStore::new(0), MemoryStore::new());
        assert!(store.is_degraded());

        // Calls succeed anyway, served by the fallback.
        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"v");
    }

    #[test]
    fn midsession_failure_retries_once_and_sticks() {
        // Ping + 2 calls succeed, then the primary dies.
        let store = FallbackStore::connect(FlakyStore::new(3), MemoryStore::new());
        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();
        assert!(!store.is_degraded());

        // This call fails on the primary and is retried on the fallback.
        store.set("c", b"3").unwrap();
        assert!(store.is_degraded());

        // Every subsequent call in the session is served locally;
        // the flag never resets.
        assert_eq!(store.get("c").unwrap().unwrap(), b"3");
        store.set("d", b"4").unwrap();
        assert_eq!(store.scan("").unwrap().len(), 2); // c and d, fallback only
        assert!(store.is_degraded());
    }

    #[test]
    fn fallback_errors_propagate() {
        // Degraded from the start, and the fallback itself is broken.
        let store = FallbackStore::connect(FlakyStore::new(0), FlakyStore::new(0));
        assert!(store.is_degraded());
        assert!(store.get("k").is_err());
    }
}
