use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

/// Change-notification handle for one `(office, data_type)` collection.
///
/// Every mutation bumps the revision and wakes the waiters. Watchers
/// register the `Notified` future before reading the revision, so a bump
/// that lands between the read and the await is never lost.
pub struct CollectionWatch {
    revision: AtomicU64,
    notify: Notify,
}

impl CollectionWatch {
    fn new() -> Self {
        Self {
            revision: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn bump(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        self.notify.notify_waiters();
    }

    pub fn notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.notify.notified()
    }
}

/// Lazily-created watch handles, one per collection.
#[derive(Default)]
pub struct WatchSet {
    inner: Mutex<HashMap<String, Arc<CollectionWatch>>>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, office_id: &str, data_type: &str) -> Arc<CollectionWatch> {
        let key = format!("{office_id}/{data_type}");
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(key).or_insert_with(|| Arc::new(CollectionWatch::new())))
    }
}
