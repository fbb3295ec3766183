//! Per-workload-name serialization
//!
//! Two requests for the same name in the same namespace run one after the
//! other; different names proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct NameLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one provisioning request
pub struct NameGuard {
    _guard: OwnedMutexGuard<()>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request holds `key`
    pub async fn acquire(&self, key: &str) -> NameGuard {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries nobody is holding or waiting on
            entries.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        NameGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of names currently tracked
    pub fn tracked(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
