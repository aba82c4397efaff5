//! Per-key mutual exclusion for conflict resolution.
//!
//! Writers to the same [`FactKey`] serialize; writers to different keys never
//! contend. Lock entries are created on first use and kept for the lifetime
//! of the owning store.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::warn;

use crate::models::FactKey;

#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<FactKey, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// A lock poisoned by a panicking writer is recovered: the guarded data is
    /// `()`, and every store mutation is atomic on its own.
    pub fn with_key<T>(&self, key: &FactKey, f: impl FnOnce() -> T) -> T {
        // Clone the Arc out so the DashMap shard is not held while `f` runs.
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(key = %key, "key lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        f()
    }

    /// Number of keys that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
