//! Per-collection write locks
//!
//! One mutex per collection name, created on first reference and kept for
//! the registry's lifetime. The registry's own lock is held only for the
//! lookup-or-insert, never while a caller holds a collection lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::{StoreError, StoreResult};

/// Lock guarding writers of a single collection
pub type CollectionLock = Arc<Mutex<()>>;

#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `collection`, creating it on first use.
    ///
    /// Every call with the same name returns the same `Arc`.
    pub fn lock_for(&self, collection: &str) -> StoreResult<CollectionLock> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Internal("lock registry poisoned".into()))?;

        if let Some(lock) = locks.get(collection) {
            return Ok(Arc::clone(lock));
        }

        let lock = CollectionLock::default();
        locks.insert(collection.to_string(), Arc::clone(&lock));
        Ok(lock)
    }

    /// Number of collections that have been locked so far
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
