//! Per-collection write serialization.
//!
//! Critical sections for the same key run one at a time, handed off to
//! waiters in arrival order; different keys never block each other. The
//! table is owned by the store instance that created it, so two stores
//! (e.g. in tests) never share lock queues.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{FairMutex, Mutex};

use crate::error::{Result, StoreError};

pub struct LockManager {
    /// key -> mutex. Entries are never removed; the set of collection keys
    /// is small and fixed for the life of the process.
    table: Mutex<HashMap<String, Arc<FairMutex<()>>>>,
    timeout: Option<Duration>,
}

impl LockManager {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn entry(&self, key: &str) -> Arc<FairMutex<()>> {
        let mut table = self.table.lock();
        table
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(FairMutex::new(())))
            .clone()
    }

    /// Run `f` with the key's mutex held.
    ///
    /// Fair unlocking hands the mutex to the longest-waiting caller, so
    /// same-key sections execute in submission order. Returns
    /// [`StoreError::LockTimeout`] if the configured wait expires.
    pub fn with_lock<T, F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mutex = self.entry(key);
        let _guard = match self.timeout {
            Some(timeout) => mutex
                .try_lock_for(timeout)
                .ok_or_else(|| StoreError::LockTimeout(key.to_string()))?,
            None => mutex.lock(),
        };
        f()
    }
}
