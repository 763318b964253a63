//! Memoizing layer in front of the catalog.
//!
//! A [`QueryCache`] maps the exact text of a catalog command to the rows the
//! catalog answered with. A key is computed at most once for the lifetime of
//! the backing store: the store lock is held across the lookup, the remote call
//! and the write, so two callers can never race on the same miss and a
//! [`QueryCache::rebind`] waits for in-flight calls to land in the old store.
//! Failed computations are never stored, so the next call with the same key
//! goes to the catalog again.
//!
//! There is no expiry. Stale entries stay until `clear` is called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::catalog::Rows;
use crate::error::Result;
use crate::persist::{CachedQuery, PersistenceMode, Persistor};

/// Counters for the current backing store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub failures: usize,
}

pub struct QueryCache {
    persistor: Mutex<Persistor>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    failures: AtomicUsize,
}

impl QueryCache {
    pub fn new(mode: PersistenceMode) -> Result<Self> {
        Ok(Self::with_persistor(Persistor::new(mode)?))
    }
    pub fn in_memory() -> Result<Self> {
        Self::new(PersistenceMode::InMemory)
    }
    pub fn with_persistor(persistor: Persistor) -> Self {
        Self {
            persistor: Mutex::new(persistor),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }
    // A panic inside `compute` poisons the lock before anything is stored,
    // so the store itself is still consistent.
    fn store(&self) -> MutexGuard<'_, Persistor> {
        self.persistor.lock().unwrap_or_else(|poisoned| {
            warn!("query cache lock was poisoned by a panicking computation, recovering");
            self.persistor.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Rows>
    where
        F: FnOnce() -> Result<Rows>,
    {
        let persistor = self.store();
        if let Some(rows) = persistor.lookup(key)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(rows = rows.len(), "query cache hit");
            return Ok(rows);
        }
        let rows = compute().inspect_err(|_| {
            self.failures.fetch_add(1, Ordering::Relaxed);
        })?;
        persistor.store(key, &rows)?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(rows = rows.len(), "query cache miss stored");
        Ok(rows)
    }
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store().lookup(key)?.is_some())
    }
    /// Drops every entry, returning how many there were.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.store().clear()?;
        info!(removed, "query cache cleared");
        Ok(removed)
    }
    /// Swaps in a new backing store and resets the counters, returning the
    /// mode of the store that was replaced.
    pub fn rebind(&self, mode: PersistenceMode) -> Result<PersistenceMode> {
        let replacement = Persistor::new(mode)?;
        let mut persistor = self.store();
        let previous = std::mem::replace(&mut *persistor, replacement);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        info!(from = ?previous.mode(), to = ?persistor.mode(), "query cache rebound");
        Ok(previous.mode().clone())
    }
    pub fn mode(&self) -> Result<PersistenceMode> {
        Ok(self.store().mode().clone())
    }
    pub fn len(&self) -> Result<usize> {
        self.store().len()
    }
    pub fn is_empty(&self) -> Result<bool> {
        self.store().is_empty()
    }
    pub fn entries(&self) -> Result<Vec<CachedQuery>> {
        self.store().entries()
    }
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
