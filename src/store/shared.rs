//! Thread-safe handle around a probed store
//!
//! Insert, remove and the migration step they drive all mutate both
//! generations and their counters together, so the whole store sits behind
//! one exclusive lock. Lookups take the same lock.

use super::probed::ProbedStore;
use super::slot::Entry;
use super::stats::StoreStats;
use super::HashFn;
use crate::config::StoreConfig;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-guarded store handle
pub struct SharedStore<H = HashFn> {
    inner: Arc<Mutex<ProbedStore<H>>>,
}

impl<H> Clone for SharedStore<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> SharedStore<H>
where
    H: Fn(&str) -> u32,
{
    pub fn new(store: ProbedStore<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn insert(&self, entry: Entry) -> bool {
        self.inner.lock().insert(entry)
    }

    pub fn remove(&self, entry: &Entry) -> bool {
        self.inner.lock().remove(entry)
    }

    /// Cloned lookup result, or the empty sentinel on a miss
    pub fn get_person(&self, key: &str, id: u32) -> Entry {
        self.inner.lock().get_person(key, id)
    }

    pub fn lambda(&self) -> f64 {
        self.inner.lock().lambda()
    }

    pub fn deleted_ratio(&self) -> f64 {
        self.inner.lock().deleted_ratio()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access to the underlying store
    pub fn with<R>(&self, f: impl FnOnce(&mut ProbedStore<H>) -> R) -> R {
        let mut store = self.inner.lock();
        f(&mut *store)
    }
}

impl SharedStore<HashFn> {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(ProbedStore::from_config(config))
    }
}

impl<H> std::fmt::Debug for SharedStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore").finish()
    }
}
