//! Store statistics

use super::probed::ProbedStore;
use serde::{Deserialize, Serialize};

/// Cumulative migration counters kept by a store
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub(crate) rehashes: u64,
    pub(crate) retired: u64,
    pub(crate) migrated: u64,
}

/// Point-in-time snapshot of a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub capacity: usize,
    pub size: usize,
    pub deleted: usize,
    pub old_capacity: usize,
    pub old_size: usize,
    pub old_deleted: usize,
    pub migrating: bool,
    /// Live entries across both generations
    pub live: usize,
    pub load_factor: f64,
    pub deleted_ratio: f64,
    pub rehashes: u64,
    pub generations_retired: u64,
    pub entries_migrated: u64,
}

impl<H> ProbedStore<H>
where
    H: Fn(&str) -> u32,
{
    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity(),
            size: self.size(),
            deleted: self.deleted(),
            old_capacity: self.old_capacity(),
            old_size: self.old_size(),
            old_deleted: self.old_deleted(),
            migrating: self.is_migrating(),
            live: self.len(),
            load_factor: self.lambda(),
            deleted_ratio: self.deleted_ratio(),
            rehashes: self.counters.rehashes,
            generations_retired: self.counters.retired,
            entries_migrated: self.counters.migrated,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::hash::polynomial33;
    use crate::store::{Entry, ProbedStore, MINPRIME};

    #[test]
    fn test_stats_basic() {
        let mut store = ProbedStore::new(MINPRIME, polynomial33);
        let stats = store.stats();
        assert_eq!(stats.capacity, MINPRIME);
        assert_eq!(stats.size, 0);
        assert!(!stats.migrating);
        assert_eq!(stats.rehashes, 0);

        store.insert(Entry::new("c", 1000));
        store.insert(Entry::new("js", 1001));
        store.remove(&Entry::new("c", 1000));

        let stats = store.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.live, 1);
        assert!((stats.deleted_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats_track_migration() {
        let mut store = ProbedStore::new(MINPRIME, polynomial33);
        for i in 0..51u32 {
            store.insert(Entry::new(format!("k{}", i), 1000 + i));
        }

        let stats = store.stats();
        assert!(stats.migrating);
        assert_eq!(stats.old_capacity, MINPRIME);
        assert_eq!(stats.live, 51);
        assert_eq!(stats.rehashes, 1);
        assert_eq!(stats.entries_migrated, 12);
        assert_eq!(stats.generations_retired, 0);
    }

    #[test]
    fn test_stats_serialize() {
        let store = ProbedStore::new(MINPRIME, polynomial33);
        let json = serde_json::to_value(store.stats()).unwrap();
        assert_eq!(json["capacity"], 101);
        assert_eq!(json["migrating"], false);
    }
}
