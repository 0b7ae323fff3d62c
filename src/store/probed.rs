//! Probed store with incremental live rehashing

use super::prime::{find_next_prime, normalize_capacity};
use super::slot::Entry;
use super::stats::Counters;
use super::table::Table;
use super::{
    HashFn, DELETED_RATIO_LIMIT, LOAD_FACTOR_LIMIT, MAXID, MAXPRIME, MIGRATION_FRACTION, MINID,
};
use crate::config::StoreConfig;
use std::fmt;
use tracing::{debug, error, trace, warn};

/// The generation being drained into `current`
#[derive(Debug)]
pub(crate) struct OldGeneration {
    pub(crate) table: Table,
    /// Entries moved per call, fixed when the rehash started
    quantum: usize,
    /// Every live slot of `table` sits at or after this index
    cursor: usize,
}

impl OldGeneration {
    fn new(table: Table) -> Self {
        let quantum = ((table.size() as f64 * MIGRATION_FRACTION) as usize).max(1);
        Self {
            table,
            quantum,
            cursor: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn quantum(&self) -> usize {
        self.quantum
    }

    fn is_drained(&self) -> bool {
        self.table.deleted() == self.table.size()
    }

    /// Move one quantum of live entries into `current`
    ///
    /// When fewer live entries remain than the quantum, all of them move in
    /// one sweep and the generation is marked fully drained.
    fn migrate_into<H>(&mut self, current: &mut Table, hash: &H) -> usize
    where
        H: Fn(&str) -> u32,
    {
        if self.table.live() < self.quantum {
            let moved = self.move_live(current, hash, usize::MAX);
            self.table.mark_drained();
            moved
        } else {
            self.move_live(current, hash, self.quantum)
        }
    }

    fn move_live<H>(&mut self, current: &mut Table, hash: &H, limit: usize) -> usize
    where
        H: Fn(&str) -> u32,
    {
        let mut moved = 0;
        while moved < limit && self.cursor < self.table.capacity() {
            if let Some(entry) = self.table.tombstone(self.cursor) {
                let h = hash(entry.key.as_str());
                if current.place(entry, h).is_none() {
                    error!(
                        index = self.cursor,
                        capacity = current.capacity(),
                        "No free slot on probe path while migrating entry"
                    );
                }
                moved += 1;
            }
            self.cursor += 1;
        }
        moved
    }
}

/// String/id store over open addressing with quadratic probing
///
/// Growth never rehashes the whole table in one call. When the load factor
/// crosses one half (or tombstones dominate), the live table becomes the
/// *old* generation and a freshly sized table takes its place; every later
/// insert or remove then moves a fixed slice of the old generation across
/// until it is empty and dropped.
///
/// ```text
/// Stable:     current [ a . b DEL . c . . ]
///
/// Migrating:  current [ . a . . . . . . . . . . . ]   <- inserts land here
///             old     [ DEL . b DEL . c . . ]         <- drained per call
/// ```
pub struct ProbedStore<H = HashFn> {
    hash: H,
    current: Table,
    old: Option<OldGeneration>,
    pub(crate) counters: Counters,
}

impl<H> ProbedStore<H>
where
    H: Fn(&str) -> u32,
{
    /// Create a store
    ///
    /// The requested capacity is clamped into `[MINPRIME, MAXPRIME]` and
    /// rounded up to a prime; read [`capacity`](Self::capacity) back to
    /// see what was allocated.
    pub fn new(requested_capacity: usize, hash: H) -> Self {
        let capacity = normalize_capacity(requested_capacity);
        if capacity != requested_capacity {
            debug!(
                requested = requested_capacity,
                capacity, "Normalized store capacity"
            );
        }
        Self {
            hash,
            current: Table::new(capacity),
            old: None,
            counters: Counters::default(),
        }
    }

    /// Insert an entry into the current generation
    ///
    /// Returns `false`, leaving the store untouched, when the id is outside
    /// `[MINID, MAXID]`, the same `(key, id)` is already live in either
    /// generation, the current generation holds `MAXPRIME / 2` slots, or
    /// the probe path has no free slot.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if !(MINID..=MAXID).contains(&entry.id) {
            trace!(key = %entry.key, id = entry.id, "Rejected insert: id out of range");
            return false;
        }
        if self.current.size() >= MAXPRIME / 2 {
            warn!(size = self.current.size(), "Rejected insert: size ceiling reached");
            return false;
        }
        if self.contains(&entry.key, entry.id) {
            trace!(key = %entry.key, id = entry.id, "Rejected insert: duplicate");
            return false;
        }

        let hash = (self.hash)(entry.key.as_str());
        let Some(index) = self.current.free_slot(hash) else {
            warn!(
                key = %entry.key,
                capacity = self.current.capacity(),
                "Rejected insert: probe sequence exhausted"
            );
            return false;
        };
        self.current.occupy(index, entry);

        if self.old.is_some() {
            self.advance_migration();
        }

        if self.old.is_none()
            && self.current.load_factor() > LOAD_FACTOR_LIMIT
            && self.current.capacity() < MAXPRIME
        {
            self.rehash();
        }
        true
    }

    /// Remove an entry from whichever generations hold it
    ///
    /// Both generations are searched; the result is `true` if either one
    /// held the entry live.
    pub fn remove(&mut self, entry: &Entry) -> bool {
        let hash = (self.hash)(entry.key.as_str());
        let mut removed = false;

        if let Some(index) = self.current.find(&entry.key, entry.id, hash) {
            self.current.tombstone(index);
            removed = true;
        }

        if let Some(old) = self.old.as_mut() {
            if let Some(index) = old.table.find(&entry.key, entry.id, hash) {
                old.table.tombstone(index);
                removed = true;
            }
        }

        if self.old.is_some() {
            self.advance_migration();
        }

        if self.old.is_none() && self.current.deleted_ratio() > DELETED_RATIO_LIMIT {
            self.rehash();
        }
        removed
    }

    /// Look up a live entry, current generation first
    pub fn get(&self, key: &str, id: u32) -> Option<&Entry> {
        let hash = (self.hash)(key);
        self.current
            .find(key, id, hash)
            .and_then(|index| self.current.slot(index).entry())
            .or_else(|| {
                let old = self.old.as_ref()?;
                let index = old.table.find(key, id, hash)?;
                old.table.slot(index).entry()
            })
    }

    /// Look up a live entry, returning the empty sentinel on a miss
    pub fn get_person(&self, key: &str, id: u32) -> Entry {
        self.get(key, id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str, id: u32) -> bool {
        self.get(key, id).is_some()
    }

    /// Load factor of the current generation (tombstones included)
    pub fn lambda(&self) -> f64 {
        self.current.load_factor()
    }

    /// Share of the current generation's used slots that are tombstones
    ///
    /// Returns 0.0 when nothing has been placed in the current generation.
    pub fn deleted_ratio(&self) -> f64 {
        self.current.deleted_ratio()
    }

    /// Start a migration: the current table becomes the old generation
    fn rehash(&mut self) {
        let live = self.current.live();
        let capacity = find_next_prime(4 * live);
        let previous = std::mem::replace(&mut self.current, Table::new(capacity));
        let old = OldGeneration::new(previous);

        debug!(
            old_capacity = old.table.capacity(),
            old_size = old.table.size(),
            old_deleted = old.table.deleted(),
            new_capacity = capacity,
            quantum = old.quantum,
            "Starting incremental rehash"
        );

        self.old = Some(old);
        self.counters.rehashes += 1;
        self.advance_migration();
    }

    /// Run one migration quantum and retire the old generation if drained
    fn advance_migration(&mut self) {
        let Some(old) = self.old.as_mut() else {
            return;
        };
        let moved = old.migrate_into(&mut self.current, &self.hash);
        self.counters.migrated += moved as u64;
        trace!(moved, remaining = old.table.live(), "Migration quantum");

        if old.is_drained() {
            self.old = None;
            self.counters.retired += 1;
            debug!(
                capacity = self.current.capacity(),
                size = self.current.size(),
                "Old generation retired"
            );
        }
    }
}

impl ProbedStore<HashFn> {
    /// Create a store from configuration
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.capacity, config.hash.function())
    }
}

// Generation accessors
impl<H> ProbedStore<H> {
    /// Capacity of the current generation
    pub fn capacity(&self) -> usize {
        self.current.capacity()
    }

    /// Occupied + Tombstone slots in the current generation
    pub fn size(&self) -> usize {
        self.current.size()
    }

    /// Tombstone slots in the current generation
    pub fn deleted(&self) -> usize {
        self.current.deleted()
    }

    /// Capacity of the old generation, 0 when none is draining
    pub fn old_capacity(&self) -> usize {
        self.old.as_ref().map_or(0, |o| o.table.capacity())
    }

    pub fn old_size(&self) -> usize {
        self.old.as_ref().map_or(0, |o| o.table.size())
    }

    pub fn old_deleted(&self) -> usize {
        self.old.as_ref().map_or(0, |o| o.table.deleted())
    }

    /// Whether an old generation is still being drained
    pub fn is_migrating(&self) -> bool {
        self.old.is_some()
    }

    /// Live entries across both generations
    pub fn len(&self) -> usize {
        self.current.live() + self.old.as_ref().map_or(0, |o| o.table.live())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current_table(&self) -> &Table {
        &self.current
    }

    pub fn old_table(&self) -> Option<&Table> {
        self.old.as_ref().map(|o| &o.table)
    }

    #[cfg(test)]
    pub(crate) fn old_generation(&self) -> Option<&OldGeneration> {
        self.old.as_ref()
    }
}

impl<H> fmt::Debug for ProbedStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbedStore")
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .field("deleted", &self.deleted())
            .field("old_capacity", &self.old_capacity())
            .field("old_size", &self.old_size())
            .field("old_deleted", &self.old_deleted())
            .finish()
    }
}
