//! Fixed-capacity slot array with quadratic probing
//!
//! One `Table` is one generation of the store. It knows nothing about
//! rehashing; it only places, finds and tombstones entries and keeps the
//! counters the store's triggers are computed from.

use super::slot::{Entry, Slot};

/// A fixed-size open-addressing table
#[derive(Debug, Clone)]
pub struct Table {
    slots: Vec<Slot>,
    /// Occupied + Tombstone slots
    size: usize,
    /// Tombstone slots
    deleted: usize,
}

impl Table {
    /// Allocate a table of `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; capacity],
            size: 0,
            deleted: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Occupied slots, i.e. `size - deleted`
    pub fn live(&self) -> usize {
        self.size - self.deleted
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    /// `size / capacity`
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// `deleted / size`, or 0.0 for a table nothing was ever placed in
    pub fn deleted_ratio(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.deleted as f64 / self.size as f64
        }
    }

    /// Probe positions `(h0 + i²) mod capacity` for `i = 0..=capacity`
    ///
    /// The sequence is bounded at `capacity + 1` probes and is not a full
    /// permutation of the table; positions past the first `capacity / 2`
    /// may repeat. With a prime capacity and a load factor of at most one
    /// half the first half of the sequence always reaches a free slot.
    #[inline]
    fn probe_sequence(&self, hash: u32) -> impl Iterator<Item = usize> {
        let cap = self.capacity() as u64;
        let h0 = hash as u64 % cap;
        (0..=cap).map(move |i| ((h0 + i * i) % cap) as usize)
    }

    /// Index of the live slot holding `(key, id)`
    ///
    /// Stops at the first Empty slot: a used slot never becomes Empty
    /// again, so an entry is never stored past an Empty position of its
    /// own probe sequence.
    pub fn find(&self, key: &str, id: u32, hash: u32) -> Option<usize> {
        for index in self.probe_sequence(hash) {
            match &self.slots[index] {
                Slot::Empty => return None,
                slot if slot.holds(key, id) => return Some(index),
                _ => {}
            }
        }
        None
    }

    /// Index of the first free slot (Empty or Tombstone) on the probe path
    pub fn free_slot(&self, hash: u32) -> Option<usize> {
        self.probe_sequence(hash)
            .find(|&index| self.slots[index].is_free())
    }

    /// Store `entry` at `index`, which must be free
    ///
    /// Reusing a Tombstone decrements `deleted`; filling an Empty slot
    /// increments `size`.
    pub fn occupy(&mut self, index: usize, entry: Entry) {
        match self.slots[index] {
            Slot::Tombstone => self.deleted -= 1,
            Slot::Empty => self.size += 1,
            Slot::Occupied(_) => {
                debug_assert!(false, "occupy called on a live slot {}", index);
                return;
            }
        }
        self.slots[index] = Slot::Occupied(entry);
    }

    /// Quadratic-probe placement: find a free slot and occupy it
    pub fn place(&mut self, entry: Entry, hash: u32) -> Option<usize> {
        let index = self.free_slot(hash)?;
        self.occupy(index, entry);
        Some(index)
    }

    /// Replace the live entry at `index` with a Tombstone, returning it
    pub fn tombstone(&mut self, index: usize) -> Option<Entry> {
        match std::mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(entry) => {
                self.deleted += 1;
                Some(entry)
            }
            other => {
                self.slots[index] = other;
                None
            }
        }
    }

    /// Count every remaining slot as consumed
    pub(crate) fn mark_drained(&mut self) {
        self.deleted = self.size;
    }
}
