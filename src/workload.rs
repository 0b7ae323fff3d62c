//! Reproducible workload generation
//!
//! Drives a store through its public operations only. The same seed always
//! yields the same entries and operation sequence.

use crate::store::{Entry, ProbedStore, MAXID, MINID};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Key vocabulary entries are drawn from
pub const KEYS: [&str; 8] = ["c++", "python", "java", "scheme", "prolog", "c#", "c", "js"];

/// One store operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Insert(Entry),
    Remove(Entry),
    Lookup(Entry),
}

/// Relative weights of the operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpMix {
    pub insert: u32,
    pub remove: u32,
    pub lookup: u32,
}

impl Default for OpMix {
    fn default() -> Self {
        Self {
            insert: 60,
            remove: 20,
            lookup: 20,
        }
    }
}

impl OpMix {
    fn total(&self) -> u32 {
        self.insert + self.remove + self.lookup
    }
}

/// Seeded generator of entries and operations
pub struct Workload {
    rng: ChaCha8Rng,
    /// Every entry generated so far; removals and lookups target these
    generated: Vec<Entry>,
}

impl Workload {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            generated: Vec::new(),
        }
    }

    /// Draw one entry: a vocabulary key and an id in `[MINID, MAXID]`
    pub fn next_entry(&mut self) -> Entry {
        let key = KEYS[self.rng.gen_range(0..KEYS.len())];
        let id = self.rng.gen_range(MINID..=MAXID);
        let entry = Entry::new(key, id);
        self.generated.push(entry.clone());
        entry
    }

    /// Draw `n` entries with no repeated `(key, id)` pair
    pub fn unique_entries(&mut self, n: usize) -> Vec<Entry> {
        let mut seen = HashSet::with_capacity(n);
        let mut entries = Vec::with_capacity(n);
        while entries.len() < n {
            let entry = self.next_entry();
            if seen.insert(entry.clone()) {
                entries.push(entry);
            }
        }
        entries
    }

    /// Generate `n` operations weighted by `mix`
    ///
    /// Removals and lookups pick a previously generated entry, which may or
    /// may not still be in the store when the operation runs.
    pub fn operations(&mut self, n: usize, mix: OpMix) -> Vec<Op> {
        let total = mix.total().max(1);
        let mut ops = Vec::with_capacity(n);
        for _ in 0..n {
            let roll = self.rng.gen_range(0..total);
            if roll < mix.insert || self.generated.is_empty() {
                ops.push(Op::Insert(self.next_entry()));
            } else {
                let target = self.generated[self.rng.gen_range(0..self.generated.len())].clone();
                if roll < mix.insert + mix.remove {
                    ops.push(Op::Remove(target));
                } else {
                    ops.push(Op::Lookup(target));
                }
            }
        }
        debug!(count = ops.len(), "Generated operations");
        ops
    }
}

/// Outcome counts of a workload run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub operations: usize,
    pub inserted: usize,
    pub insert_rejected: usize,
    pub removed: usize,
    pub remove_missed: usize,
    pub lookup_hits: usize,
    pub lookup_misses: usize,
    /// Operations that ended with an old generation still draining
    pub ops_while_migrating: usize,
}

/// Apply `ops` to `store` in order
pub fn run<H>(store: &mut ProbedStore<H>, ops: &[Op]) -> WorkloadReport
where
    H: Fn(&str) -> u32,
{
    let mut report = WorkloadReport {
        operations: ops.len(),
        ..Default::default()
    };

    for op in ops {
        match op {
            Op::Insert(entry) => {
                if store.insert(entry.clone()) {
                    report.inserted += 1;
                } else {
                    report.insert_rejected += 1;
                }
            }
            Op::Remove(entry) => {
                if store.remove(entry) {
                    report.removed += 1;
                } else {
                    report.remove_missed += 1;
                }
            }
            Op::Lookup(entry) => {
                if store.contains(&entry.key, entry.id) {
                    report.lookup_hits += 1;
                } else {
                    report.lookup_misses += 1;
                }
            }
        }
        if store.is_migrating() {
            report.ops_while_migrating += 1;
        }
    }

    info!(
        operations = report.operations,
        inserted = report.inserted,
        removed = report.removed,
        capacity = store.capacity(),
        "Workload complete"
    );
    report
}
