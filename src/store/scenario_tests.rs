//! Scenario tests for the probed store
//!
//! These drive whole insert/remove/lookup sequences through the store and
//! check the generation counters and slot contents along the way.

use super::prime::is_prime;
use super::{Entry, ProbedStore, Slot, MAXPRIME, MINPRIME};
use crate::hash::polynomial33;
use crate::workload::{Workload, KEYS};
use std::collections::HashMap;

/// Check the structural invariants of both generations
fn assert_invariants<H: Fn(&str) -> u32>(store: &ProbedStore<H>) {
    let cap = store.capacity();
    assert!(is_prime(cap) && (MINPRIME..=MAXPRIME).contains(&cap));
    assert!(store.deleted() <= store.size());

    let current = store.current_table().slots();
    let tombstones = current.iter().filter(|s| **s == Slot::Tombstone).count();
    let occupied = current.iter().filter(|s| s.entry().is_some()).count();
    assert_eq!(tombstones, store.deleted());
    assert_eq!(occupied, store.size() - store.deleted());

    match store.old_table() {
        Some(old) => {
            assert!(store.old_deleted() <= store.old_size());
            assert!(store.old_size() <= store.old_capacity());
            let live = old.slots().iter().filter(|s| s.entry().is_some()).count();
            assert_eq!(live, store.old_size() - store.old_deleted());
        }
        None => {
            assert_eq!(store.old_capacity(), 0);
            assert_eq!(store.old_size(), 0);
            assert_eq!(store.old_deleted(), 0);
        }
    }
}

/// No `(key, id)` is live more than once across both generations
fn assert_no_duplicates<H: Fn(&str) -> u32>(store: &ProbedStore<H>) {
    let mut counts: HashMap<&Entry, usize> = HashMap::new();
    let old_slots = store.old_table().map(|t| t.slots()).unwrap_or(&[]);
    for slot in store.current_table().slots().iter().chain(old_slots) {
        if let Some(entry) = slot.entry() {
            *counts.entry(entry).or_default() += 1;
        }
    }
    assert!(counts.values().all(|&n| n == 1), "duplicate live entry");
}

#[test]
fn test_scenario_python_round_trip() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let python = Entry::new("python", 4242);

    assert!(store.insert(python.clone()));
    assert_eq!(store.get_person("python", 4242), python);

    assert!(store.remove(&python));
    let miss = store.get_person("python", 4242);
    assert_eq!(miss.key, "");
    assert_eq!(miss.id, 0);
}

#[test]
fn test_scenario_constructor_sizes() {
    assert_eq!(ProbedStore::new(MINPRIME, polynomial33).capacity(), MINPRIME);
    assert_eq!(ProbedStore::new(MAXPRIME, polynomial33).capacity(), MAXPRIME);
    assert_eq!(ProbedStore::new(211, polynomial33).capacity(), 211);
    assert_eq!(ProbedStore::new(7, polynomial33).capacity(), MINPRIME);
    assert_eq!(ProbedStore::new(1_000_000_000, polynomial33).capacity(), MAXPRIME);
    assert_eq!(ProbedStore::new(102, polynomial33).capacity(), 103);
}

#[test]
fn test_scenario_distinct_keys_land_on_home_slots() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let mut workload = Workload::new(10);

    // The vocabulary hashes to eight distinct slots modulo 101
    for key in KEYS {
        let entry = Entry::new(key, workload.next_entry().id);
        assert!(store.insert(entry.clone()));
        let home = polynomial33(key) as usize % MINPRIME;
        assert_eq!(store.current_table().slots()[home].entry(), Some(&entry));
    }
    assert_eq!(store.size(), KEYS.len());
}

#[test]
fn test_scenario_sixty_inserts_into_101() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let entries = Workload::new(10).unique_entries(60);

    let mut first_trigger = None;
    let mut retired_at = None;
    for (i, entry) in entries.iter().enumerate() {
        assert!(store.insert(entry.clone()));
        assert_eq!(store.get(&entry.key, entry.id), Some(entry));

        if first_trigger.is_none() && store.is_migrating() {
            first_trigger = Some(i);
            // The generation that crossed one half is the one draining
            assert!(store.old_size() as f64 / store.old_capacity() as f64 > 0.5);
        }
        if let Some(start) = first_trigger {
            if retired_at.is_none() && !store.is_migrating() {
                retired_at = Some(i);
            }
            // Once migration has started it stays visible until it retires
            if retired_at.is_none() {
                assert!(store.is_migrating(), "old generation vanished at {} (start {})", i, start);
            }
        }
        assert_invariants(&store);
        assert_no_duplicates(&store);
    }

    assert_eq!(first_trigger, Some(50));
    assert_eq!(retired_at, Some(54));
    assert!(!store.is_migrating());
    assert_eq!(store.size(), 60);
    assert_eq!(store.capacity(), 211);
    for entry in &entries {
        assert_eq!(store.get_person(&entry.key, entry.id), *entry);
    }
}

#[test]
fn test_scenario_insert_rehash_into_199() {
    let mut store = ProbedStore::new(199, polynomial33);
    let entries = Workload::new(11).unique_entries(200);

    for entry in &entries {
        assert!(store.insert(entry.clone()));
        assert!(store.contains(&entry.key, entry.id));
    }
    assert_invariants(&store);
    assert!(!store.is_migrating());
    assert_eq!(store.size(), 200);
    assert_eq!(store.capacity(), 401);
    assert_eq!(store.stats().rehashes, 1);
}

#[test]
fn test_scenario_many_rehashes() {
    let mut store = ProbedStore::new(199, polynomial33);
    let entries = Workload::new(12).unique_entries(1000);

    let mut rehashes = 0;
    let mut was_migrating = false;
    for entry in &entries {
        assert!(store.insert(entry.clone()));
        if store.is_migrating() && !was_migrating {
            rehashes += 1;
        }
        was_migrating = store.is_migrating();
    }
    assert_invariants(&store);
    assert_no_duplicates(&store);
    assert!(rehashes >= 2);
    assert_eq!(store.len(), 1000);
    for entry in &entries {
        assert_eq!(store.get(&entry.key, entry.id), Some(entry));
    }
}

#[test]
fn test_scenario_remove_triggers_cleanup() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let entries = Workload::new(13).unique_entries(40);
    for entry in &entries {
        assert!(store.insert(entry.clone()));
    }
    assert!(!store.is_migrating());

    // 32 of 40 is exactly 0.8; the 33rd removal crosses it
    for (i, entry) in entries.iter().enumerate().take(33) {
        assert!(store.remove(entry));
        assert_invariants(&store);
        if i < 32 {
            assert_eq!(store.stats().rehashes, 0);
        }
    }
    assert_eq!(store.stats().rehashes, 1);

    // Seven live entries, 7 < floor(40 / 4), so one sweep drains everything
    assert!(!store.is_migrating());
    assert_eq!(store.size(), 7);
    assert_eq!(store.deleted(), 0);
    for entry in &entries[..33] {
        assert!(store.get_person(&entry.key, entry.id).is_empty());
    }
    for entry in &entries[33..] {
        assert_eq!(store.get(&entry.key, entry.id), Some(entry));
    }
}

#[test]
fn test_scenario_remove_during_migration() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let entries = Workload::new(14).unique_entries(51);
    for entry in &entries {
        assert!(store.insert(entry.clone()));
    }
    assert!(store.is_migrating());

    // Remove everything while both generations are populated
    for entry in &entries {
        assert!(store.remove(entry), "failed to remove {}", entry);
        assert!(store.get_person(&entry.key, entry.id).is_empty());
        assert_invariants(&store);
    }
    assert!(!store.is_migrating());
    assert!(store.is_empty());
    for entry in &entries {
        assert!(!store.remove(entry));
    }
}

#[test]
fn test_scenario_mixed_workload_terminates() {
    let mut store = ProbedStore::new(MINPRIME, polynomial33);
    let mut workload = Workload::new(15);
    let mut live: HashMap<(String, u32), Entry> = HashMap::new();

    for _ in 0..20 {
        for entry in workload.unique_entries(60) {
            if store.insert(entry.clone()) {
                live.insert((entry.key.clone(), entry.id), entry);
            }
        }
        let victims: Vec<Entry> = live.values().take(45).cloned().collect();
        for entry in victims {
            assert!(store.remove(&entry));
            live.remove(&(entry.key.clone(), entry.id));
        }
        assert_invariants(&store);
        assert_no_duplicates(&store);
    }

    // Misses still advance the migration
    let absent = Entry::new("absent", 1000);
    for _ in 0..5 {
        store.remove(&absent);
    }
    assert!(!store.is_migrating());
    assert_eq!(store.len(), live.len());
    for entry in live.values() {
        assert_eq!(store.get(&entry.key, entry.id), Some(entry));
    }
}

#[test]
fn test_scenario_size_ceiling_at_maxprime() {
    let mut store = ProbedStore::new(MAXPRIME, polynomial33);
    let mut inserted = 0u32;
    while store.size() < MAXPRIME / 2 {
        let entry = Entry::new(format!("k{}", inserted), 1000 + inserted % 9000);
        assert!(store.insert(entry));
        inserted += 1;
    }
    // Never rehashes at the maximum capacity
    assert!(!store.is_migrating());
    assert_eq!(store.capacity(), MAXPRIME);
    assert_eq!(inserted as usize, MAXPRIME / 2);
    assert!(!store.insert(Entry::new("one-more", 5000)));
    assert_eq!(store.size(), MAXPRIME / 2);
}
