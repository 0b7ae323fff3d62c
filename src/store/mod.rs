//! Probed Store
//!
//! Open-addressing string/id store with quadratic probing and incremental
//! live rehashing. Growth is amortized: a rehash only swaps in a new table,
//! and the entries of the previous one are moved across a quantum at a time
//! by subsequent inserts and removes.
//!
//! # Architecture
//!
//! ```text
//! ProbedStore
//!   ├─→ current: Table(prime capacity)   ← all inserts
//!   │     └─→ [Empty | Tombstone | Occupied(key, id)] × capacity
//!   └─→ old: Option<OldGeneration>       ← only while migrating
//!         ├─→ Table (previous current)
//!         ├─→ quantum = floor(size / 4)
//!         └─→ cursor
//!
//! Triggers (checked only while no old generation exists):
//!   ├─→ insert: size / capacity > 0.5 and capacity < MAXPRIME
//!   └─→ remove: deleted / size > 0.8
//! ```
//!
//! A rehash sizes the new table at the next prime above four times the
//! live entry count and immediately moves one quantum.

pub mod dump;
pub mod prime;
pub mod probed;
pub mod shared;
pub mod slot;
pub mod stats;
pub mod table;

#[cfg(test)]
mod scenario_tests;

pub use dump::Dump;
pub use probed::ProbedStore;
pub use shared::SharedStore;
pub use slot::{Entry, Slot};
pub use stats::StoreStats;
pub use table::Table;

/// Smallest id accepted by insert
pub const MINID: u32 = 1000;
/// Largest id accepted by insert
pub const MAXID: u32 = 9999;
/// Smallest table capacity
pub const MINPRIME: usize = 101;
/// Largest table capacity
pub const MAXPRIME: usize = 99991;

/// Load factor above which an insert starts a rehash
pub const LOAD_FACTOR_LIMIT: f64 = 0.5;
/// Deleted ratio above which a remove starts a rehash
pub const DELETED_RATIO_LIMIT: f64 = 0.8;
/// Share of the old generation moved per call
pub const MIGRATION_FRACTION: f64 = 0.25;

/// Key hash function injected into a store
pub type HashFn = fn(&str) -> u32;
