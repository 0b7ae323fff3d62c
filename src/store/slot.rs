//! Slot states for the probed tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// A keyed record: the search key plus the id that discriminates
/// records sharing a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Search string used as the hash key
    pub key: String,
    /// Identifier, accepted by insert only within `[MINID, MAXID]`
    pub id: u32,
}

impl Entry {
    /// Create a new entry
    pub fn new(key: impl Into<String>, id: u32) -> Self {
        Self {
            key: key.into(),
            id,
        }
    }

    /// The "not found" sentinel (`key = ""`, `id = 0`)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the "not found" sentinel
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Whether this entry carries the given key and id
    pub fn matches(&self, key: &str, id: u32) -> bool {
        self.id == id && self.key == key
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            Ok(())
        } else {
            write!(f, "{} (ID {})", self.key, self.id)
        }
    }
}

/// One cell of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
    /// Never written since the table was allocated
    #[default]
    Empty,
    /// Previously occupied; stops nothing but may be reused by insert
    Tombstone,
    /// Holds a live entry
    Occupied(Entry),
}

impl Slot {
    /// Empty or Tombstone, i.e. insert may place an entry here
    pub fn is_free(&self) -> bool {
        !matches!(self, Slot::Occupied(_))
    }

    /// The live entry, if any
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    /// Whether this slot holds a live entry equal to `(key, id)`
    pub fn holds(&self, key: &str, id: u32) -> bool {
        self.entry().is_some_and(|e| e.matches(key, id))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => Ok(()),
            Slot::Tombstone => write!(f, "DELETED"),
            Slot::Occupied(entry) => write!(f, "{}", entry),
        }
    }
}
