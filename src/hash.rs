//! Key hash functions
//!
//! The store treats its hash as an opaque, deterministic `&str → u32`
//! function. These are the ones the configuration layer can name.

use crate::store::HashFn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `val = val * 33 + byte` over the key bytes, wrapping at 32 bits
pub fn polynomial33(key: &str) -> u32 {
    key.bytes()
        .fold(0u32, |val, b| val.wrapping_mul(33).wrapping_add(b as u32))
}

/// 32-bit FNV-1a
pub fn fnv1a(key: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    key.bytes()
        .fold(OFFSET_BASIS, |h, b| (h ^ b as u32).wrapping_mul(PRIME))
}

/// Named hash function selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    #[default]
    Polynomial33,
    Fnv1a,
}

impl HashKind {
    /// The function this kind names
    pub fn function(self) -> HashFn {
        match self {
            HashKind::Polynomial33 => polynomial33,
            HashKind::Fnv1a => fnv1a,
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKind::Polynomial33 => write!(f, "polynomial33"),
            HashKind::Fnv1a => write!(f, "fnv1a"),
        }
    }
}

impl FromStr for HashKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polynomial33" => Ok(HashKind::Polynomial33),
            "fnv1a" => Ok(HashKind::Fnv1a),
            other => Err(crate::error::Error::InvalidArgument(format!(
                "Unknown hash function: {}",
                other
            ))),
        }
    }
}
