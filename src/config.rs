//! Store configuration
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `PROBED_*` environment variables (`PROBED_CAPACITY=211`,
//! `PROBED_HASH=fnv1a`).

use crate::error::{Error, Result};
use crate::hash::HashKind;
use crate::store::MINPRIME;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PROBED";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Requested capacity; normalized to a prime in `[MINPRIME, MAXPRIME]`
    pub capacity: usize,
    /// Key hash function
    pub hash: HashKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: MINPRIME,
            hash: HashKind::Polynomial33,
        }
    }
}

impl StoreConfig {
    /// Load defaults, then `path` (if any), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("capacity", MINPRIME as i64)?
            .set_default("hash", HashKind::default().to_string())?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: StoreConfig = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        debug!(capacity = config.capacity, hash = %config.hash, "Loaded store configuration");
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Render as a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::SerializationError(format!("Failed to render config: {}", e)))
    }
}
