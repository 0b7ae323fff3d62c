// probed-store - Rust Implementation
// A string/id store with quadratic probing and incremental live rehashing

#![warn(rust_2018_idioms)]

pub mod config;
pub mod hash;
pub mod store;
pub mod workload;

// Re-exports for convenience
pub use crate::config::StoreConfig;
pub use hash::HashKind;
pub use store::{Entry, ProbedStore, SharedStore, StoreStats};

/// probed-store error types
///
/// Store operations themselves report failure through booleans and the
/// empty sentinel; these errors cover the surrounding configuration and
/// driver layers.
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Invalid argument: {0}")]
        InvalidArgument(String),

        #[error("Serialization error: {0}")]
        SerializationError(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),
    }

    impl From<::config::ConfigError> for Error {
        fn from(e: ::config::ConfigError) -> Self {
            Error::Config(e.to_string())
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
