//! Error types for the storage system

use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or saving a store
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A dirty store without a backing file was asked to save
    #[error("Store has no backing file")]
    NoBackingFile,
}
