//! Persistent local storage for Crossworld scripts
//!
//! This crate provides:
//! - **LocalStorage**: A sectioned key/value store backed by an ini-style file
//! - **StorageValue**: Typed encoding for strings, numbers, booleans, vectors,
//!   quaternions and angles
//! - **StorageHost**: Shared store handles so scripts opening the same name
//!   see the same data
//! - **StorageConfig**: Cache directory, file extension and default section
//!
//! # Example
//!
//! ```rust,no_run
//! use storage::LocalStorage;
//!
//! let mut store = LocalStorage::open("profile1", "common")?;
//! store.set("volume", 80);
//! store.set("audio.muted", false);
//! store.save()?;
//!
//! assert_eq!(store.get_int("volume"), 80);
//! # Ok::<(), storage::Error>(())
//! ```

mod config;
mod error;
mod host;
mod ini;
mod key;
mod local_storage;
mod value;

pub use config::{StorageConfig, DEFAULT_EXTENSION, DEFAULT_SECTION};
pub use error::{Error, Result};
pub use host::{SharedStorage, StorageHost};
pub use ini::{parse as parse_ini, serialize as serialize_ini, Sections};
pub use key::{sanitize_name, split_key, truncate_section};
pub use local_storage::LocalStorage;
pub use value::{Degree, Radian, StorageValue};

// Re-export glam for downstream crates
pub use glam;
