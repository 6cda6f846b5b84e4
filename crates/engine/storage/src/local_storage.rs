//! Persistent sectioned key/value store for scripts
//!
//! A [`LocalStorage`] maps `"section.key"` to string values and writes them
//! to an ini-style file under the cache directory. Typed accessors encode
//! through [`StorageValue`]. Mutations only touch memory and set a dirty
//! flag; the file is written by [`LocalStorage::save`] or when the store is
//! dropped.

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::ini::{self, Sections};
use crate::key::{split_key, truncate_section};
use crate::value::{Degree, Radian, StorageValue};
use crate::{Error, Result};

#[derive(Debug)]
pub struct LocalStorage {
    /// Backing file, `None` for in-memory stores
    path: Option<PathBuf>,
    /// Section used for keys without a `section.` prefix
    section: String,
    sections: Sections,
    dirty: bool,
}

impl LocalStorage {
    /// Open the store `name` in the configured cache directory
    pub fn open(name: &str, default_section: &str) -> Result<Self> {
        Self::open_in(&StorageConfig::load(), name, default_section)
    }

    /// Open the store `name` with the configured default section
    pub fn open_default(name: &str) -> Result<Self> {
        Self::open_default_in(&StorageConfig::load(), name)
    }

    /// Open the store `name` with `config.default_section`
    pub fn open_default_in(config: &StorageConfig, name: &str) -> Result<Self> {
        Self::open_in(config, name, &config.default_section)
    }

    /// Open the store `name` using an explicit config
    ///
    /// A missing file is not an error, the store simply starts empty.
    pub fn open_in(config: &StorageConfig, name: &str, default_section: &str) -> Result<Self> {
        Self::open_path(config.path_for(name), default_section)
    }

    /// Open a store backed by `path` as is, without name sanitizing
    pub fn open_path<P: Into<PathBuf>>(path: P, default_section: &str) -> Result<Self> {
        let mut storage = Self {
            path: Some(path.into()),
            section: truncate_section(default_section).to_string(),
            sections: Sections::new(),
            dirty: false,
        };
        storage.reload()?;
        Ok(storage)
    }

    /// A store with no backing file
    pub fn in_memory(default_section: &str) -> Self {
        Self {
            path: None,
            section: truncate_section(default_section).to_string(),
            sections: Sections::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current default section
    pub fn section(&self) -> &str {
        &self.section
    }

    /// True if there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the default section; anything after the first `.` is dropped
    pub fn change_section(&mut self, section: &str) {
        self.section = truncate_section(section).to_string();
    }

    /// Raw string value, empty if missing
    pub fn get(&self, key: &str) -> String {
        self.raw(key).map(str::to_string).unwrap_or_default()
    }

    /// Raw string value, `None` if missing
    pub fn raw(&self, key: &str) -> Option<&str> {
        let (section, key) = split_key(key, &self.section);
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Decoded value, `None` if missing or malformed
    pub fn try_get<T: StorageValue>(&self, key: &str) -> Option<T> {
        self.raw(key).and_then(T::decode)
    }

    /// Decoded value, or the type's zero value if missing or malformed
    pub fn get_as<T: StorageValue>(&self, key: &str) -> T {
        self.try_get(key).unwrap_or_else(T::zero)
    }

    pub fn get_int(&self, key: &str) -> i32 {
        self.get_as(key)
    }

    pub fn get_float(&self, key: &str) -> f32 {
        self.get_as(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_as(key)
    }

    pub fn get_vector3(&self, key: &str) -> Vec3 {
        self.get_as(key)
    }

    pub fn get_quaternion(&self, key: &str) -> Quat {
        self.get_as(key)
    }

    pub fn get_radian(&self, key: &str) -> Radian {
        self.get_as(key)
    }

    pub fn get_degree(&self, key: &str) -> Degree {
        self.get_as(key)
    }

    /// Store a value, replacing any previous one
    ///
    /// Only marks the store dirty; nothing is written until [`save`](Self::save).
    pub fn set<T: StorageValue>(&mut self, key: &str, value: T) {
        self.set_raw(key, value.encode());
    }

    /// `&str` convenience for [`set`](Self::set)
    pub fn set_str(&mut self, key: &str, value: &str) {
        self.set_raw(key, value.to_string());
    }

    fn set_raw(&mut self, key: &str, value: String) {
        let (section, key) = split_key(key, &self.section);
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.dirty = true;
    }

    pub fn exists(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Remove a key, returns whether it was present
    pub fn erase(&mut self, key: &str) -> bool {
        let (section, key) = split_key(key, &self.section);
        let removed = self
            .sections
            .get_mut(section)
            .and_then(|entries| entries.remove(key))
            .is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Remove every section and key
    pub fn clear(&mut self) {
        if !self.sections.is_empty() {
            self.sections.clear();
            self.dirty = true;
        }
    }

    /// Section names in sorted order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Entries of one section in sorted key order
    pub fn keys(&self, section: &str) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// All entries as `(section, key, value)`
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sections.iter().flat_map(|(section, entries)| {
            entries
                .iter()
                .map(move |(k, v)| (section.as_str(), k.as_str(), v.as_str()))
        })
    }

    /// Copy every entry of `other` into this store
    ///
    /// This store keeps its own path and default section, and keys missing
    /// from `other` are left alone.
    pub fn assign_from(&mut self, other: &LocalStorage) {
        for (section, entries) in &other.sections {
            let target = self.sections.entry(section.clone()).or_default();
            for (key, value) in entries {
                target.insert(key.clone(), value.clone());
                self.dirty = true;
            }
        }
    }

    /// Write to the backing file if there are unsaved changes
    ///
    /// On failure the store stays dirty so a later call can retry.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let path = self.path.as_ref().ok_or(Error::NoBackingFile)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, ini::serialize(&self.sections))?;

        debug!("Saved storage to {}", path.display());
        self.dirty = false;
        Ok(())
    }

    /// Re-read the backing file, replacing in-memory content
    ///
    /// Returns `false` and leaves content untouched if the file does not
    /// exist.
    pub fn reload(&mut self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        if !path.exists() {
            return Ok(false);
        }

        let content = std::fs::read_to_string(path)?;
        self.sections = ini::parse(&content);
        self.dirty = false;
        debug!(
            "Loaded {} sections from {}",
            self.sections.len(),
            path.display()
        );
        Ok(true)
    }
}

impl Drop for LocalStorage {
    fn drop(&mut self) {
        if !self.dirty || self.path.is_none() {
            return;
        }
        if let Err(e) = self.save() {
            warn!("Failed to save storage on drop: {}", e);
        }
    }
}
