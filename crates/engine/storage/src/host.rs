//! Shared store handles for script hosts
//!
//! Several scripts may open the same store name. The host hands every one
//! of them the same [`SharedStorage`], so writes are visible across scripts
//! and the file is flushed once, when the last handle is dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::key::sanitize_name;
use crate::{LocalStorage, Result};

/// A store shared between scripts on one thread
pub type SharedStorage = Rc<RefCell<LocalStorage>>;

pub struct StorageHost {
    config: StorageConfig,
    /// Sanitized name -> live store
    open: HashMap<String, Weak<RefCell<LocalStorage>>>,
}

impl Default for StorageHost {
    fn default() -> Self {
        Self::new(StorageConfig::load())
    }
}

impl StorageHost {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            open: HashMap::new(),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Get the live store for `name`, opening it if nobody holds it
    ///
    /// An already open store keeps its current default section; use
    /// [`LocalStorage::change_section`] on the handle to switch.
    pub fn open(&mut self, name: &str, default_section: &str) -> Result<SharedStorage> {
        self.prune();
        let id = sanitize_name(name);

        if let Some(storage) = self.open.get(&id).and_then(Weak::upgrade) {
            debug!("Reusing open storage '{}'", id);
            return Ok(storage);
        }

        let storage = Rc::new(RefCell::new(LocalStorage::open_in(
            &self.config,
            name,
            default_section,
        )?));
        self.open.insert(id, Rc::downgrade(&storage));
        Ok(storage)
    }

    /// Open with the configured default section
    pub fn open_default(&mut self, name: &str) -> Result<SharedStorage> {
        let section = self.config.default_section.clone();
        self.open(name, &section)
    }

    /// Number of stores still held by someone
    pub fn live_count(&self) -> usize {
        self.open.values().filter(|w| w.strong_count() > 0).count()
    }

    /// Forget stores whose handles have all been dropped
    pub fn prune(&mut self) {
        self.open.retain(|_, w| w.strong_count() > 0);
    }

    /// Save every live store, returns how many failed
    pub fn save_all(&mut self) -> usize {
        self.prune();

        let mut failed = 0;
        for (id, weak) in &self.open {
            let Some(storage) = weak.upgrade() else {
                continue;
            };
            // a script holding a borrow is mid-call; its store is saved on drop
            let Ok(mut storage) = storage.try_borrow_mut() else {
                warn!("Storage '{}' is busy, skipping save", id);
                failed += 1;
                continue;
            };
            if let Err(e) = storage.save() {
                warn!("Failed to save storage '{}': {}", id, e);
                failed += 1;
            }
        }
        failed
    }
}
