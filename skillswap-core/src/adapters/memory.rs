//! In-memory key-value store for tests

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

/// Slots kept in a map; nothing survives the process
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    section: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(f(&mut slots))
    }

    fn lock_section(&self) -> Result<MutexGuard<'_, ()>> {
        self.section
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        self.with_slots(|slots| slots.get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.with_slots(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn delete_slot(&self, key: &str) -> Result<()> {
        self.with_slots(|slots| {
            slots.remove(key);
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _section = self.lock_section()?;
        self.read_slot(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let _section = self.lock_section()?;
        self.write_slot(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _section = self.lock_section()?;
        self.delete_slot(key)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        let _section = self.lock_section()?;
        section(&Held { store: self })
    }
}

struct Held<'a> {
    store: &'a MemoryStore,
}

impl KeyValueStore for Held<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.read_slot(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.store.write_slot(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store.delete_slot(key)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        section(self)
    }
}
