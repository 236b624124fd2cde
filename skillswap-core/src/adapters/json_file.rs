//! JSON file key-value store
//!
//! One `<key>.json` file per slot inside a directory. Writes go to a temp
//! file in the same directory and are renamed into place, so readers never
//! see a half-written slot. A lock file serializes access across processes.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

const LOCK_FILE: &str = ".skillswap.lock";

/// Slot storage as plain JSON files
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` for slot files, creating it if needed
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::validation(format!("invalid slot key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn lock_file(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(file)
    }

    /// Run `f` while holding the lock file
    fn locked<T>(&self, exclusive: bool, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        if exclusive {
            lock.lock_exclusive()?;
        } else {
            lock.lock_shared()?;
        }

        let result = f();

        lock.unlock()?;
        result
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn delete_slot(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.locked(false, || self.read_slot(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.locked(true, || self.write_slot(key, value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.locked(true, || self.delete_slot(key))
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        self.locked(true, || section(&LockHeld { store: self }))
    }
}

/// Slot access for code already holding the exclusive lock
///
/// Taking the lock file again from here would wait on ourselves.
struct LockHeld<'a> {
    store: &'a JsonFileStore,
}

impl KeyValueStore for LockHeld<'_> {
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
        self.store.backend_name()
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        section(self)
    }
}
