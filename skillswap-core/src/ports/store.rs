//! Key-value store port - persistence abstraction

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::{Error, Result};

/// Slot holding the ordered session collection
pub const SESSIONS_KEY: &str = "skillswap_sessions";

/// Slot holding the signed-in user, absent when signed out
pub const CURRENT_USER_KEY: &str = "skillswap_user";

/// Slot holding the user registry
pub const USERS_KEY: &str = "skillswap_users";

/// Slot holding password hashes keyed by user id
pub const CREDENTIALS_KEY: &str = "skillswap_credentials";

/// Durable key-value storage with whole-value semantics
///
/// Every slot holds one complete JSON document. Writers always replace the
/// full value; there is no partial patching.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value of a slot
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Name of the backend, for status output
    fn backend_name(&self) -> &'static str;

    /// Run `section` with exclusive access to every slot.
    ///
    /// No other writer, in this process or another one sharing the same
    /// data, touches the store until `section` returns. Reads and writes
    /// inside the section must go through the handle it is given; calling
    /// back into `self` from inside may block.
    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()>;
}

/// Run `f` inside an exclusive section and hand back its value
///
/// Use for read-check-write sequences that must not interleave with
/// another writer.
pub fn exclusive<T>(
    store: &dyn KeyValueStore,
    f: impl FnOnce(&dyn KeyValueStore) -> Result<T>,
) -> Result<T> {
    let mut f = Some(f);
    let mut value = None;
    store.with_exclusive(&mut |slots: &dyn KeyValueStore| {
        let f = f
            .take()
            .ok_or_else(|| Error::storage("exclusive section entered twice"))?;
        value = Some(f(slots)?);
        Ok(())
    })?;
    value.ok_or_else(|| Error::storage("exclusive section did not run"))
}

/// Read a slot and decode it as JSON
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode a value as JSON and overwrite the slot
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.put(key, &raw)
}
