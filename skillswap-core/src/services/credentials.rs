//! Credential service - password hashing and verification
//!
//! Uses Argon2id with a random per-user salt. Hashes live in their own slot,
//! keyed by user id, so user records never carry secrets.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use rand::Rng;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, Credential};
use crate::ports::{load_json, save_json, KeyValueStore, CREDENTIALS_KEY};

const SALT_LEN: usize = 16;

/// Stores and checks password hashes
pub struct CredentialService {
    store: Arc<dyn KeyValueStore>,
    params: Argon2Params,
}

impl CredentialService {
    pub fn new(store: Arc<dyn KeyValueStore>, params: Argon2Params) -> Self {
        Self { store, params }
    }

    fn derive(password: &str, salt: &[u8], params: &Argon2Params) -> Result<Vec<u8>> {
        let argon2_params = argon2::Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(params.hash_len as usize),
        )
        .map_err(|e| Error::credential(format!("Invalid argon2 params: {:?}", e)))?;

        let argon2 = argon2::Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2_params,
        );

        let mut hash = vec![0u8; params.hash_len as usize];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut hash)
            .map_err(|e| Error::credential(format!("Failed to hash password: {:?}", e)))?;
        Ok(hash)
    }

    fn load_all(slots: &dyn KeyValueStore) -> Result<HashMap<Uuid, Credential>> {
        Ok(load_json(slots, CREDENTIALS_KEY)?.unwrap_or_default())
    }

    /// Hash `password` with a fresh salt. Nothing is stored.
    pub fn issue(&self, password: &str) -> Result<Credential> {
        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        let hash = Self::derive(password, &salt, &self.params)?;

        let engine = base64::engine::general_purpose::STANDARD;
        Ok(Credential::new(engine.encode(salt), engine.encode(hash), self.params.clone()))
    }

    /// Store `credential` for `user_id`, replacing any previous one
    pub(crate) fn save_in(
        slots: &dyn KeyValueStore,
        user_id: Uuid,
        credential: Credential,
    ) -> Result<()> {
        let mut all = Self::load_all(slots)?;
        all.insert(user_id, credential);
        save_json(slots, CREDENTIALS_KEY, &all)
    }

    /// Check `password` against the stored hash.
    ///
    /// Returns `None` when no hash is on file for the user.
    pub fn verify(&self, user_id: Uuid, password: &str) -> Result<Option<bool>> {
        let all = Self::load_all(self.store.as_ref())?;
        let Some(credential) = all.get(&user_id) else {
            return Ok(None);
        };

        let engine = base64::engine::general_purpose::STANDARD;
        let salt = engine
            .decode(&credential.salt)
            .map_err(|e| Error::credential(format!("Invalid salt: {}", e)))?;
        let expected = engine
            .decode(&credential.hash)
            .map_err(|e| Error::credential(format!("Invalid hash: {}", e)))?;

        let actual = Self::derive(password, &salt, &credential.argon2_params)?;
        Ok(Some(constant_time_eq(&actual, &expected)))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
