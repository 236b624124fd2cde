//! Credential domain models

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters for password hashing
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// Argon2id parameters for password hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

impl Argon2Params {
    /// Smallest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            time_cost: 1,
            memory_cost: 8,
            parallelism: 1,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

/// Stored password hash for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Base64-encoded random salt
    pub salt: String,
    /// Base64-encoded Argon2id digest
    pub hash: String,
    pub algorithm: String,
    pub argon2_params: Argon2Params,
}

impl Credential {
    pub fn new(salt: String, hash: String, argon2_params: Argon2Params) -> Self {
        Self {
            salt,
            hash,
            algorithm: "argon2id".to_string(),
            argon2_params,
        }
    }
}
