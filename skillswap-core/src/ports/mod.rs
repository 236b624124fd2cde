//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod store;

pub use store::{
    exclusive, load_json, save_json, KeyValueStore, CREDENTIALS_KEY, CURRENT_USER_KEY, SESSIONS_KEY,
    USERS_KEY,
};
