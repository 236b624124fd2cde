//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod credential;
mod session;
mod user;
pub mod result;
pub mod validation;

pub use credential::{Argon2Params, Credential};
pub use session::{NewSession, Session, SESSION_COSTS, SESSION_DURATIONS};
pub use user::{User, UserUpdate, STARTING_CREDITS};
