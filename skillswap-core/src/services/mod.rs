//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod booking;
pub mod catalog;
mod credentials;
mod identity;
pub mod logging;
pub mod migration;
mod sessions;

pub use booking::{BookingResult, BookingService};
pub use catalog::{dashboard_stats, profile_summary, DashboardStats, ProfileSummary, SessionFilter};
pub use credentials::CredentialService;
pub use identity::{IdentityStore, RegisterOutcome};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use sessions::{BookOutcome, SessionStore};
