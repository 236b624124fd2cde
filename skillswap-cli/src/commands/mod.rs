//! CLI command implementations

pub mod account;
pub mod book;
pub mod logs;
pub mod profile;
pub mod sessions;
pub mod status;
pub mod tags;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use skillswap_core::{EntryPoint, LogEvent, LoggingService, SkillSwapContext, User};

static LOGGER: OnceLock<Option<LoggingService>> = OnceLock::new();

fn open_logger() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

/// Get the logging service for CLI operations
///
/// Opened once per process. Returns None if logging fails to initialize
/// (shouldn't block operations)
pub fn get_logger() -> Option<&'static LoggingService> {
    LOGGER.get_or_init(|| open_logger().ok()).as_ref()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SKILLSWAP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".skillswap"))
        .ok_or_else(|| anyhow!("Could not find home directory; set SKILLSWAP_DIR"))
}

/// Open the marketplace in the data directory
pub fn get_context() -> Result<SkillSwapContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    SkillSwapContext::new(&data_dir).context("Failed to open SkillSwap data")
}

/// The signed-in user, or an error telling how to sign in
pub fn require_user(ctx: &SkillSwapContext) -> Result<User> {
    ctx.identity
        .current_user()
        .cloned()
        .ok_or_else(|| anyhow!("Not signed in. Run `skillswap login <email>` or `skillswap signup`."))
}

/// Split comma-separated input into tags
pub fn parse_tags(raw: &[String]) -> Vec<String> {
    let split: Vec<String> = raw
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::to_string)
        .collect();
    skillswap_core::domain::validation::normalize_tags(&split)
}
