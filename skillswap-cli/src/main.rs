//! SkillSwap CLI - trade skills for credits from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::logs::LogsCommands;
use commands::profile::ProfileCommands;
use commands::sessions::SessionsCommands;
use commands::{account, book, get_logger, log_event, logs, profile, sessions, status, tags};
use skillswap_core::LogEvent;

/// SkillSwap - peer-to-peer skill sharing
#[derive(Parser)]
#[command(name = "skillswap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address (must be unique)
        #[arg(long)]
        email: String,
        /// Comma-separated skill tags
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        /// Password (prompted if omitted)
        #[arg(long, env = "SKILLSWAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in with an existing account
    Login {
        /// Email address
        email: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "SKILLSWAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: Option<profile::ProfileCommands>,
    },

    /// Browse and post sessions
    Sessions {
        #[command(subcommand)]
        command: sessions::SessionsCommands,
    },

    /// Book a session, spending credits
    Book {
        /// Session ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show marketplace figures
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tags offered for sessions and skills
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Self::Signup { .. } => "signup",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Whoami { .. } => "whoami",
            Self::Profile { command: Some(ProfileCommands::Edit { .. }) } => "profile edit",
            Self::Profile { .. } => "profile show",
            Self::Sessions { command } => match command {
                SessionsCommands::List { .. } => "sessions list",
                SessionsCommands::Show { .. } => "sessions show",
                SessionsCommands::Post { .. } => "sessions post",
            },
            Self::Book { .. } => "book",
            Self::Status { .. } => "status",
            Self::Tags { .. } => "tags",
            Self::Logs { command } => match command {
                LogsCommands::List { .. } => "logs list",
                LogsCommands::Clear { .. } => "logs clear",
                LogsCommands::Stats { .. } => "logs stats",
            },
        }
    }
}

/// Log label for a failed command: the core error kind, never its message
fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<skillswap_core::Error>())
        .map(skillswap_core::Error::kind)
        .unwrap_or("internal")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();

    let logger = get_logger();
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log_event(
                logger,
                LogEvent::new("command_failed")
                    .with_command(command)
                    .with_error(error_kind(&e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Signup { name, email, skills, password, json } => {
            account::signup(&name, &email, skills, password, json)
        }
        Commands::Login { email, password, json } => account::login(&email, password, json),
        Commands::Logout => account::logout(),
        Commands::Whoami { json } => account::whoami(json),
        Commands::Profile { command } => profile::run(command),
        Commands::Sessions { command } => sessions::run(command),
        Commands::Book { id, yes, json } => book::run(&id, yes, json),
        Commands::Status { json } => status::run(json),
        Commands::Tags { json } => tags::run(json),
        Commands::Logs { command } => logs::run(command),
    }
}
