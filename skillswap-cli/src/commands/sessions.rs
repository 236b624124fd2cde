//! Sessions command - browse, inspect and post sessions

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use skillswap_core::domain::validation::validate_new_session;
use skillswap_core::domain::{SESSION_COSTS, SESSION_DURATIONS};
use skillswap_core::services::SessionFilter;
use skillswap_core::{LogEvent, NewSession, OperationResult, Session};
use uuid::Uuid;

use super::{get_context, get_logger, log_event, parse_tags, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum SessionsCommands {
    /// List sessions offered by other users
    List {
        /// Search title, description and tutor name
        #[arg(short, long)]
        search: Option<String>,
        /// Only sessions with any of these tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,
        /// Hide booked sessions
        #[arg(long)]
        available: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one session
    Show {
        /// Session ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Offer a new session
    Post {
        /// Skill you will teach
        #[arg(long)]
        title: String,
        /// What the session covers
        #[arg(long)]
        description: String,
        /// Length in minutes (15, 30, 45, 60 or 90)
        #[arg(long, default_value = "60")]
        duration: u32,
        /// Credits charged (1-5)
        #[arg(long, default_value = "1")]
        cost: u32,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',', required = true)]
        tags: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: SessionsCommands) -> Result<ExitCode> {
    match command {
        SessionsCommands::List { search, tag, available, json } => list(search, tag, available, json),
        SessionsCommands::Show { id, json } => show(&id, json),
        SessionsCommands::Post { title, description, duration, cost, tags, json } => {
            post(&title, &description, duration, cost, tags, json)
        }
    }
}

pub fn parse_session_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).with_context(|| format!("'{}' is not a valid session ID", id))
}

fn list(search: Option<String>, tags: Vec<String>, available: bool, json: bool) -> Result<ExitCode> {
    let ctx = get_context()?;
    let filter = SessionFilter {
        search,
        tags: parse_tags(&tags),
        only_available: available,
        ..Default::default()
    };
    let shown = ctx.browse(filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(ExitCode::SUCCESS);
    }

    if shown.is_empty() {
        println!("No sessions match.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", output::session_table(shown.iter().copied()));
    Ok(ExitCode::SUCCESS)
}

fn show(id: &str, json: bool) -> Result<ExitCode> {
    let ctx = get_context()?;
    let id = parse_session_id(id)?;

    let Some(session) = ctx.sessions.get(id) else {
        if json {
            println!("{}", serde_json::to_string_pretty(&OperationResult::<Session>::fail("Session not found"))?);
        } else {
            output::error("Session not found");
        }
        return Ok(ExitCode::FAILURE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", session.skill_title.bold());
    println!("{}", session.description);
    println!();
    let mut table = output::create_table();
    table.add_row(vec!["Tutor", &session.tutor_name]);
    table.add_row(vec!["Length", &format!("{} min", session.duration)]);
    table.add_row(vec!["Cost", &output::credits(session.credit_cost)]);
    table.add_row(vec!["Tags", &session.tags.join(", ")]);
    table.add_row(vec!["Posted", &session.created_at.format("%Y-%m-%d %H:%M").to_string()]);
    table.add_row(vec!["Status", if session.is_booked { "booked" } else { "open" }]);
    println!("{}", table);

    Ok(ExitCode::SUCCESS)
}

fn post(
    title: &str,
    description: &str,
    duration: u32,
    cost: u32,
    tags: Vec<String>,
    json: bool,
) -> Result<ExitCode> {
    let logger = get_logger();
    let mut ctx = get_context()?;
    let user = require_user(&ctx)?;

    let new = NewSession {
        tutor_id: user.id,
        tutor_name: user.name.clone(),
        skill_title: title.trim().to_string(),
        description: description.trim().to_string(),
        duration,
        credit_cost: cost,
        tags: parse_tags(&tags),
    };
    if let Err(e) = validate_new_session(&new) {
        log_event(logger, LogEvent::new("session_rejected").with_command("sessions post").with_outcome("invalid"));
        anyhow::bail!(
            "{}\n  durations: {:?}\n  costs: {:?}",
            e,
            SESSION_DURATIONS,
            SESSION_COSTS
        );
    }

    let session = ctx.sessions.create_session(new)?;
    log_event(logger, LogEvent::new("session_posted").with_command("sessions post"));

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(session))?);
    } else {
        output::success(&format!("Posted \"{}\"", session.skill_title));
        println!("ID: {}", session.id);
    }
    Ok(ExitCode::SUCCESS)
}
