//! Profile command - show stats for the signed-in user and edit details

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use skillswap_core::domain::validation::validate_profile;
use skillswap_core::services::profile_summary;
use skillswap_core::{LogEvent, UserUpdate};

use super::{get_context, get_logger, log_event, parse_tags, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile, stats, and sessions
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change your name, skills, or avatar
    Edit {
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// Comma-separated skill tags (replaces the current list)
        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,
        /// Avatar reference (URL or path)
        #[arg(long)]
        avatar: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Option<ProfileCommands>) -> Result<ExitCode> {
    match command.unwrap_or(ProfileCommands::Show { json: false }) {
        ProfileCommands::Show { json } => show(json),
        ProfileCommands::Edit { name, skills, avatar, json } => edit(name, skills, avatar, json),
    }
}

fn show(json: bool) -> Result<ExitCode> {
    let ctx = get_context()?;
    let user = require_user(&ctx)?;
    let summary = profile_summary(&user, ctx.sessions.sessions());

    if json {
        println!(
            "{}",
            serde_json::json!({ "user": user, "summary": summary })
        );
        return Ok(ExitCode::SUCCESS);
    }

    output::print_user(&user);
    println!();
    println!("{}", "Stats".bold());
    println!("  Sessions posted: {}", summary.sessions_posted);
    println!("  Credits earned:  {}", summary.credits_earned);
    println!("  Sessions taken:  {}", summary.sessions_taken);

    if !summary.posted.is_empty() {
        println!();
        println!("{}", "Your sessions".bold());
        println!("{}", output::session_table(&summary.posted));
    }
    if !summary.booked.is_empty() {
        println!();
        println!("{}", "Booked sessions".bold());
        println!("{}", output::session_table(&summary.booked));
    }

    Ok(ExitCode::SUCCESS)
}

fn edit(
    name: Option<String>,
    skills: Option<Vec<String>>,
    avatar: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let logger = get_logger();
    let mut ctx = get_context()?;
    let user = require_user(&ctx)?;

    let update = UserUpdate {
        name: name.map(|n| n.trim().to_string()),
        skill_tags: skills.map(|s| parse_tags(&s)),
        avatar,
        ..Default::default()
    };
    if update.is_empty() {
        output::warning("Nothing to change. Pass --name, --skills or --avatar.");
        return Ok(ExitCode::SUCCESS);
    }

    validate_profile(
        update.name.as_deref().unwrap_or(&user.name),
        update.skill_tags.as_deref().unwrap_or(&user.skill_tags),
    )?;

    let updated = ctx.identity.merge_update(&update)?;
    log_event(logger, LogEvent::new("profile_updated").with_command("profile edit"));

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        output::success("Profile updated.");
        if let Some(user) = &updated {
            output::print_user(user);
        }
    }
    Ok(ExitCode::SUCCESS)
}
