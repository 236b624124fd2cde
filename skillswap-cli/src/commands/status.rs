//! Status command - marketplace figures from the dashboard

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use skillswap_core::services::{dashboard_stats, SessionFilter};

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<ExitCode> {
    let ctx = get_context()?;
    let browsable = ctx.browse(SessionFilter::default());
    let stats = dashboard_stats(ctx.sessions.sessions(), &browsable);
    let user = ctx.identity.current_user();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "stats": stats,
                "user": user,
                "backend": ctx.store.backend_name(),
                "dataDir": ctx.data_dir.to_string_lossy(),
            })
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "SkillSwap".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Available sessions", &stats.available_sessions.to_string()]);
    table.add_row(vec!["Tutors", &stats.total_tutors.to_string()]);
    table.add_row(vec!["Total sessions", &stats.total_sessions.to_string()]);
    println!("{}", table);
    println!();

    match user {
        Some(user) => println!(
            "Signed in as {} ({})",
            user.name.bold(),
            output::credits(user.credits)
        ),
        None => println!("{}", "Not signed in".dimmed()),
    }
    println!(
        "Storage: {} in {}",
        ctx.store.backend_name(),
        ctx.data_dir.display()
    );

    Ok(ExitCode::SUCCESS)
}
