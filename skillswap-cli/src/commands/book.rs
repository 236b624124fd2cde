//! Book command - spend credits on a session

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use skillswap_core::services::BookingResult;
use skillswap_core::LogEvent;

use super::sessions::parse_session_id;
use super::{get_context, get_logger, log_event, require_user};
use crate::output;

pub fn run(id: &str, yes: bool, json: bool) -> Result<ExitCode> {
    let logger = get_logger();
    let mut ctx = get_context()?;
    let session_id = parse_session_id(id)?;

    if !yes && !json {
        // Nothing to confirm if the request is going to be turned down anyway
        if let (Ok(user), Some(session)) = (require_user(&ctx), ctx.sessions.get(session_id)) {
            if !session.is_booked && session.tutor_id != user.id && user.credits >= session.credit_cost {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Book \"{}\" with {} for {}? ({} left afterwards)",
                        session.skill_title,
                        session.tutor_name,
                        output::credits(session.credit_cost),
                        user.credits - session.credit_cost
                    ))
                    .default(true)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(ExitCode::SUCCESS);
                }
            }
        }
    }

    let result = ctx.book(session_id)?;

    let event = if result.succeeded() { "session_booked" } else { "booking_rejected" };
    log_event(logger, LogEvent::new(event).with_command("book").with_outcome(result.label()));

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match &result {
            BookingResult::Booked { session, remaining_credits } => {
                output::success(&format!("Booked \"{}\" with {}", session.skill_title, session.tutor_name));
                println!("Remaining balance: {}", output::credits(*remaining_credits).bold());
            }
            BookingResult::NotSignedIn => {
                output::error("Not signed in. Run `skillswap login <email>` first.")
            }
            BookingResult::UnknownSession => output::error("Session not found"),
            BookingResult::AlreadyBooked => output::error("That session has already been booked"),
            BookingResult::OwnSession => output::error("You cannot book your own session"),
            BookingResult::InsufficientCredits { credits, cost } => output::error(&format!(
                "Not enough credits: this session costs {} and you have {}",
                output::credits(*cost),
                output::credits(*credits)
            )),
        }
    }

    Ok(if result.succeeded() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
