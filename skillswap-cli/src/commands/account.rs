//! Account commands - sign up, sign in, sign out

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Password;
use skillswap_core::domain::validation::{validate_email, validate_profile, validate_signup};
use skillswap_core::services::RegisterOutcome;
use skillswap_core::{LogEvent, OperationResult, User};

use super::{get_context, get_logger, log_event, parse_tags, require_user};
use crate::output;

fn read_password(given: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub fn signup(
    name: &str,
    email: &str,
    skills: Vec<String>,
    password: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let logger = get_logger();
    let skills = parse_tags(&skills);
    let email = email.trim();

    validate_email(email)?;
    validate_profile(name, &skills)?;
    let password = read_password(password, !json)?;
    validate_signup(name, email, &password, &skills)?;

    let mut ctx = get_context()?;
    let outcome = ctx.identity.register(name.trim(), email, &password, skills)?;

    match outcome {
        RegisterOutcome::Registered { user } => {
            log_event(logger, LogEvent::new("signed_up").with_command("signup").with_outcome("registered"));
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(user))?);
            } else {
                output::success(&format!("Welcome, {}!", user.name));
                println!("You start with {}.", output::credits(user.credits).bold());
            }
            Ok(ExitCode::SUCCESS)
        }
        RegisterOutcome::EmailTaken => {
            log_event(logger, LogEvent::new("signup_rejected").with_command("signup").with_outcome("email_taken"));
            let message = "An account with that email already exists";
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::<User>::fail(message))?);
            } else {
                output::error(message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn login(email: &str, password: Option<String>, json: bool) -> Result<ExitCode> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    // Password-less legacy accounts sign in without a prompt
    let password = match password {
        Some(p) => p,
        None if json => String::new(),
        None => read_password(None, false)?,
    };

    match ctx.identity.authenticate(email.trim(), &password)? {
        Some(user) => {
            log_event(logger, LogEvent::new("logged_in").with_command("login").with_outcome("ok"));
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(user))?);
            } else {
                output::success(&format!("Signed in as {}", user.name));
                println!("Balance: {}", output::credits(user.credits).bold());
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            log_event(logger, LogEvent::new("login_failed").with_command("login").with_outcome("rejected"));
            let message = "Invalid email or password";
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::<User>::fail(message))?);
            } else {
                output::error(message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn logout() -> Result<ExitCode> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    if ctx.identity.current_user().is_none() {
        output::info("Not signed in.");
        return Ok(ExitCode::SUCCESS);
    }

    ctx.identity.end_session()?;
    log_event(logger, LogEvent::new("logged_out").with_command("logout"));
    output::success("Signed out.");
    Ok(ExitCode::SUCCESS)
}

pub fn whoami(json: bool) -> Result<ExitCode> {
    let ctx = get_context()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.identity.current_user())?);
        return Ok(ExitCode::SUCCESS);
    }

    let user = require_user(&ctx)?;
    output::print_user(&user);
    Ok(ExitCode::SUCCESS)
}
