//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use skillswap_core::{Session, User};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// "1 credit" / "3 credits"
pub fn credits(n: u32) -> String {
    if n == 1 {
        "1 credit".to_string()
    } else {
        format!("{} credits", n)
    }
}

/// Table of sessions, one row each
pub fn session_table<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Skill", "Tutor", "Length", "Cost", "Tags", "Status"]);

    for session in sessions {
        let status = if session.is_booked {
            "booked".dimmed().to_string()
        } else {
            "open".green().to_string()
        };
        table.add_row(vec![
            session.id.to_string(),
            session.skill_title.clone(),
            session.tutor_name.clone(),
            format!("{} min", session.duration),
            credits(session.credit_cost),
            session.tags.join(", "),
            status,
        ]);
    }

    table
}

/// Key-value summary of a user
pub fn print_user(user: &User) {
    let mut table = create_table();
    table.add_row(vec!["Name", &user.name]);
    table.add_row(vec!["Email", &user.email]);
    table.add_row(vec!["Credits", &user.credits.to_string()]);
    table.add_row(vec!["Skills", &user.skill_tags.join(", ")]);
    if let Some(avatar) = &user.avatar {
        table.add_row(vec!["Avatar", avatar]);
    }
    println!("{}", table);
}
