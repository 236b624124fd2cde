//! Example marketplace data
//!
//! Loaded into an empty store the first time the session list is read, so a
//! fresh install has something to browse. Tutors here are not registered
//! users; they only exist as names on their sessions.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::Session;

/// Tag palette offered when posting sessions and editing profiles
pub const AVAILABLE_TAGS: &[&str] = &[
    "Programming",
    "Design",
    "Music",
    "Languages",
    "Math",
    "Science",
    "Writing",
    "Photography",
    "Cooking",
    "Fitness",
    "Business",
    "Art",
];

const SARAH: Uuid = Uuid::from_u128(0x5a4a_0000_0000_4000_8000_0000_0000_0001);
const MARCUS: Uuid = Uuid::from_u128(0x5a4a_0000_0000_4000_8000_0000_0000_0002);
const ELENA: Uuid = Uuid::from_u128(0x5a4a_0000_0000_4000_8000_0000_0000_0003);
const DAVID: Uuid = Uuid::from_u128(0x5a4a_0000_0000_4000_8000_0000_0000_0004);
const PRIYA: Uuid = Uuid::from_u128(0x5a4a_0000_0000_4000_8000_0000_0000_0005);

fn seed_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5e55_0000_0000_4000_8000_0000_0000_0000 | n)
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn session(
    n: u128,
    tutor_id: Uuid,
    tutor_name: &str,
    title: &str,
    description: &str,
    duration: u32,
    credit_cost: u32,
    tags: &[&str],
    created_at: DateTime<Utc>,
) -> Session {
    Session {
        id: seed_id(n),
        tutor_id,
        tutor_name: tutor_name.to_string(),
        skill_title: title.to_string(),
        description: description.to_string(),
        duration,
        credit_cost,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at,
        is_booked: false,
    }
}

/// Example sessions, most recent first
pub fn generate_seed_sessions() -> Vec<Session> {
    vec![
        session(
            1,
            SARAH,
            "Sarah Chen",
            "React Hooks Deep Dive",
            "Learn useState, useEffect and custom hooks by refactoring a small app together.",
            60,
            3,
            &["Programming", "Design"],
            at(14, 16),
        ),
        session(
            2,
            MARCUS,
            "Marcus Johnson",
            "Guitar Basics for Beginners",
            "Open chords, strumming patterns and your first full song.",
            45,
            2,
            &["Music"],
            at(13, 11),
        ),
        session(
            3,
            ELENA,
            "Elena Rodriguez",
            "Conversational Spanish",
            "Practice everyday conversation with a native speaker. All levels welcome.",
            30,
            2,
            &["Languages"],
            at(12, 9),
        ),
        session(
            4,
            DAVID,
            "David Kim",
            "Portrait Photography Lighting",
            "One-light and two-light setups you can build at home.",
            90,
            5,
            &["Photography", "Art"],
            at(10, 18),
        ),
        session(
            5,
            PRIYA,
            "Priya Patel",
            "Calculus Without Tears",
            "Limits and derivatives explained with pictures instead of proofs.",
            60,
            4,
            &["Math", "Science"],
            at(8, 14),
        ),
        session(
            6,
            MARCUS,
            "Marcus Johnson",
            "Home Cooking: Knife Skills",
            "Dice, julienne and chiffonade safely and quickly.",
            15,
            1,
            &["Cooking"],
            at(5, 10),
        ),
    ]
}
