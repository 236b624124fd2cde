//! Integration tests for skillswap-core
//!
//! These run the stores and the booking flow end to end against real
//! DuckDB files and real JSON slot directories, then reopen the data to make
//! sure what was written is what comes back.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use skillswap_core::adapters::duckdb::DuckDbStore;
use skillswap_core::adapters::json_file::JsonFileStore;
use skillswap_core::adapters::seed::generate_seed_sessions;
use skillswap_core::config::{Config, StorageBackend};
use skillswap_core::domain::Argon2Params;
use skillswap_core::ports::{
    load_json, KeyValueStore, CREDENTIALS_KEY, CURRENT_USER_KEY, SESSIONS_KEY, USERS_KEY,
};
use skillswap_core::services::{BookingResult, RegisterOutcome, SessionFilter};
use skillswap_core::{Session, SkillSwapContext, User, UserUpdate};

// ============================================================================
// Test Helpers
// ============================================================================

fn duckdb_store(dir: &Path) -> Arc<dyn KeyValueStore> {
    Arc::new(DuckDbStore::open(&dir.join("skillswap.duckdb")).expect("Failed to open DuckDB store"))
}

fn json_store(dir: &Path) -> Arc<dyn KeyValueStore> {
    Arc::new(JsonFileStore::open(&dir.join("data")).expect("Failed to open JSON store"))
}

fn context(dir: &Path, store: Arc<dyn KeyValueStore>) -> SkillSwapContext {
    SkillSwapContext::with_store(Config::default(), dir, store, Argon2Params::minimal())
        .expect("Failed to build context")
}

fn register(ctx: &mut SkillSwapContext, name: &str, email: &str) -> User {
    match ctx
        .identity
        .register(name, email, "hunter2", vec!["Music".to_string()])
        .unwrap()
    {
        RegisterOutcome::Registered { user } => user,
        RegisterOutcome::EmailTaken => panic!("{} should be a new email", email),
    }
}

/// Seeded session costing 3 credits
fn three_credit_session() -> Uuid {
    generate_seed_sessions()
        .into_iter()
        .find(|s| s.credit_cost == 3)
        .map(|s| s.id)
        .expect("seed data has a 3-credit session")
}

// ============================================================================
// Booking
// ============================================================================

#[test]
fn test_booking_debits_and_persists_both_stores() {
    let temp_dir = TempDir::new().unwrap();
    let session_id = three_credit_session();

    {
        let mut ctx = context(temp_dir.path(), duckdb_store(temp_dir.path()));
        let user = register(&mut ctx, "Ana", "ana@example.com");
        assert_eq!(user.credits, 5);

        match ctx.book(session_id).unwrap() {
            BookingResult::Booked { session, remaining_credits } => {
                assert_eq!(remaining_credits, 2);
                assert!(session.is_booked);
            }
            other => panic!("expected booking to succeed, got {:?}", other),
        }
    }

    // Reopen from disk
    let store = duckdb_store(temp_dir.path());
    let ctx = context(temp_dir.path(), Arc::clone(&store));

    assert!(ctx.sessions.get(session_id).unwrap().is_booked);
    assert_eq!(ctx.identity.current_user().unwrap().credits, 2);

    let users: Vec<User> = load_json(store.as_ref(), USERS_KEY).unwrap().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].credits, 2);
}

#[test]
fn test_insufficient_credits_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = duckdb_store(temp_dir.path());
    let session_id = three_credit_session();

    let mut ctx = context(temp_dir.path(), Arc::clone(&store));
    register(&mut ctx, "Ana", "ana@example.com");
    ctx.identity.merge_update(&UserUpdate::credits(2)).unwrap();

    let result = ctx.book(session_id).unwrap();
    assert_eq!(result, BookingResult::InsufficientCredits { credits: 2, cost: 3 });

    let sessions: Vec<Session> = load_json(store.as_ref(), SESSIONS_KEY).unwrap().unwrap();
    let stored = sessions.iter().find(|s| s.id == session_id).unwrap();
    assert!(!stored.is_booked);
    let current: User = load_json(store.as_ref(), CURRENT_USER_KEY).unwrap().unwrap();
    assert_eq!(current.credits, 2);
}

#[test]
fn test_second_booking_of_same_session_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let session_id = three_credit_session();

    let mut ctx = context(temp_dir.path(), json_store(temp_dir.path()));
    register(&mut ctx, "Ana", "ana@example.com");
    assert!(ctx.book(session_id).unwrap().succeeded());

    ctx.identity.end_session().unwrap();
    register(&mut ctx, "Bea", "bea@example.com");

    assert_eq!(ctx.book(session_id).unwrap(), BookingResult::AlreadyBooked);
    assert_eq!(ctx.identity.current_user().unwrap().credits, 5);
}

#[test]
fn test_own_sessions_are_hidden_and_not_bookable() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = context(temp_dir.path(), duckdb_store(temp_dir.path()));
    register(&mut ctx, "Ana", "ana@example.com");

    let posted = ctx
        .post_session("Jazz Piano", "Voicings and comping", 30, 2, vec!["Music".to_string()])
        .unwrap()
        .expect("signed in");
    assert_eq!(ctx.sessions.sessions()[0].id, posted.id);

    let browsable = ctx.browse(SessionFilter::default());
    assert!(browsable.iter().all(|s| s.id != posted.id));
    assert_eq!(browsable.len(), generate_seed_sessions().len());

    assert_eq!(ctx.book(posted.id).unwrap(), BookingResult::OwnSession);
}

// ============================================================================
// Several contexts over the same data
// ============================================================================

/// Seeded session costing 2 credits
fn two_credit_session() -> Uuid {
    generate_seed_sessions()
        .into_iter()
        .find(|s| s.credit_cost == 2)
        .map(|s| s.id)
        .expect("seed data has a 2-credit session")
}

#[test]
fn test_two_contexts_over_one_directory_cannot_double_book() {
    let temp_dir = TempDir::new().unwrap();
    let session_id = three_credit_session();

    let mut a = context(temp_dir.path(), json_store(temp_dir.path()));
    register(&mut a, "Ana", "ana@example.com");

    // Loaded after sign-up but before any booking, with its own file handles
    let mut b = context(temp_dir.path(), json_store(temp_dir.path()));
    assert!(!b.sessions.get(session_id).unwrap().is_booked);

    assert!(a.book(session_id).unwrap().succeeded());
    assert_eq!(b.book(session_id).unwrap(), BookingResult::AlreadyBooked);

    // b sees the balance a left behind, not the 5 it loaded with
    match b.book(two_credit_session()).unwrap() {
        BookingResult::Booked { remaining_credits, .. } => assert_eq!(remaining_credits, 0),
        other => panic!("expected booking to succeed, got {:?}", other),
    }
    assert_eq!(b.book(Uuid::new_v4()).unwrap(), BookingResult::UnknownSession);

    let reopened = context(temp_dir.path(), json_store(temp_dir.path()));
    assert_eq!(reopened.identity.current_user().unwrap().credits, 0);
    assert_eq!(reopened.identity.users()[0].credits, 0);
}

#[test]
fn test_two_contexts_over_one_duckdb_store_share_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = duckdb_store(temp_dir.path());
    let session_id = three_credit_session();

    let mut a = context(temp_dir.path(), Arc::clone(&store));
    register(&mut a, "Ana", "ana@example.com");
    let mut b = context(temp_dir.path(), Arc::clone(&store));

    assert!(b.book(session_id).unwrap().succeeded());
    assert_eq!(a.book(session_id).unwrap(), BookingResult::AlreadyBooked);
    match a.book(two_credit_session()).unwrap() {
        BookingResult::Booked { remaining_credits, .. } => assert_eq!(remaining_credits, 0),
        other => panic!("expected booking to succeed, got {:?}", other),
    }
    assert_eq!(
        b.book(session_id).unwrap(),
        BookingResult::AlreadyBooked
    );
    assert_eq!(b.identity.current_user().unwrap().credits, 0);
}

#[test]
fn test_concurrent_bookings_from_separate_handles_book_once() {
    const THREAD_COUNT: usize = 4;

    let temp_dir = TempDir::new().unwrap();
    let session_id = three_credit_session();
    {
        let mut ctx = context(temp_dir.path(), json_store(temp_dir.path()));
        register(&mut ctx, "Ana", "ana@example.com");
    }

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let dir = temp_dir.path().to_path_buf();
            std::thread::spawn(move || {
                let mut ctx = context(&dir, json_store(&dir));
                ctx.book(session_id).unwrap()
            })
        })
        .collect();
    let results: Vec<BookingResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.succeeded()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| !r.succeeded())
        .all(|r| *r == BookingResult::AlreadyBooked));

    let ctx = context(temp_dir.path(), json_store(temp_dir.path()));
    assert_eq!(ctx.identity.current_user().unwrap().credits, 2);
}

#[test]
fn test_posts_from_a_stale_context_are_kept() {
    let temp_dir = TempDir::new().unwrap();

    let mut a = context(temp_dir.path(), json_store(temp_dir.path()));
    register(&mut a, "Ana", "ana@example.com");
    let mut b = context(temp_dir.path(), json_store(temp_dir.path()));

    let first = a
        .post_session("Jazz Piano", "Voicings", 30, 2, vec!["Music".to_string()])
        .unwrap()
        .unwrap();
    let second = b
        .post_session("Watercolour", "Washes", 45, 3, vec!["Art".to_string()])
        .unwrap()
        .unwrap();

    let ids: Vec<Uuid> = b.sessions.sessions().iter().take(2).map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let reopened = context(temp_dir.path(), json_store(temp_dir.path()));
    assert_eq!(reopened.sessions.sessions().len(), generate_seed_sessions().len() + 2);
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_register_sign_out_sign_in_keeps_registry() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut ctx = context(temp_dir.path(), duckdb_store(temp_dir.path()));
        let ana = register(&mut ctx, "Ana", "ana@example.com");
        let bea = register(&mut ctx, "Bea", "bea@example.com");
        assert_eq!(ctx.identity.current_user().unwrap().id, bea.id);

        ctx.identity.end_session().unwrap();
        assert!(ctx.identity.current_user().is_none());

        let signed_in = ctx
            .identity
            .authenticate("ana@example.com", "hunter2")
            .unwrap()
            .expect("Ana can sign in");
        assert_eq!(signed_in.id, ana.id);
    }

    let store = duckdb_store(temp_dir.path());
    let ctx = context(temp_dir.path(), Arc::clone(&store));
    assert_eq!(ctx.identity.current_user().unwrap().email, "ana@example.com");

    let emails: Vec<&str> = ctx.identity.users().iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["ana@example.com", "bea@example.com"]);

    let credentials: serde_json::Value = load_json(store.as_ref(), CREDENTIALS_KEY).unwrap().unwrap();
    assert_eq!(credentials.as_object().unwrap().len(), 2);
    assert!(!credentials.to_string().contains("hunter2"));
}

#[test]
fn test_duplicate_email_and_wrong_password() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = context(temp_dir.path(), json_store(temp_dir.path()));
    register(&mut ctx, "Ana", "ana@example.com");

    let again = ctx
        .identity
        .register("Other Ana", "ana@example.com", "pw", vec!["Art".to_string()])
        .unwrap();
    assert_eq!(again, RegisterOutcome::EmailTaken);
    assert_eq!(ctx.identity.users().len(), 1);

    ctx.identity.end_session().unwrap();
    assert!(ctx.identity.authenticate("ana@example.com", "wrong").unwrap().is_none());
    assert!(ctx.identity.authenticate("nobody@example.com", "hunter2").unwrap().is_none());
    assert!(ctx.identity.current_user().is_none());
}

#[test]
fn test_sign_out_removes_current_user_slot() {
    let temp_dir = TempDir::new().unwrap();
    let store = json_store(temp_dir.path());
    let mut ctx = context(temp_dir.path(), Arc::clone(&store));
    register(&mut ctx, "Ana", "ana@example.com");

    assert!(temp_dir.path().join("data").join(format!("{}.json", CURRENT_USER_KEY)).exists());
    ctx.identity.end_session().unwrap();
    assert!(!temp_dir.path().join("data").join(format!("{}.json", CURRENT_USER_KEY)).exists());
    assert!(store.get(USERS_KEY).unwrap().is_some());
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn test_first_load_seeds_and_persists_sessions() {
    let temp_dir = TempDir::new().unwrap();
    let store = duckdb_store(temp_dir.path());
    assert!(store.get(SESSIONS_KEY).unwrap().is_none());

    let ctx = context(temp_dir.path(), Arc::clone(&store));
    assert_eq!(ctx.sessions.sessions().len(), 6);

    let stored: Vec<Session> = load_json(store.as_ref(), SESSIONS_KEY).unwrap().unwrap();
    assert_eq!(stored, generate_seed_sessions());
}

#[test]
fn test_existing_collection_is_loaded_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let store = json_store(temp_dir.path());
    store.put(SESSIONS_KEY, "[]").unwrap();

    let ctx = context(temp_dir.path(), store);
    assert!(ctx.sessions.sessions().is_empty());
}

#[test]
fn test_migrations_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("skillswap.duckdb");

    let first = DuckDbStore::open(&db_path).unwrap();
    first.put("marker", "1").unwrap();
    let again = first.run_migrations().unwrap();
    assert!(again.applied.is_empty());
    drop(first);

    let reopened = DuckDbStore::open(&db_path).unwrap();
    assert_eq!(reopened.get("marker").unwrap().as_deref(), Some("1"));
    assert_eq!(reopened.keys().unwrap(), vec!["marker".to_string()]);
}

#[test]
fn test_context_honours_configured_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        storage_backend: StorageBackend::Json,
        require_password: false,
    };
    config.save(temp_dir.path()).unwrap();

    let ctx = SkillSwapContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.store.backend_name(), "json");
    assert!(temp_dir
        .path()
        .join("data")
        .join(format!("{}.json", SESSIONS_KEY))
        .exists());
    assert!(!temp_dir.path().join("skillswap.duckdb").exists());
}

#[test]
fn test_shared_store_survives_concurrent_writers() {
    const THREAD_COUNT: usize = 6;

    let temp_dir = TempDir::new().unwrap();
    for store in [duckdb_store(temp_dir.path()), json_store(temp_dir.path())] {
        let handles: Vec<_> = (0..THREAD_COUNT)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..5 {
                        store.put(&format!("slot_{}", i), &j.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..THREAD_COUNT {
            assert_eq!(
                store.get(&format!("slot_{}", i)).unwrap().as_deref(),
                Some("4"),
                "backend {}",
                store.backend_name()
            );
        }
    }
}
