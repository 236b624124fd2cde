//! Identity store - the user registry and the signed-in user

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Argon2Params, User, UserUpdate};
use crate::ports::{exclusive, load_json, save_json, KeyValueStore, CURRENT_USER_KEY, USERS_KEY};
use crate::services::CredentialService;

/// Outcome of a sign-up attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegisterOutcome {
    Registered { user: User },
    EmailTaken,
}

impl RegisterOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Registry and current-user state, loaded once and written through
///
/// Changes to the registry re-read both slots inside an exclusive section,
/// so a stale copy never drops users or balances written by someone else.
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialService,
    require_password: bool,
    users: Vec<User>,
    current: Option<User>,
}

impl IdentityStore {
    /// Load registry and current user from the store.
    ///
    /// With `require_password`, users that have no password on file can no
    /// longer sign in by email alone.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        params: Argon2Params,
        require_password: bool,
    ) -> Result<Self> {
        let credentials = CredentialService::new(Arc::clone(&store), params);
        let mut identity = Self {
            store: Arc::clone(&store),
            credentials,
            require_password,
            users: Vec::new(),
            current: None,
        };
        identity.refresh(store.as_ref())?;
        Ok(identity)
    }

    /// Replace the cached registry and current user with what `slots` holds
    pub(crate) fn refresh(&mut self, slots: &dyn KeyValueStore) -> Result<()> {
        self.users = load_json(slots, USERS_KEY)?.unwrap_or_default();
        self.current = load_json(slots, CURRENT_USER_KEY)?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Every registered user, in sign-up order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    fn set_current(&mut self, user: User) -> Result<()> {
        save_json(self.store.as_ref(), CURRENT_USER_KEY, &user)?;
        self.current = Some(user);
        Ok(())
    }

    /// Sign in by email. Never touches the registry.
    ///
    /// Returns the signed-in user, or `None` if no user has that email or
    /// the password does not match the one on file.
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).cloned() else {
            return Ok(None);
        };

        let accepted = match self.credentials.verify(user.id, password)? {
            Some(matches) => matches,
            None => !self.require_password,
        };
        if !accepted {
            return Ok(None);
        }

        self.set_current(user.clone())?;
        Ok(Some(user))
    }

    /// Create an account with the starting balance and sign it in
    ///
    /// The registry entry is written before the credential. If the
    /// credential cannot be stored the entry is taken back out, so no
    /// account is left that signs in without its password.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        skill_tags: Vec<String>,
    ) -> Result<RegisterOutcome> {
        if self.find_by_email(email).is_some() {
            return Ok(RegisterOutcome::EmailTaken);
        }
        // Hash outside the section; it is the slow part
        let credential = self.credentials.issue(password)?;

        let store = Arc::clone(&self.store);
        exclusive(store.as_ref(), |slots| {
            self.refresh(slots)?;
            if self.find_by_email(email).is_some() {
                return Ok(RegisterOutcome::EmailTaken);
            }

            let user = User::new(name, email, skill_tags);
            let mut users = self.users.clone();
            users.push(user.clone());
            save_json(slots, USERS_KEY, &users)?;

            if let Err(e) = CredentialService::save_in(slots, user.id, credential) {
                let _ = save_json(slots, USERS_KEY, &self.users);
                return Err(e);
            }
            self.users = users;

            save_json(slots, CURRENT_USER_KEY, &user)?;
            self.current = Some(user.clone());
            Ok(RegisterOutcome::Registered { user })
        })
    }

    /// Sign out. The registry is left alone.
    pub fn end_session(&mut self) -> Result<()> {
        self.store.remove(CURRENT_USER_KEY)?;
        self.current = None;
        Ok(())
    }

    /// Merge fields into the signed-in user and its registry entry.
    ///
    /// Returns the updated user, or `None` when no one is signed in.
    pub fn merge_update(&mut self, update: &UserUpdate) -> Result<Option<User>> {
        let store = Arc::clone(&self.store);
        exclusive(store.as_ref(), |slots| self.merge_update_in(slots, update))
    }

    /// `merge_update` for a caller already inside an exclusive section
    pub(crate) fn merge_update_in(
        &mut self,
        slots: &dyn KeyValueStore,
        update: &UserUpdate,
    ) -> Result<Option<User>> {
        self.refresh(slots)?;
        let Some(current) = &self.current else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply(update);

        let users: Vec<User> = self
            .users
            .iter()
            .map(|u| if u.id == updated.id { updated.clone() } else { u.clone() })
            .collect();

        save_json(slots, CURRENT_USER_KEY, &updated)?;
        save_json(slots, USERS_KEY, &users)?;
        self.users = users;
        self.current = Some(updated.clone());

        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    fn identity(store: &Arc<dyn KeyValueStore>) -> IdentityStore {
        IdentityStore::load(Arc::clone(store), Argon2Params::minimal(), false).unwrap()
    }

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    fn tags(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_register_then_duplicate_email() {
        let store = memory();
        let mut ids = identity(&store);

        let first = ids.register("Ana", "ana@example.com", "pw", tags(&["music"])).unwrap();
        let RegisterOutcome::Registered { user } = first else {
            panic!("expected registration to succeed");
        };
        assert_eq!(user.credits, 5);
        assert_eq!(ids.users().len(), 1);
        assert_eq!(ids.current_user(), Some(&user));

        let second = ids.register("Bea", "ana@example.com", "pw", tags(&["art"])).unwrap();
        assert_eq!(second, RegisterOutcome::EmailTaken);
        assert!(!second.succeeded());
        assert_eq!(ids.users().len(), 1);
        assert_eq!(ids.current_user().unwrap().name, "Ana");
    }

    #[test]
    fn test_authenticate_never_mutates_registry() {
        let store = memory();
        let mut ids = identity(&store);
        ids.register("Ana", "ana@example.com", "pw", tags(&["music"])).unwrap();
        ids.end_session().unwrap();
        let before = store.get(USERS_KEY).unwrap();

        assert!(ids.authenticate("nobody@example.com", "pw").unwrap().is_none());
        assert!(ids.current_user().is_none());
        assert!(ids.authenticate("ana@example.com", "wrong").unwrap().is_none());
        assert!(ids.authenticate("ana@example.com", "pw").unwrap().is_some());

        assert_eq!(store.get(USERS_KEY).unwrap(), before);
        assert_eq!(ids.current_user().unwrap().email, "ana@example.com");
    }

    #[test]
    fn test_user_without_credential_signs_in_by_email() {
        let store = memory();
        let legacy = User::new("Cleo", "cleo@example.com", tags(&["art"]));
        save_json(store.as_ref(), USERS_KEY, &vec![legacy.clone()]).unwrap();

        let mut ids = identity(&store);
        assert_eq!(ids.authenticate("cleo@example.com", "anything").unwrap(), Some(legacy));

        let mut strict =
            IdentityStore::load(Arc::clone(&store), Argon2Params::minimal(), true).unwrap();
        strict.end_session().unwrap();
        assert!(strict.authenticate("cleo@example.com", "anything").unwrap().is_none());
    }

    #[test]
    fn test_end_session_keeps_registry() {
        let store = memory();
        let mut ids = identity(&store);
        ids.register("Ana", "ana@example.com", "pw", tags(&["music"])).unwrap();

        ids.end_session().unwrap();
        assert!(ids.current_user().is_none());
        assert!(store.get(CURRENT_USER_KEY).unwrap().is_none());
        assert_eq!(ids.users().len(), 1);
    }

    #[test]
    fn test_merge_without_user_is_noop() {
        let store = memory();
        let mut ids = identity(&store);
        assert!(ids.merge_update(&UserUpdate::credits(1)).unwrap().is_none());
        assert!(store.get(USERS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_merge_credits_touches_only_credits() {
        let store = memory();
        let mut ids = identity(&store);
        ids.register("Bea", "bea@example.com", "pw", tags(&["art"])).unwrap();
        ids.register("Ana", "ana@example.com", "pw", tags(&["music"])).unwrap();
        let bea_before = ids.users()[0].clone();
        let ana_before = ids.current_user().unwrap().clone();

        let updated = ids.merge_update(&UserUpdate::credits(2)).unwrap().unwrap();

        let mut expected = ana_before.clone();
        expected.credits = 2;
        assert_eq!(updated, expected);
        assert_eq!(ids.users()[1], expected);
        assert_eq!(ids.users()[0], bea_before);

        let reloaded = identity(&store);
        assert_eq!(reloaded.current_user(), Some(&expected));
        assert_eq!(reloaded.users()[0], bea_before);
        assert_eq!(reloaded.users()[1], expected);
    }

    #[test]
    fn test_stale_copies_keep_each_others_users() {
        let store = memory();
        let mut first = identity(&store);
        let mut second = identity(&store);

        first.register("Ana", "ana@example.com", "pw", tags(&["music"])).unwrap();
        second.register("Bea", "bea@example.com", "pw", tags(&["art"])).unwrap();
        assert_eq!(
            second.register("Ana again", "ana@example.com", "pw", tags(&["art"])).unwrap(),
            RegisterOutcome::EmailTaken
        );

        let reloaded = identity(&store);
        let emails: Vec<&str> = reloaded.users().iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["ana@example.com", "bea@example.com"]);
    }

    /// Memory store that refuses to write the credential slot
    struct CredentialWritesFail(MemoryStore);

    impl KeyValueStore for CredentialWritesFail {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            if key == crate::ports::CREDENTIALS_KEY {
                return Err(crate::Error::storage("disk full"));
            }
            self.0.put(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }

        fn with_exclusive(
            &self,
            section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
        ) -> Result<()> {
            section(self)
        }
    }

    #[test]
    fn test_failed_credential_write_leaves_no_account() {
        let store: Arc<dyn KeyValueStore> = Arc::new(CredentialWritesFail(MemoryStore::new()));
        let mut ids = identity(&store);

        assert!(ids.register("Ana", "ana@example.com", "pw", tags(&["music"])).is_err());

        assert!(ids.users().is_empty());
        assert!(ids.current_user().is_none());
        let users: Vec<User> = load_json(store.as_ref(), USERS_KEY).unwrap().unwrap_or_default();
        assert!(users.is_empty());
        assert!(store.get(CURRENT_USER_KEY).unwrap().is_none());

        // Without the registry entry the email cannot be used to sign in
        assert!(ids.authenticate("ana@example.com", "").unwrap().is_none());
    }
}
