//! In-memory session state with write-through persistence

use checker_core::User;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::observable::Observable;
use crate::storage::PersistentStore;

/// Access token and current user, mirrored to persistent storage
///
/// Every mutation writes storage first and then publishes the new value, so
/// an in-memory token is always also persisted. The refresh token lives in
/// storage only and is never published.
pub struct SessionState {
    store: Arc<dyn PersistentStore>,
    access_token: Observable<Option<String>>,
    user: Observable<Option<User>>,
    /// Bumped on every full clear; guards writes from in-flight requests
    epoch: Mutex<u64>,
}

impl SessionState {
    /// Build the state from whatever a previous run left in `store`
    pub fn hydrate(store: Arc<dyn PersistentStore>) -> Self {
        let access_token = store
            .get(AuthConfig::ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty());

        let user = store.get(AuthConfig::USER_DATA_KEY).and_then(|raw| {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    let err = AuthError::StorageParse(e.to_string());
                    warn!(error = %err, "Discarding stored user data");
                    store.remove(AuthConfig::USER_DATA_KEY);
                    None
                }
            }
        });

        debug!(
            has_access_token = access_token.is_some(),
            has_user = user.is_some(),
            "Hydrated session state"
        );

        Self {
            store,
            access_token: Observable::new(access_token),
            user: Observable::new(user),
            epoch: Mutex::new(0),
        }
    }

    fn epoch_guard(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.get()
    }

    /// Whether a usable (non-empty) access token is held
    pub fn has_access_token(&self) -> bool {
        self.access_token
            .with(|token| token.as_deref().is_some_and(|t| !t.is_empty()))
    }

    pub fn set_access_token(&self, token: &str) {
        self.store.set(AuthConfig::ACCESS_TOKEN_KEY, token);
        self.access_token.set(Some(token.to_string()));
    }

    pub fn clear_access_token(&self) {
        self.store.remove(AuthConfig::ACCESS_TOKEN_KEY);
        self.access_token.set(None);
    }

    pub fn user(&self) -> Option<User> {
        self.user.get()
    }

    pub fn set_user(&self, user: User) {
        match serde_json::to_string(&user) {
            Ok(serialized) => self.store.set(AuthConfig::USER_DATA_KEY, &serialized),
            Err(e) => warn!(error = %e, "Failed to serialize user data"),
        }
        self.user.set(Some(user));
    }

    pub fn clear_user(&self) {
        self.store.remove(AuthConfig::USER_DATA_KEY);
        self.user.set(None);
    }

    /// Stored refresh token, if any (empty counts as absent)
    pub fn refresh_token(&self) -> Option<String> {
        self.store
            .get(AuthConfig::REFRESH_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.store.set(AuthConfig::REFRESH_TOKEN_KEY, token);
    }

    pub fn clear_refresh_token(&self) {
        self.store.remove(AuthConfig::REFRESH_TOKEN_KEY);
    }

    /// Remove access token, user and refresh token everywhere
    pub fn clear(&self) {
        let mut epoch = self.epoch_guard();
        *epoch += 1;
        self.clear_access_token();
        self.clear_user();
        self.clear_refresh_token();
        debug!(epoch = *epoch, "Session cleared");
    }

    /// Drop the in-memory values only; persisted entries stay for the next start
    pub fn release(&self) {
        let mut epoch = self.epoch_guard();
        *epoch += 1;
        self.access_token.set(None);
        self.user.set(None);
    }

    pub fn epoch(&self) -> u64 {
        *self.epoch_guard()
    }

    /// Run `apply` only if no clear happened since `epoch` was read
    pub(crate) fn apply_if_current(&self, epoch: u64, apply: impl FnOnce(&Self)) -> bool {
        let current = self.epoch_guard();
        if *current == epoch {
            apply(self);
            true
        } else {
            false
        }
    }

    pub fn watch_access_token(&self) -> watch::Receiver<Option<String>> {
        self.access_token.subscribe()
    }

    pub fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, NullStore};

    fn user() -> User {
        User {
            id: 11,
            username: "kiran".to_string(),
            email: Some("kiran@example.edu".to_string()),
            first_name: "Kiran".to_string(),
            last_name: "Das".to_string(),
            role: "teacher".to_string(),
            registration_number: None,
        }
    }

    #[test]
    fn set_user_survives_restart() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::hydrate(store.clone());
        state.set_user(user());
        state.set_access_token("a1");

        let restarted = SessionState::hydrate(store);
        assert_eq!(restarted.user(), Some(user()));
        assert_eq!(restarted.access_token().as_deref(), Some("a1"));
    }

    #[test]
    fn corrupt_user_data_is_purged() {
        let store = Arc::new(MemoryStore::with_entries([
            (AuthConfig::USER_DATA_KEY, "not json {"),
            (AuthConfig::ACCESS_TOKEN_KEY, "a1"),
        ]));
        let state = SessionState::hydrate(store.clone());

        assert_eq!(state.user(), None);
        assert!(!store.contains(AuthConfig::USER_DATA_KEY));
        // the token is unaffected
        assert_eq!(state.access_token().as_deref(), Some("a1"));
    }

    #[test]
    fn access_token_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::hydrate(store.clone());

        state.set_access_token("a1");
        assert_eq!(store.get(AuthConfig::ACCESS_TOKEN_KEY).as_deref(), Some("a1"));

        state.clear_access_token();
        assert!(!store.contains(AuthConfig::ACCESS_TOKEN_KEY));
        assert!(!state.has_access_token());
    }

    #[test]
    fn clear_removes_every_key_and_bumps_epoch() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::hydrate(store.clone());
        state.set_access_token("a1");
        state.set_refresh_token("r1");
        state.set_user(user());
        let before = state.epoch();

        state.clear();

        assert_eq!(state.access_token(), None);
        assert_eq!(state.user(), None);
        assert_eq!(state.refresh_token(), None);
        assert!(store.is_empty());
        assert_eq!(state.epoch(), before + 1);
    }

    #[test]
    fn stale_epoch_writes_are_rejected() {
        let state = SessionState::hydrate(Arc::new(MemoryStore::new()));
        let epoch = state.epoch();
        state.clear();

        let applied = state.apply_if_current(epoch, |s| s.set_access_token("late"));
        assert!(!applied);
        assert_eq!(state.access_token(), None);
    }

    #[test]
    fn release_keeps_persisted_entries() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::hydrate(store.clone());
        state.set_access_token("a1");

        state.release();
        assert_eq!(state.access_token(), None);
        assert!(store.contains(AuthConfig::ACCESS_TOKEN_KEY));
    }

    #[test]
    fn empty_tokens_count_as_absent() {
        let store = Arc::new(MemoryStore::with_entries([
            (AuthConfig::ACCESS_TOKEN_KEY, ""),
            (AuthConfig::REFRESH_TOKEN_KEY, ""),
        ]));
        let state = SessionState::hydrate(store);
        assert_eq!(state.access_token(), None);
        assert_eq!(state.refresh_token(), None);
    }

    #[test]
    fn works_without_durable_storage() {
        let state = SessionState::hydrate(Arc::new(NullStore));
        state.set_access_token("a1");
        state.set_user(user());
        assert_eq!(state.access_token().as_deref(), Some("a1"));
        state.clear();
        assert_eq!(state.user(), None);
    }

    #[tokio::test]
    async fn token_changes_are_observable() {
        let state = SessionState::hydrate(Arc::new(MemoryStore::new()));
        let mut rx = state.watch_access_token();

        state.set_access_token("a2");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("a2"));
    }
}
