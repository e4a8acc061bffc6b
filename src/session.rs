//! Who is signed in, kept consistent across restarts through durable storage.
//!
//! The in-memory identity is the source of truth while the process runs; the
//! stored copy only seeds it on [`SessionStore::initialize`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::ClientError;
use crate::models::UserIdentity;
use crate::storage::{self, Storage};

pub const TOKEN_KEY: &str = "taskmaster_token";
pub const USER_KEY: &str = "taskmaster_user";
const LEGACY_USER_KEY: &str = "currentUser";

#[derive(Clone)]
pub struct SessionStore {
    storage: Storage,
    current: Arc<Mutex<Option<UserIdentity>>>,
}

impl SessionStore {
    /// An empty session over `storage`. Call [`initialize`](Self::initialize)
    /// to pick up a persisted one.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Loads the persisted identity. Missing, unreadable or malformed data
    /// leaves the session empty; this never fails.
    pub fn initialize(&self) {
        if let Err(err) = storage::remove_item(&self.storage, LEGACY_USER_KEY) {
            warn!(error = %err, "Failed to drop legacy session entry");
        }

        let identity = match storage::get_item(&self.storage, USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(identity) => Some(identity),
                Err(err) => {
                    warn!(error = %err, "Discarding malformed persisted session");
                    if let Err(err) = storage::remove_item(&self.storage, USER_KEY) {
                        warn!(error = %err, "Failed to remove malformed session entry");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "Failed to read persisted session");
                None
            }
        };

        if let Some(ref identity) = identity {
            info!(user_id = identity.user_id, "Restored session");
        }
        *self.lock() = identity;
    }

    /// Persists identity and token together, then makes `identity` current.
    pub fn commit(&self, identity: UserIdentity, token: &str) -> Result<(), ClientError> {
        let blob = serde_json::to_string(&identity)?;
        let mut current = self.lock();
        storage::set_items(
            &self.storage,
            &[(TOKEN_KEY, token), (USER_KEY, blob.as_str())],
        )?;
        info!(user_id = identity.user_id, "Session committed");
        *current = Some(identity);
        Ok(())
    }

    /// Drops the session. Calling it on an empty session is a no-op.
    pub fn clear(&self) -> Result<(), ClientError> {
        let mut current = self.lock();
        storage::remove_items(&self.storage, &[TOKEN_KEY, USER_KEY])?;
        if current.take().is_some() {
            info!("Session cleared");
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    pub fn current_identity(&self) -> Option<UserIdentity> {
        self.lock().clone()
    }

    pub fn current_token(&self) -> Option<String> {
        match storage::get_item(&self.storage, TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Failed to read bearer token");
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<UserIdentity>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> UserIdentity {
        UserIdentity {
            user_id: 12,
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            user_created_at: "2024-03-01T09:30:00".to_string(),
        }
    }

    #[test]
    fn commit_then_clear() {
        let session = SessionStore::new(storage::open_in_memory().unwrap());
        assert!(!session.is_authenticated());

        session.commit(identity(), "tok-1").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.current_identity(), Some(identity()));
        assert_eq!(session.current_token().as_deref(), Some("tok-1"));

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.current_identity(), None);
        assert_eq!(session.current_token(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let session = SessionStore::new(storage::open_in_memory().unwrap());
        session.clear().unwrap();
        session.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn commit_replaces_previous_session() {
        let session = SessionStore::new(storage::open_in_memory().unwrap());
        session.commit(identity(), "tok-1").unwrap();

        let other = UserIdentity {
            user_id: 99,
            name: "Bruno".to_string(),
            email: "bruno@example.com".to_string(),
            user_created_at: "2024-04-01T00:00:00".to_string(),
        };
        session.commit(other.clone(), "tok-2").unwrap();
        assert_eq!(session.current_identity(), Some(other));
        assert_eq!(session.current_token().as_deref(), Some("tok-2"));
    }

    #[test]
    fn initialize_restores_identity() {
        let storage = storage::open_in_memory().unwrap();
        SessionStore::new(storage.clone())
            .commit(identity(), "tok-1")
            .unwrap();

        let fresh = SessionStore::new(storage);
        assert!(!fresh.is_authenticated());
        fresh.initialize();
        assert_eq!(fresh.current_identity(), Some(identity()));
        assert_eq!(fresh.current_token().as_deref(), Some("tok-1"));
    }

    #[test]
    fn initialize_discards_malformed_blob() {
        let storage = storage::open_in_memory().unwrap();
        storage::set_item(&storage, USER_KEY, "{not json").unwrap();

        let session = SessionStore::new(storage.clone());
        session.initialize();
        assert!(!session.is_authenticated());
        assert_eq!(storage::get_item(&storage, USER_KEY).unwrap(), None);
    }

    #[test]
    fn initialize_drops_legacy_entry() {
        let storage = storage::open_in_memory().unwrap();
        storage::set_item(&storage, LEGACY_USER_KEY, "{}").unwrap();

        SessionStore::new(storage.clone()).initialize();
        assert_eq!(storage::get_item(&storage, LEGACY_USER_KEY).unwrap(), None);
    }

    #[test]
    fn clones_share_state() {
        let session = SessionStore::new(storage::open_in_memory().unwrap());
        let handle = session.clone();
        session.commit(identity(), "tok-1").unwrap();
        assert!(handle.is_authenticated());
    }
}
