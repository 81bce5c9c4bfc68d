use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::domain::entities::{Session, UserSummary};
use crate::domain::errors::StorageError;
use crate::domain::ports::KeyValueStorage;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Current authentication token and user identity, written through to durable storage.
///
/// Every outgoing call reads the token from here, so a `clear()` from any task is seen
/// by the next call immediately. Storage failures never surface: a session that cannot
/// be persisted is not held at all, which leaves the client unauthenticated.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<Session>,
}

impl SessionStore {
    // Initialize from whatever the storage already holds.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let session = read_session(storage.as_ref()).unwrap_or_else(|err| {
            warn!(error = %err, "session storage unreadable; starting unauthenticated");
            Session::default()
        });

        Self {
            storage,
            state: RwLock::new(session),
        }
    }

    pub fn set_session(&self, token: impl Into<String>, user: UserSummary) {
        let token = token.into();
        let mut state = self.write();

        match write_session(self.storage.as_ref(), &token, &user) {
            Ok(()) => {
                *state = Session {
                    token: Some(token),
                    user: Some(user),
                };
            }
            Err(err) => {
                warn!(error = %err, "failed to persist session; staying unauthenticated");
                *state = Session::default();
                self.remove_persisted();
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserSummary> {
        self.read().user.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    // Replace the stored identity after a profile edit. Ignored when logged out.
    pub fn update_user(&self, user: UserSummary) {
        let mut state = self.write();
        if state.token.is_none() {
            return;
        }

        if let Err(err) = write_user(self.storage.as_ref(), &user) {
            warn!(error = %err, "failed to persist updated user");
        }
        state.user = Some(user);
    }

    /// Clear after the backend rejected `rejected`. A session installed after that
    /// token was read survives; a rejection of an unauthenticated call clears anyway.
    pub fn invalidate(&self, rejected: Option<&str>) -> bool {
        let mut state = self.write();
        if rejected.is_some() && state.token.as_deref() != rejected {
            return false;
        }

        *state = Session::default();
        self.remove_persisted();
        true
    }

    pub fn clear(&self) {
        let mut state = self.write();
        *state = Session::default();
        self.remove_persisted();
    }

    fn remove_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "failed to remove persisted session entry");
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_session(storage: &dyn KeyValueStorage) -> Result<Session, StorageError> {
    let token = storage
        .get(TOKEN_KEY)?
        .filter(|token| !token.trim().is_empty());

    let user = match storage.get(USER_KEY)? {
        Some(raw) => match serde_json::from_str::<UserSummary>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "discarding unreadable stored user");
                None
            }
        },
        None => None,
    };

    // A user without a token is a leftover from an interrupted clear.
    let user = token.as_ref().and(user);
    Ok(Session { token, user })
}

fn write_session(
    storage: &dyn KeyValueStorage,
    token: &str,
    user: &UserSummary,
) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, token)?;
    write_user(storage, user)
}

fn write_user(storage: &dyn KeyValueStorage, user: &UserSummary) -> Result<(), StorageError> {
    let raw = serde_json::to_string(user)?;
    storage.set(USER_KEY, &raw)
}
