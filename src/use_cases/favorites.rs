use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::entities::{FavoriteStatus, UserProfile};
use crate::domain::errors::{ApiError, ErrorKind};
use crate::domain::ports::MovieApi;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    // Rejected locally; nothing was sent.
    #[error("a change to movie {0} is already in progress")]
    InFlight(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Copy)]
struct Ticket {
    epoch: u64,
    seq: u64,
}

#[derive(Default)]
struct Membership {
    // Last server-confirmed favorite ids.
    confirmed: HashSet<String>,
    // Ids shown as `Pending` in the current epoch.
    pending: HashSet<String>,
    // Ids whose mutation has not settled yet, whatever epoch issued it.
    in_flight: HashSet<String>,
    // Bumped when a new session starts or ends; older mutation results are dropped.
    epoch: u64,
    // Issue order of every request that yields a favorite snapshot.
    next_seq: u64,
    applied_seq: u64,
}

impl Membership {
    fn issue(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            epoch: self.epoch,
            seq: self.next_seq,
        }
    }

    // Apply a server snapshot unless a snapshot issued later is already in place.
    fn apply(&mut self, ticket: Ticket, ids: Vec<String>) -> bool {
        if ticket.seq <= self.applied_seq {
            return false;
        }
        self.confirmed = ids.into_iter().collect();
        self.applied_seq = ticket.seq;
        true
    }

    fn restart(&mut self, ids: Vec<String>) {
        self.epoch += 1;
        self.pending.clear();
        let ticket = self.issue();
        self.apply(ticket, ids);
    }

    // The backend rejected the session, so its favorites no longer belong to anyone.
    fn forget_on_rejection(&mut self, ticket: Ticket, err: &ApiError) {
        if err.kind() == ErrorKind::Unauthenticated && ticket.epoch == self.epoch {
            debug!("session rejected; forgetting favorites");
            self.restart(Vec::new());
        }
    }

    fn status(&self, movie_id: &str) -> FavoriteStatus {
        if self.pending.contains(movie_id) {
            FavoriteStatus::Pending
        } else if self.confirmed.contains(movie_id) {
            FavoriteStatus::Favorite
        } else {
            FavoriteStatus::NotFavorite
        }
    }
}

/// Client-side favorite membership, driven only by lists the server returns.
///
/// A toggle marks the id `Pending`, issues the add or remove call, and then installs
/// whatever favorite list the server answered with. A failed call leaves the confirmed
/// set untouched, so the id falls back to its previous state. At most one mutation per
/// id is in flight; a second toggle of a pending id is rejected before anything is sent.
pub struct FavoritesSynchronizer {
    api: Arc<dyn MovieApi>,
    state: Mutex<Membership>,
}

impl FavoritesSynchronizer {
    pub fn new(api: Arc<dyn MovieApi>) -> Self {
        Self {
            api,
            state: Mutex::new(Membership::default()),
        }
    }

    // Start from a known server list, e.g. the favorites delivered with a login.
    pub fn seed(&self, ids: impl IntoIterator<Item = String>) {
        self.lock().restart(ids.into_iter().collect());
    }

    // Forget everything; used on logout and account deletion.
    pub fn reset(&self) {
        self.lock().restart(Vec::new());
    }

    /// Fetch the profile and install its favorites as the confirmed set.
    ///
    /// Mutations already in flight stay `Pending` and settle when they resolve.
    pub async fn load(&self) -> Result<UserProfile, ApiError> {
        let ticket = self.lock().issue();
        let result = self.api.get_profile().await;

        let mut state = self.lock();
        let profile = match result {
            Ok(profile) => profile,
            Err(err) => {
                state.forget_on_rejection(ticket, &err);
                return Err(err);
            }
        };
        if ticket.epoch != state.epoch {
            debug!("dropping profile favorites from an ended session");
        } else if !state.apply(ticket, profile.favorite_movies.clone()) {
            debug!("dropping profile favorites older than the current snapshot");
        }
        Ok(profile)
    }

    pub fn status(&self, movie_id: &str) -> FavoriteStatus {
        self.lock().status(movie_id)
    }

    pub fn is_favorite(&self, movie_id: &str) -> bool {
        self.status(movie_id) == FavoriteStatus::Favorite
    }

    // Confirmed ids, sorted for stable display.
    pub fn favorites(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().confirmed.iter().cloned().collect();
        ids.sort();
        ids
    }

    #[tracing::instrument(name = "toggle_favorite", skip(self))]
    pub async fn toggle(&self, movie_id: &str) -> Result<FavoriteStatus, ToggleError> {
        let (adding, ticket) = {
            let mut state = self.lock();
            if state.in_flight.contains(movie_id) {
                debug!("toggle rejected; mutation already in flight");
                return Err(ToggleError::InFlight(movie_id.to_string()));
            }
            let adding = !state.confirmed.contains(movie_id);
            state.in_flight.insert(movie_id.to_string());
            state.pending.insert(movie_id.to_string());
            (adding, state.issue())
        };

        let result = if adding {
            self.api.add_favorite(movie_id).await
        } else {
            self.api.remove_favorite(movie_id).await
        };

        let mut state = self.lock();
        state.in_flight.remove(movie_id);
        if ticket.epoch != state.epoch {
            debug!("dropping favorite result from an ended session");
            return Ok(state.status(movie_id));
        }
        state.pending.remove(movie_id);

        match result {
            Ok(ids) => {
                let listed = ids.iter().any(|id| id == movie_id);
                if !state.apply(ticket, ids) {
                    // A later snapshot already landed; only this id's answer is news.
                    debug!(listed, "favorite list older than current snapshot");
                    if listed {
                        state.confirmed.insert(movie_id.to_string());
                    } else {
                        state.confirmed.remove(movie_id);
                    }
                }
                Ok(state.status(movie_id))
            }
            Err(err) => {
                warn!(adding, kind = %err.kind(), error = %err, "favorite change failed; reverted");
                state.forget_on_rejection(ticket, &err);
                Err(ToggleError::Api(err))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Membership> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
