use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::entities::{
    Credentials, LoginOutcome, Movie, ProfileUpdate, Registration, UserProfile, UserSummary,
};
use crate::domain::errors::{ApiError, ErrorKind};
use crate::domain::ports::MovieApi;

// Pauses the first favorite mutation until the test releases it.
#[derive(Clone, Default)]
pub(crate) struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
struct FakeState {
    profile: UserProfile,
    password: String,
    token: String,
    // Consumed by the next call of any kind.
    failure: Option<ApiError>,
    // Consumed by the next add/remove instead of the computed server list.
    next_list: Option<Vec<String>>,
    gate: Option<Gate>,
    calls: Vec<String>,
}

// In-memory stand-in for the backend with failure injection and call recording.
pub(crate) struct FakeMovieApi {
    state: Mutex<FakeState>,
}

impl FakeMovieApi {
    pub(crate) fn new() -> Self {
        let profile = UserProfile {
            id: Some("u1".to_string()),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            birthday: None,
            favorite_movies: Vec::new(),
        };

        Self {
            state: Mutex::new(FakeState {
                profile,
                password: "secret123".to_string(),
                token: "t1".to_string(),
                ..FakeState::default()
            }),
        }
    }

    pub(crate) fn with_favorites(self, ids: &[&str]) -> Self {
        self.lock().profile.favorite_movies = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub(crate) fn fail_next(&self, err: ApiError) {
        self.lock().failure = Some(err);
    }

    pub(crate) fn answer_next_mutation_with(&self, ids: &[&str]) {
        self.lock().next_list = Some(ids.iter().map(|id| id.to_string()).collect());
    }

    pub(crate) fn install_gate(&self) -> Gate {
        let gate = Gate::default();
        self.lock().gate = Some(gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub(crate) fn profile(&self) -> UserProfile {
        self.lock().profile.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake api mutex poisoned")
    }

    // Record the call and hand back any injected failure.
    fn enter(&self, call: String) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn mutate(&self, call: String, movie_id: &str, add: bool) -> Result<Vec<String>, ApiError> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(call);
            state.gate.take()
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let mut state = self.lock();
        if let Some(err) = state.failure.take() {
            return Err(err);
        }
        if let Some(list) = state.next_list.take() {
            return Ok(list);
        }

        let favorites = &mut state.profile.favorite_movies;
        let present = favorites.iter().any(|id| id == movie_id);
        if add && !present {
            favorites.push(movie_id.to_string());
        } else if !add {
            favorites.retain(|id| id != movie_id);
        }
        Ok(favorites.clone())
    }
}

#[async_trait]
impl MovieApi for FakeMovieApi {
    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        self.enter(format!("register:{}", registration.username))?;
        Ok(UserProfile {
            id: None,
            username: registration.username,
            email: registration.email,
            birthday: registration.birthday,
            favorite_movies: Vec::new(),
        })
    }

    async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, ApiError> {
        self.enter(format!("login:{}", credentials.username))?;
        let state = self.lock();
        if credentials.username != state.profile.username || credentials.password != state.password
        {
            return Err(ApiError::from_kind(ErrorKind::Unauthenticated, None));
        }

        let user: UserSummary = state.profile.summary();
        Ok(LoginOutcome {
            token: state.token.clone(),
            user,
        })
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        self.enter("list_movies".to_string())?;
        Ok(Vec::new())
    }

    async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        self.enter("get_profile".to_string())?;
        Ok(self.lock().profile.clone())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.enter("update_profile".to_string())?;
        let mut state = self.lock();
        if let Some(username) = update.username {
            state.profile.username = username;
        }
        if let Some(email) = update.email {
            state.profile.email = email;
        }
        if update.birthday.is_some() {
            state.profile.birthday = update.birthday;
        }
        if let Some(password) = update.password {
            state.password = password;
        }
        Ok(state.profile.clone())
    }

    async fn delete_profile(&self) -> Result<(), ApiError> {
        self.enter("delete_profile".to_string())
    }

    async fn add_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError> {
        self.mutate(format!("add_favorite:{movie_id}"), movie_id, true)
            .await
    }

    async fn remove_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError> {
        self.mutate(format!("remove_favorite:{movie_id}"), movie_id, false)
            .await
    }
}
