use std::sync::Arc;

use tracing::info;

use crate::domain::entities::{Credentials, LoginOutcome};
use crate::domain::errors::ApiError;
use crate::domain::ports::MovieApi;
use crate::domain::session::SessionStore;
use crate::use_cases::favorites::FavoritesSynchronizer;

// Login use case with injected dependencies.
pub struct LoginUseCase {
    pub api: Arc<dyn MovieApi>,
    pub session: Arc<SessionStore>,
    pub favorites: Arc<FavoritesSynchronizer>,
}

impl LoginUseCase {
    pub async fn execute(&self, credentials: Credentials) -> Result<LoginOutcome, ApiError> {
        let credentials = Credentials::new(credentials.username.trim(), credentials.password);
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let outcome = self.api.login(credentials).await?;

        self.session
            .set_session(outcome.token.clone(), outcome.user.clone());
        self.favorites
            .seed(outcome.user.favorite_movies.iter().cloned());

        info!(username = %outcome.user.username, "logged in");
        Ok(outcome)
    }
}
