use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::{ProfileEdit, ProfileUpdate, UserProfile};
use crate::domain::errors::{ApiError, ErrorKind};
use crate::domain::ports::MovieApi;
use crate::domain::session::SessionStore;
use crate::use_cases::favorites::FavoritesSynchronizer;
use crate::use_cases::register::{validate_email, validate_password, validate_username};

// Profile update use case; only changed fields are sent.
pub struct UpdateProfileUseCase {
    pub api: Arc<dyn MovieApi>,
    pub session: Arc<SessionStore>,
}

impl UpdateProfileUseCase {
    pub async fn execute(
        &self,
        current: &UserProfile,
        edit: ProfileEdit,
    ) -> Result<UserProfile, ApiError> {
        let update = ProfileUpdate::diff(current, &edit);
        if update.is_empty() {
            return Ok(current.clone());
        }

        let problems: Vec<String> = [
            update.username.as_deref().and_then(validate_username),
            update.email.as_deref().and_then(validate_email),
            update.password.as_deref().and_then(validate_password),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems.join("; ")));
        }

        let profile = self.api.update_profile(update).await?;
        self.session.update_user(profile.summary());

        info!(username = %profile.username, "profile updated");
        Ok(profile)
    }
}

// Account deletion; the local session only ends once the backend confirms.
pub struct DeleteAccountUseCase {
    pub api: Arc<dyn MovieApi>,
    pub session: Arc<SessionStore>,
    pub favorites: Arc<FavoritesSynchronizer>,
}

impl DeleteAccountUseCase {
    pub async fn execute(&self) -> Result<(), ApiError> {
        if let Err(err) = self.api.delete_profile().await {
            if err.kind() != ErrorKind::Unauthenticated {
                warn!(error = %err, "account deletion failed; keeping session");
            }
            return Err(err);
        }

        self.session.clear();
        self.favorites.reset();
        info!("account deleted");
        Ok(())
    }
}
