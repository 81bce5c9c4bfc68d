use std::sync::Arc;

use tracing::info;

use crate::domain::entities::{Registration, UserProfile};
use crate::domain::errors::ApiError;
use crate::domain::ports::MovieApi;

pub(crate) const MIN_USERNAME_LEN: usize = 5;
pub(crate) const MIN_PASSWORD_LEN: usize = 8;

// Registration use case; rejects obviously invalid input before any request.
pub struct RegisterUseCase {
    pub api: Arc<dyn MovieApi>,
}

impl RegisterUseCase {
    pub async fn execute(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        let registration = Registration {
            username: registration.username.trim().to_string(),
            email: registration.email.trim().to_lowercase(),
            ..registration
        };

        let problems: Vec<String> = [
            validate_username(&registration.username),
            validate_password(&registration.password),
            validate_email(&registration.email),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems.join("; ")));
        }

        let profile = self.api.register(registration).await?;
        info!(username = %profile.username, "registered");
        Ok(profile)
    }
}

pub(crate) fn validate_username(username: &str) -> Option<String> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Some(format!(
            "Username: must be at least {MIN_USERNAME_LEN} characters"
        ));
    }
    None
}

pub(crate) fn validate_password(password: &str) -> Option<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(format!(
            "Password: must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    None
}

pub(crate) fn validate_email(email: &str) -> Option<String> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Some("Email: does not appear to be valid".to_string());
    }
    None
}
