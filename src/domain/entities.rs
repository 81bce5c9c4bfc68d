use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// Canonical catalog shapes. Wire casing is resolved before anything lands here.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Genre {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Director {
    pub name: String,
    pub bio: String,
    // Backends send full dates, bare years or nothing; kept as given.
    pub birth: Option<String>,
    pub death: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub image_path: Option<String>,
}

/// Minimal identity kept alongside the token and persisted with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub favorite_movies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<String>,
}

impl UserProfile {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: (!self.email.is_empty()).then(|| self.email.clone()),
            favorite_movies: self.favorite_movies.clone(),
        }
    }
}

// Token plus identity; both absent means unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserSummary>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("birthday", &self.birthday)
            .finish()
    }
}

// Result of a successful login; the caller installs it into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

/// Values the user submitted from the profile form.
///
/// A `None` birthday leaves the stored one untouched, and an empty or absent
/// password keeps the current password.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ProfileEdit {
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub password: Option<String>,
}

impl fmt::Debug for ProfileEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileEdit")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("birthday", &self.birthday)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Sparse update payload: only fields that actually changed are set.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn diff(current: &UserProfile, edit: &ProfileEdit) -> Self {
        let username = edit.username.trim();
        let email = edit.email.trim();

        Self {
            username: (!username.is_empty() && username != current.username)
                .then(|| username.to_string()),
            email: (!email.is_empty() && email != current.email).then(|| email.to_string()),
            birthday: edit.birthday.filter(|day| Some(*day) != current.birthday),
            password: edit.password.clone().filter(|password| !password.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.birthday.is_none()
            && self.password.is_none()
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("birthday", &self.birthday)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteStatus {
    NotFavorite,
    Favorite,
    // A mutation for this id is in flight.
    Pending,
}
