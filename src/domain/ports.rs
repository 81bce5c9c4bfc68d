use async_trait::async_trait;

use crate::domain::entities::{
    Credentials, LoginOutcome, Movie, ProfileUpdate, Registration, UserProfile,
};
use crate::domain::errors::{ApiError, StorageError};

// Port for the movie backend. Use cases depend on this, not on the HTTP client.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError>;
    async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, ApiError>;
    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError>;
    async fn get_profile(&self) -> Result<UserProfile, ApiError>;
    async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError>;
    async fn delete_profile(&self) -> Result<(), ApiError>;
    // Both favorite mutations return the server's favorite ids after the change.
    async fn add_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError>;
    async fn remove_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError>;
}

// Port for durable string key/value storage (local storage on the web, a file here).
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
