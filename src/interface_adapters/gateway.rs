use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::domain::entities::{
    Credentials, LoginOutcome, Movie, ProfileUpdate, Registration, UserProfile, UserSummary,
};
use crate::domain::errors::{ApiError, ErrorKind};
use crate::domain::ports::MovieApi;
use crate::domain::session::SessionStore;
use crate::interface_adapters::normalize::{error_message, favorite_ids, validation_message};
use crate::interface_adapters::protocol::{
    FavoritesResponseDto, LoginRequest, LoginResponseDto, MovieDto, ProfileUpdateRequest,
    RegisterRequest, UserDto,
};

// Calls that carry no payload.
const NO_BODY: Option<&()> = None;

#[derive(Debug, thiserror::Error)]
pub enum GatewayBuildError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("base url cannot take path segments: {0}")]
    NotABase(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Protected,
}

/// Single choke point for every backend call.
///
/// Attaches the session's bearer token, classifies failures into [`ApiError`],
/// clears the session on 401, and retries the profile and favorite routes once on
/// their legacy per-username shape when the canonical route answers 404.
#[derive(Clone)]
pub struct ApiGateway {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiGateway {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, GatewayBuildError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayBuildError::NotABase(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    // Segments are percent-encoded individually, so ids and usernames stay one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        access: Access,
    ) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        let mut request = self.http.request(method.clone(), url.clone());

        // Read fresh on every call so a concurrent clear is honored by the next request.
        let token = match access {
            Access::Public => None,
            Access::Protected => match self.session.token() {
                Some(token) => Some(token),
                None => {
                    debug!(%method, path = %url.path(), "no session token; rejecting locally");
                    return Err(ApiError::from_kind(
                        ErrorKind::Unauthenticated,
                        Some("You are not logged in.".to_string()),
                    ));
                }
            },
        };
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(%method, path = %url.path(), error = %err, "backend unreachable");
            ApiError::from_kind(ErrorKind::Unreachable, None)
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| {
            warn!(%method, path = %url.path(), error = %err, "response body interrupted");
            ApiError::from_kind(ErrorKind::Unreachable, None)
        })?;

        if status.is_success() {
            debug!(%method, path = %url.path(), status = status.as_u16(), "backend call ok");
            return Ok(text);
        }

        let err = classify(status, &text);
        if err.kind() == ErrorKind::Unauthenticated {
            let cleared = self.session.invalidate(token.as_deref());
            warn!(%method, path = %url.path(), cleared, "backend rejected credentials");
        } else {
            warn!(
                %method,
                path = %url.path(),
                status = status.as_u16(),
                kind = %err.kind(),
                "backend call failed"
            );
        }
        Err(err)
    }

    // Protected call on `primary`; on 404 only, one retry on `users/{username}/{legacy_tail..}`.
    async fn send_with_fallback<B>(
        &self,
        method: Method,
        primary: &[&str],
        legacy_tail: &[&str],
        body: Option<&B>,
    ) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        match self
            .send(method.clone(), primary, body, Access::Protected)
            .await
        {
            Err(ApiError::NotFound(message)) => {
                let Some(user) = self.session.user().filter(|user| !user.username.is_empty())
                else {
                    return Err(ApiError::NotFound(message));
                };

                let mut legacy = vec!["users", user.username.as_str()];
                legacy.extend_from_slice(legacy_tail);
                debug!(%method, primary = ?primary, legacy = ?legacy, "retrying on legacy route");

                self.send(method, &legacy, body, Access::Protected).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl MovieApi for ApiGateway {
    #[tracing::instrument(name = "register", skip_all, fields(username = %registration.username))]
    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        let request = RegisterRequest {
            username: &registration.username,
            password: &registration.password,
            email: &registration.email,
            birthday: registration.birthday,
        };
        let body = self
            .send(Method::POST, &["users"], Some(&request), Access::Public)
            .await?;

        // Some backends confirm with plain text; echo the submitted account then.
        match serde_json::from_str::<UserDto>(&body) {
            Ok(dto) if dto.username.is_some() => Ok(UserProfile::from(dto)),
            _ => Ok(UserProfile {
                id: None,
                username: registration.username,
                email: registration.email,
                birthday: registration.birthday,
                favorite_movies: Vec::new(),
            }),
        }
    }

    #[tracing::instrument(name = "login", skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, ApiError> {
        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let body = self
            .send(Method::POST, &["login"], Some(&request), Access::Public)
            .await?;

        let dto: LoginResponseDto = decode(&body)?;
        if dto.token.trim().is_empty() {
            return Err(malformed());
        }

        Ok(LoginOutcome {
            token: dto.token,
            user: UserSummary::from(dto.user),
        })
    }

    #[tracing::instrument(name = "list_movies", skip_all)]
    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        let body = self
            .send(Method::GET, &["movies"], NO_BODY, Access::Protected)
            .await?;
        let movies: Vec<MovieDto> = decode(&body)?;

        Ok(movies.into_iter().map(Movie::from).collect())
    }

    #[tracing::instrument(name = "get_profile", skip_all)]
    async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let body = self
            .send_with_fallback(Method::GET, &["user"], &[], NO_BODY)
            .await?;
        let user: UserDto = decode(&body)?;

        Ok(UserProfile::from(user))
    }

    #[tracing::instrument(name = "update_profile", skip_all, fields(update = ?update))]
    async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
        let request = ProfileUpdateRequest {
            username: update.username.as_deref(),
            password: update.password.as_deref(),
            email: update.email.as_deref(),
            birthday: update.birthday,
        };
        let body = self
            .send_with_fallback(Method::PUT, &["user"], &[], Some(&request))
            .await?;
        let user: UserDto = decode(&body)?;

        Ok(UserProfile::from(user))
    }

    #[tracing::instrument(name = "delete_profile", skip_all)]
    async fn delete_profile(&self) -> Result<(), ApiError> {
        // The confirmation body is free text; success is all that matters.
        self.send_with_fallback(Method::DELETE, &["user"], &[], NO_BODY)
            .await?;
        Ok(())
    }

    #[tracing::instrument(name = "add_favorite", skip_all, fields(movie_id = %movie_id))]
    async fn add_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError> {
        let body = self
            .send_with_fallback(
                Method::POST,
                &["user", "favorites", movie_id],
                &["movies", movie_id],
                NO_BODY,
            )
            .await?;

        favorites_from(&body)
    }

    #[tracing::instrument(name = "remove_favorite", skip_all, fields(movie_id = %movie_id))]
    async fn remove_favorite(&self, movie_id: &str) -> Result<Vec<String>, ApiError> {
        let body = self
            .send_with_fallback(
                Method::DELETE,
                &["user", "favorites", movie_id],
                &["movies", movie_id],
                NO_BODY,
            )
            .await?;

        favorites_from(&body)
    }
}

// Map a non-success status and its body onto the error taxonomy.
fn classify(status: StatusCode, body: &str) -> ApiError {
    let kind = match status.as_u16() {
        401 => ErrorKind::Unauthenticated,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        400 | 422 => match validation_message(body) {
            Some(message) => return ApiError::Validation(message),
            None => ErrorKind::Unknown,
        },
        // Server failure bodies are stack traces more often than messages.
        500.. => return ApiError::from_kind(ErrorKind::ServerError, None),
        _ => ErrorKind::Unknown,
    };

    ApiError::from_kind(kind, error_message(body))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| {
        warn!(error = %err, "could not decode backend response");
        malformed()
    })
}

fn favorites_from(body: &str) -> Result<Vec<String>, ApiError> {
    match decode::<FavoritesResponseDto>(body)? {
        FavoritesResponseDto::List(refs) => Ok(favorite_ids(refs)),
        FavoritesResponseDto::User(user) => user.favorite_movies.map(favorite_ids).ok_or_else(|| {
            warn!("favorite response carried no favorite list");
            malformed()
        }),
    }
}

fn malformed() -> ApiError {
    ApiError::Unknown("The movie service sent a malformed response.".to_string())
}
