// In-process fake of the movie backend: scripted replies plus a log of every request.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use movie_client::domain::UserSummary;
use movie_client::frameworks::storage::MemoryStorage;
use movie_client::{ApiGateway, SessionStore};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be json")
    }
}

#[derive(Default)]
struct Backend {
    replies: HashMap<(String, String), (u16, String)>,
    hits: Vec<Hit>,
}

type Shared = Arc<Mutex<Backend>>;

pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    // Serve on an ephemeral port for the lifetime of the calling test runtime.
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new().fallback(answer).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral test port");
        let addr = listener.local_addr().expect("get local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend failed");
        });

        Self {
            base_url: format!("http://{addr}/"),
            state,
        }
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.lock()
            .replies
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
    }

    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond(method, path, status, &body.to_string());
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.lock().hits.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.hits()
            .into_iter()
            .map(|hit| format!("{} {}", hit.method, hit.path))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.state.lock().expect("fake backend mutex poisoned")
    }
}

async fn answer(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut backend = state.lock().expect("fake backend mutex poisoned");
    backend.hits.push(Hit {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    match backend
        .replies
        .get(&(method.to_string(), uri.path().to_string()))
    {
        Some((status, body)) => Response::builder()
            .status(*status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.clone()))
            .expect("build scripted response"),
        // Mimics the HTML error page of an Express backend for unknown routes.
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html")],
            format!("<!DOCTYPE html><pre>Cannot {} {}</pre>", method, uri.path()),
        )
            .into_response(),
    }
}

pub fn new_session() -> Arc<SessionStore> {
    Arc::new(SessionStore::load(Arc::new(MemoryStorage::new())))
}

pub fn logged_in_session(username: &str, favorites: &[&str]) -> Arc<SessionStore> {
    let session = new_session();
    session.set_session(
        "t1",
        UserSummary {
            id: None,
            username: username.to_string(),
            email: None,
            favorite_movies: favorites.iter().map(|id| id.to_string()).collect(),
        },
    );
    session
}

pub fn gateway(base_url: &str, session: Arc<SessionStore>) -> ApiGateway {
    ApiGateway::new(base_url, Duration::from_secs(2), session).expect("build gateway")
}

// Base URL of a port that was bound and released, so connections are refused.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind throwaway port");
    let addr = listener.local_addr().expect("get throwaway addr");
    drop(listener);
    format!("http://{addr}/")
}
