use std::{env, path::PathBuf, time::Duration};

// Runtime settings read from the environment, each with a fallback.

pub const DEFAULT_API_URL: &str = "https://iecm-movies-app.herokuapp.com/";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SESSION_FILE: &str = ".movie_client/session.json";

pub fn api_base_url() -> String {
    env::var("MOVIE_API_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn request_timeout() -> Duration {
    let millis = parse_millis(env::var("MOVIE_API_TIMEOUT_MS").ok().as_deref())
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(millis)
}

pub fn session_path() -> PathBuf {
    env::var_os("MOVIE_CLIENT_SESSION_FILE")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

// Zero would disable the timeout entirely, so it counts as unset.
fn parse_millis(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|millis| *millis > 0)
}
