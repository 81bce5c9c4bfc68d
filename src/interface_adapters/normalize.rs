//! Ingress normalization: wire DTOs become canonical domain entities here and
//! nowhere else, so the rest of the crate only ever sees one casing.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::domain::entities::{Director, Genre, Movie, UserProfile, UserSummary};
use crate::interface_adapters::protocol::{
    DirectorDto, ErrorBody, FavoriteRef, GenreDto, MovieDto, UserDto, ValidationBody,
};

impl From<MovieDto> for Movie {
    fn from(dto: MovieDto) -> Self {
        Movie {
            id: document_id(dto.mongo_id, dto.id).unwrap_or_default(),
            title: dto.title.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
            genre: dto.genre.map(Genre::from).unwrap_or_default(),
            director: dto.director.map(Director::from).unwrap_or_default(),
            release_year: dto
                .release_year
                .as_ref()
                .and_then(as_i64)
                .and_then(|year| i32::try_from(year).ok()),
            rating: dto.rating.as_ref().and_then(as_f64),
            image_path: dto.image_path.filter(|path| !path.trim().is_empty()),
        }
    }
}

impl From<GenreDto> for Genre {
    fn from(dto: GenreDto) -> Self {
        match dto {
            GenreDto::Named(name) => Genre {
                name,
                description: String::new(),
            },
            GenreDto::Detailed { name, description } => Genre {
                name: name.unwrap_or_default(),
                description: description.unwrap_or_default(),
            },
        }
    }
}

impl From<DirectorDto> for Director {
    fn from(dto: DirectorDto) -> Self {
        match dto {
            DirectorDto::Named(name) => Director {
                name,
                ..Director::default()
            },
            DirectorDto::Detailed {
                name,
                bio,
                birth,
                death,
            } => Director {
                name: name.unwrap_or_default(),
                bio: bio.unwrap_or_default(),
                birth: birth.as_ref().and_then(as_text),
                death: death.as_ref().and_then(as_text),
            },
        }
    }
}

impl From<UserDto> for UserProfile {
    fn from(dto: UserDto) -> Self {
        UserProfile {
            id: document_id(dto.mongo_id, dto.id),
            username: dto.username.unwrap_or_default(),
            email: dto.email.unwrap_or_default(),
            birthday: dto.birthday.as_deref().and_then(parse_birthday),
            favorite_movies: favorite_ids(dto.favorite_movies.unwrap_or_default()),
        }
    }
}

impl From<UserDto> for UserSummary {
    fn from(dto: UserDto) -> Self {
        UserProfile::from(dto).summary()
    }
}

// Flatten ids and embedded movies into unique ids, keeping server order.
pub fn favorite_ids(refs: Vec<FavoriteRef>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(refs.len());
    for favorite in refs {
        let id = match favorite {
            FavoriteRef::Id(id) => id,
            FavoriteRef::Movie { mongo_id, id } => document_id(mongo_id, id).unwrap_or_default(),
        };
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

// `_id` wins over an `id` virtual; blank values count as absent.
fn document_id(mongo_id: Option<String>, id: Option<String>) -> Option<String> {
    mongo_id
        .filter(|value| !value.trim().is_empty())
        .or(id.filter(|value| !value.trim().is_empty()))
}

// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps.
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
        .or_else(|| {
            raw.get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}

/// Joined per-field messages of a structured validation body, if the body is one.
pub fn validation_message(body: &str) -> Option<String> {
    let items = match serde_json::from_str::<ValidationBody>(body).ok()? {
        ValidationBody::Wrapped { errors } => errors,
        ValidationBody::Bare(errors) => errors,
    };

    let messages: Vec<String> = items
        .into_iter()
        .filter_map(|item| {
            let msg = item.msg.filter(|msg| !msg.trim().is_empty())?;
            Some(match item.param.filter(|param| !param.is_empty()) {
                Some(param) => format!("{param}: {msg}"),
                None => msg,
            })
        })
        .collect();

    (!messages.is_empty()).then(|| messages.join("; "))
}

// Best human-readable message in an error body: JSON envelope first, then plain text.
pub fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorBody>(body) {
        return envelope
            .message
            .or(envelope.error)
            .filter(|message| !message.trim().is_empty());
    }

    // Other JSON (arrays, bare strings, numbers) is not a message.
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => Some(text),
        Ok(_) => None,
        // Default error pages are HTML, which is no use as a message.
        Err(_) if body.starts_with('<') => None,
        Err(_) => Some(body.to_string()),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n.trunc() as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::protocol::FavoritesResponseDto;
    use serde_json::json;

    fn movie(value: Value) -> Movie {
        let dto: MovieDto = serde_json::from_value(value).expect("movie dto");
        Movie::from(dto)
    }

    #[test]
    fn when_fields_are_capitalized_then_movie_is_canonical() {
        let parsed = movie(json!({
            "_id": "m1",
            "Title": "Alien",
            "Description": "In space no one can hear you scream.",
            "Genre": { "Name": "Horror", "Description": "Scary" },
            "Director": { "Name": "Ridley Scott", "Bio": "British director", "Birth": "1937" },
            "ReleaseYear": 1979,
            "Rating": 8.5,
            "ImagePath": "alien.png"
        }));

        assert_eq!(parsed.id, "m1");
        assert_eq!(parsed.title, "Alien");
        assert_eq!(parsed.genre.name, "Horror");
        assert_eq!(parsed.director.name, "Ridley Scott");
        assert_eq!(parsed.director.birth.as_deref(), Some("1937"));
        assert_eq!(parsed.director.death, None);
        assert_eq!(parsed.release_year, Some(1979));
        assert_eq!(parsed.rating, Some(8.5));
        assert_eq!(parsed.image_path.as_deref(), Some("alien.png"));
    }

    #[test]
    fn when_fields_are_lowercase_then_movie_matches_capitalized_form() {
        let upper = movie(json!({
            "_id": "m2",
            "Title": "Heat",
            "Description": "Cops and robbers.",
            "Genre": { "Name": "Crime", "Description": "Crime films" },
            "Director": { "Name": "Michael Mann", "Bio": "American director" },
            "ReleaseYear": "1995"
        }));
        let lower = movie(json!({
            "id": "m2",
            "title": "Heat",
            "description": "Cops and robbers.",
            "genre": { "name": "Crime", "description": "Crime films" },
            "director": { "name": "Michael Mann", "bio": "American director" },
            "releaseYear": 1995
        }));

        assert_eq!(upper, lower);
    }

    #[test]
    fn when_genre_is_a_bare_name_then_description_is_empty() {
        let parsed = movie(json!({ "_id": "m3", "Title": "Up", "Genre": "Animation" }));

        assert_eq!(parsed.genre.name, "Animation");
        assert_eq!(parsed.genre.description, "");
        assert_eq!(parsed.director, Director::default());
    }

    #[test]
    fn when_favorites_mix_ids_and_movies_then_ids_are_flattened_and_deduplicated() {
        let dto: UserDto = serde_json::from_value(json!({
            "Username": "alice",
            "FavoriteMovies": ["m1", { "_id": "m2", "Title": "Heat" }, "m1"]
        }))
        .expect("user dto");

        let profile = UserProfile::from(dto);

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.favorite_movies, vec!["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn when_movie_carries_both_id_keys_then_underscore_id_wins() {
        let parsed = movie(json!({ "_id": "m1", "id": "virtual-m1", "Title": "Alien" }));

        assert_eq!(parsed.id, "m1");
        assert_eq!(parsed.title, "Alien");
        assert_eq!(movie(json!({ "id": "m2" })).id, "m2");
    }

    #[test]
    fn when_embedded_favorite_carries_both_id_keys_then_response_still_parses() {
        let dto: FavoritesResponseDto = serde_json::from_str(
            r#"{"_id":"u1","id":"u1","Username":"alice","FavoriteMovies":[{"_id":"m1","id":"m1"},"m2"]}"#,
        )
        .expect("favorites response");

        let FavoritesResponseDto::User(user) = dto else {
            panic!("expected a user response, got {dto:?}");
        };
        let profile = UserProfile::from(user);
        assert_eq!(profile.id.as_deref(), Some("u1"));
        assert_eq!(profile.favorite_movies, vec!["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn when_birthday_is_a_timestamp_then_only_the_date_is_kept() {
        assert_eq!(
            parse_birthday("1990-04-02T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(1990, 4, 2)
        );
        assert_eq!(parse_birthday("1990-04-02"), NaiveDate::from_ymd_opt(1990, 4, 2));
        assert_eq!(parse_birthday(""), None);
        assert_eq!(parse_birthday("yesterday"), None);
    }

    #[test]
    fn when_validation_body_has_fields_then_messages_are_joined() {
        let body = json!({
            "errors": [
                { "msg": "Username is required", "param": "Username", "location": "body" },
                { "msg": "Email does not appear to be valid", "path": "Email" },
                { "msg": "" }
            ]
        })
        .to_string();

        assert_eq!(
            validation_message(&body).as_deref(),
            Some("Username: Username is required; Email: Email does not appear to be valid")
        );
    }

    #[test]
    fn when_body_is_not_a_validation_shape_then_no_validation_message() {
        assert_eq!(validation_message(r#"{"message":"nope"}"#), None);
        assert_eq!(validation_message("Username already exists"), None);
        assert_eq!(validation_message(r#"{"errors":[]}"#), None);
    }

    #[test]
    fn when_error_body_varies_then_best_message_is_extracted() {
        assert_eq!(error_message(r#"{"message":"Bad token"}"#).as_deref(), Some("Bad token"));
        assert_eq!(error_message(r#"{"error":"Forbidden"}"#).as_deref(), Some("Forbidden"));
        assert_eq!(error_message("alice was not found").as_deref(), Some("alice was not found"));
        assert_eq!(error_message(r#""quoted""#).as_deref(), Some("quoted"));
        assert_eq!(error_message("[1,2]"), None);
        assert_eq!(error_message("<!DOCTYPE html><pre>Cannot GET /user</pre>"), None);
        assert_eq!(error_message("   "), None);
    }
}
