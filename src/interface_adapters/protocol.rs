use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Wire shapes for the movie backend. Field casing differs between backend versions,
// so every inbound field lists its known spellings as aliases.

#[derive(Debug, Deserialize)]
pub struct MovieDto {
    // Mongoose documents may carry both `_id` and an `id` virtual.
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<String>,
    #[serde(default, alias = "ID", alias = "Id")]
    pub id: Option<String>,
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Genre")]
    pub genre: Option<GenreDto>,
    #[serde(default, alias = "Director")]
    pub director: Option<DirectorDto>,
    // Numbers on newer backends, strings on older ones.
    #[serde(default, alias = "ReleaseYear", alias = "releaseYear", alias = "Year", alias = "year")]
    pub release_year: Option<Value>,
    #[serde(default, alias = "Rating")]
    pub rating: Option<Value>,
    #[serde(default, alias = "ImagePath", alias = "imagePath", alias = "ImageURL", alias = "imageUrl")]
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenreDto {
    Named(String),
    Detailed {
        #[serde(default, alias = "Name")]
        name: Option<String>,
        #[serde(default, alias = "Description")]
        description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DirectorDto {
    Named(String),
    Detailed {
        #[serde(default, alias = "Name")]
        name: Option<String>,
        #[serde(default, alias = "Bio")]
        bio: Option<String>,
        #[serde(default, alias = "Birth", alias = "BirthYear", alias = "birthYear")]
        birth: Option<Value>,
        #[serde(default, alias = "Death", alias = "DeathYear", alias = "deathYear")]
        death: Option<Value>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct UserDto {
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<String>,
    #[serde(default, alias = "ID", alias = "Id")]
    pub id: Option<String>,
    #[serde(default, alias = "Username")]
    pub username: Option<String>,
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Birthday")]
    pub birthday: Option<String>,
    #[serde(default, alias = "FavoriteMovies", alias = "favoriteMovies")]
    pub favorite_movies: Option<Vec<FavoriteRef>>,
}

// Favorites arrive as bare ids or as embedded movie objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FavoriteRef {
    Id(String),
    Movie {
        #[serde(default, rename = "_id")]
        mongo_id: Option<String>,
        #[serde(default, alias = "ID", alias = "Id")]
        id: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct LoginResponseDto {
    #[serde(alias = "Token")]
    pub token: String,
    #[serde(default, alias = "User")]
    pub user: UserDto,
}

// Answer to a favorite add/remove: either the updated user or just the list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FavoritesResponseDto {
    List(Vec<FavoriteRef>),
    User(UserDto),
}

// Request payload for login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// Request payload for account creation; the users route takes lower-case keys.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

// Request payload for a profile edit; the user route takes capitalized keys.
#[derive(Serialize)]
pub struct ProfileUpdateRequest<'a> {
    #[serde(rename = "Username", skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(rename = "Birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

// Plain error envelope used by most failing routes.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
}

// Structured validation failure, e.g. `{"errors":[{"msg":"...","param":"Username"}]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ValidationBody {
    Wrapped { errors: Vec<ValidationItem> },
    Bare(Vec<ValidationItem>),
}

#[derive(Debug, Deserialize)]
pub struct ValidationItem {
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default, alias = "path", alias = "field")]
    pub param: Option<String>,
}
