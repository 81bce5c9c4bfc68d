// Domain layer: catalog entities, error taxonomy, ports and the session store.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod session;

pub use entities::{
    Credentials, Director, FavoriteStatus, Genre, LoginOutcome, Movie, ProfileEdit,
    ProfileUpdate, Registration, Session, UserProfile, UserSummary,
};
pub use errors::{ApiError, ErrorKind, StorageError};
pub use ports::{KeyValueStorage, MovieApi};
pub use session::SessionStore;
