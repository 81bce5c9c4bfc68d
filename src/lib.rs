pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{ApiError, ErrorKind, FavoriteStatus, Movie, SessionStore, UserProfile};
pub use frameworks::cli::run;
pub use interface_adapters::ApiGateway;
pub use use_cases::FavoritesSynchronizer;
