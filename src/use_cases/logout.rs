use std::sync::Arc;

use tracing::info;

use crate::domain::session::SessionStore;
use crate::use_cases::favorites::FavoritesSynchronizer;

// Logout is purely local: the backend keeps no server-side session to end.
pub struct LogoutUseCase {
    pub session: Arc<SessionStore>,
    pub favorites: Arc<FavoritesSynchronizer>,
}

impl LogoutUseCase {
    pub fn execute(&self) {
        self.session.clear();
        self.favorites.reset();
        info!("logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FavoriteStatus, UserSummary};
    use crate::frameworks::storage::MemoryStorage;
    use crate::use_cases::test_support::FakeMovieApi;

    #[test]
    fn when_logged_out_then_session_and_favorites_are_cleared() {
        let session = Arc::new(SessionStore::load(Arc::new(MemoryStorage::new())));
        let favorites = Arc::new(FavoritesSynchronizer::new(Arc::new(FakeMovieApi::new())));
        session.set_session(
            "t1",
            UserSummary {
                username: "alice".to_string(),
                ..UserSummary::default()
            },
        );
        favorites.seed(vec!["m1".to_string()]);

        let logout = LogoutUseCase {
            session: session.clone(),
            favorites: favorites.clone(),
        };
        logout.execute();

        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
        assert_eq!(favorites.status("m1"), FavoriteStatus::NotFavorite);
        assert!(favorites.favorites().is_empty());
    }
}
