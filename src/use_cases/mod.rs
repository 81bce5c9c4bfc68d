// Use cases layer: account and favorites workflows over the MovieApi port.
pub mod favorites;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;

#[cfg(test)]
pub(crate) mod test_support;

pub use favorites::{FavoritesSynchronizer, ToggleError};
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use profile::{DeleteAccountUseCase, UpdateProfileUseCase};
pub use register::RegisterUseCase;
