//! Domain models for the gateway.

pub mod favorite;
pub mod user;

pub use favorite::{Favorite, FavoriteInput, InvalidFavorite, NewFavorite};
pub use user::{AuthUser, User};
