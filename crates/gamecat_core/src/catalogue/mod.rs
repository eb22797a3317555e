//! Game catalogue features.
//!
//! # Responsibility
//! - Talk to the remote catalogue API.
//! - Keep the user's favorite games in the local store.
//! - Package both as feature modules that publish navigator providers.

mod api;
mod favorites;
mod module;

pub use api::{CatalogueApi, MAX_PAGE_SIZE};
pub use favorites::FavoriteService;
pub use module::{
    CatalogueModule, Destination, FavoritesModule, FavoritesProvider, GameCatalogueProvider,
};
