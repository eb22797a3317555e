//! Core of the game catalogue app.
//! Owns dependency wiring, feature modules, local persistence and the
//! remote catalogue client; host shells only render.

pub mod app;
pub mod catalogue;
pub mod config;
pub mod db;
pub mod di;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod net;
pub mod store;

pub use app::{AppContext, AppError, AppResult};
pub use catalogue::{
    CatalogueApi, CatalogueModule, Destination, FavoriteService, FavoritesModule,
    FavoritesProvider, GameCatalogueProvider,
};
pub use config::{ConfigError, CoreConfig};
pub use di::{ResolveError, ResolveResult, ServiceContainer, TypeKey};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::favorite::FavoriteGame;
pub use model::game::{Game, GameId, GamePage, Genre};
pub use navigation::{
    LoadError, Module, ModuleError, ModuleLoader, ModuleResult, NavigationError,
    NavigationResult, Navigator,
};
pub use net::{HttpClient, NetError, NetResult, Request, RequestDescriptor, RequestMethod};
pub use store::{
    Comparison, Entity, FetchRequest, Pending, Predicate, SortDescriptor, Store, StoreError,
    StoreLocation, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
