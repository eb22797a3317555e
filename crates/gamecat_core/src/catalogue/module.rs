//! First-party feature modules and the capabilities they publish.

use super::api::CatalogueApi;
use super::favorites::FavoriteService;
use crate::config::CoreConfig;
use crate::di::{ResolveResult, ServiceContainer, TypeKey};
use crate::model::game::GameId;
use crate::navigation::{LoadError, Module, NavigationResult, Navigator};
use crate::net::HttpClient;
use crate::store::Store;
use log::info;
use std::sync::Arc;

/// Screen a provider asks the host shell to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Name of the module owning the screen.
    pub module: &'static str,
    pub route: String,
}

/// Capability published by the catalogue module.
pub trait GameCatalogueProvider: Send + Sync {
    fn catalogue(&self) -> ResolveResult<Arc<CatalogueApi>>;

    fn game_list_destination(&self) -> Destination;

    fn game_detail_destination(&self, id: GameId) -> Destination;
}

/// Capability published by the favorites module.
pub trait FavoritesProvider: Send + Sync {
    fn favorites(&self) -> ResolveResult<Arc<FavoriteService>>;

    fn favorite_list_destination(&self) -> Destination;
}

/// Browse/search/detail feature over the remote catalogue.
pub struct CatalogueModule {
    services: Arc<ServiceContainer>,
}

impl CatalogueModule {
    pub const NAME: &'static str = "catalogue";

    pub fn new(services: Arc<ServiceContainer>) -> Self {
        Self { services }
    }
}

impl Module for CatalogueModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register_providers(self: Arc<Self>, navigator: &Navigator) -> NavigationResult<()> {
        navigator.register_provider::<dyn GameCatalogueProvider>(self)
    }

    fn load(&self, services: &ServiceContainer) -> Result<(), LoadError> {
        services.validate(&[TypeKey::of::<CoreConfig>(), TypeKey::of::<HttpClient>()])?;
        let registered = services.register(|services| {
            let config = services.get::<CoreConfig>()?;
            let client = services.get::<HttpClient>()?;
            Ok(CatalogueApi::from_config(&config, client))
        });
        log_service_registration(Self::NAME, "CatalogueApi", registered);
        Ok(())
    }
}

impl GameCatalogueProvider for CatalogueModule {
    fn catalogue(&self) -> ResolveResult<Arc<CatalogueApi>> {
        self.services.get::<CatalogueApi>()
    }

    fn game_list_destination(&self) -> Destination {
        Destination {
            module: Self::NAME,
            route: "/games".to_string(),
        }
    }

    fn game_detail_destination(&self, id: GameId) -> Destination {
        Destination {
            module: Self::NAME,
            route: format!("/games/{id}"),
        }
    }
}

/// Locally stored favorites feature.
pub struct FavoritesModule {
    services: Arc<ServiceContainer>,
}

impl FavoritesModule {
    pub const NAME: &'static str = "favorites";

    pub fn new(services: Arc<ServiceContainer>) -> Self {
        Self { services }
    }
}

impl Module for FavoritesModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register_providers(self: Arc<Self>, navigator: &Navigator) -> NavigationResult<()> {
        navigator.register_provider::<dyn FavoritesProvider>(self)
    }

    fn load(&self, services: &ServiceContainer) -> Result<(), LoadError> {
        services.validate(&[TypeKey::of::<Store>()])?;
        let registered =
            services.register(|services| Ok(FavoriteService::new(services.get::<Store>()?)));
        log_service_registration(Self::NAME, "FavoriteService", registered);
        Ok(())
    }
}

impl FavoritesProvider for FavoritesModule {
    fn favorites(&self) -> ResolveResult<Arc<FavoriteService>> {
        self.services.get::<FavoriteService>()
    }

    fn favorite_list_destination(&self) -> Destination {
        Destination {
            module: Self::NAME,
            route: "/favorites".to_string(),
        }
    }
}

fn log_service_registration(module: &str, service: &str, registered: bool) {
    // `false` means the host pre-registered its own implementation.
    let outcome = if registered { "registered" } else { "kept_existing" };
    info!("event=service_register module={module} status=ok service={service} outcome={outcome}");
}
