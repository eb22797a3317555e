//! Explicit application context.
//!
//! # Responsibility
//! - Own the service container, the navigator and the module loader.
//! - Wire core services and first-party modules in a fixed startup order.
//!
//! # Invariants
//! - `bootstrap` either returns a fully wired context or the first error;
//!   missing services or providers are reported before anything resolves.

use crate::catalogue::{
    CatalogueModule, FavoriteService, FavoritesModule, FavoritesProvider, GameCatalogueProvider,
};
use crate::config::{ConfigError, CoreConfig};
use crate::di::{ResolveError, ServiceContainer, TypeKey};
use crate::navigation::{ModuleError, ModuleLoader, NavigationError, Navigator};
use crate::net::HttpClient;
use crate::store::Store;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type AppResult<T> = Result<T, AppError>;

/// Startup failure.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Resolve(ResolveError),
    Module(ModuleError),
    Navigation(NavigationError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Resolve(err) => write!(f, "{err}"),
            Self::Module(err) => write!(f, "{err}"),
            Self::Navigation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Resolve(err) => Some(err),
            Self::Module(err) => Some(err),
            Self::Navigation(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ResolveError> for AppError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

impl From<ModuleError> for AppError {
    fn from(value: ModuleError) -> Self {
        Self::Module(value)
    }
}

impl From<NavigationError> for AppError {
    fn from(value: NavigationError) -> Self {
        Self::Navigation(value)
    }
}

/// Services every first-party module depends on.
fn core_service_keys() -> [TypeKey; 3] {
    [
        TypeKey::of::<CoreConfig>(),
        TypeKey::of::<Store>(),
        TypeKey::of::<HttpClient>(),
    ]
}

/// Providers the host shell navigates through.
fn required_provider_keys() -> [TypeKey; 2] {
    [
        TypeKey::of::<dyn GameCatalogueProvider>(),
        TypeKey::of::<dyn FavoritesProvider>(),
    ]
}

/// Everything the core needs at runtime, passed explicitly instead of
/// living in process-wide singletons.
pub struct AppContext {
    config: Arc<CoreConfig>,
    services: Arc<ServiceContainer>,
    navigator: Arc<Navigator>,
    modules: ModuleLoader,
}

impl AppContext {
    /// Creates an empty context; nothing is registered yet.
    pub fn new(config: CoreConfig) -> Self {
        let navigator = Arc::new(Navigator::new());
        Self {
            config: Arc::new(config),
            services: Arc::new(ServiceContainer::new()),
            modules: ModuleLoader::new(Arc::clone(&navigator)),
            navigator,
        }
    }

    /// Validates `config`, registers core services and first-party modules,
    /// then loads every module.
    ///
    /// Services are factories; the store is opened on first use.
    pub fn bootstrap(config: CoreConfig) -> AppResult<Self> {
        let started_at = Instant::now();
        if let Err(err) = config.validate() {
            error!("event=app_bootstrap module=app status=error error_code=invalid_config error={err}");
            return Err(err.into());
        }

        let mut context = Self::new(config);
        context.register_core_services();
        context.register_first_party_modules()?;
        context.start()?;

        info!(
            "event=app_bootstrap module=app status=ok modules={} duration_ms={}",
            context.modules.len(),
            started_at.elapsed().as_millis()
        );
        Ok(context)
    }

    /// Validates wiring and loads every registered module.
    ///
    /// Hosts that register extra modules or override services call this
    /// after `new` instead of using `bootstrap`.
    pub fn start(&mut self) -> AppResult<usize> {
        self.services.validate(&core_service_keys())?;
        let loaded = self.modules.load_all_modules(&self.services)?;
        self.navigator.validate(&required_provider_keys())?;
        Ok(loaded)
    }

    /// Registers `CoreConfig`, `Store` and `HttpClient` unless already present.
    pub fn register_core_services(&self) {
        self.services.register_instance(Arc::clone(&self.config));
        self.services.register(|services| {
            let config = services.get::<CoreConfig>()?;
            let store = match config.data_dir.as_deref() {
                Some(dir) => Store::open(dir, &config.store_name),
                None => Store::in_memory(&config.store_name),
            };
            store.map_err(|err| ResolveError::factory::<Store>(err))
        });
        self.services.register(|services| {
            let config = services.get::<CoreConfig>()?;
            HttpClient::new(config.request_timeout())
                .map_err(|err| ResolveError::factory::<HttpClient>(err))
        });
    }

    pub fn register_first_party_modules(&mut self) -> AppResult<()> {
        let services = Arc::clone(&self.services);
        self.modules
            .register_module(|_| CatalogueModule::new(Arc::clone(&services)))?;
        self.modules
            .register_module(|_| FavoritesModule::new(services))?;
        Ok(())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn modules(&self) -> &ModuleLoader {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleLoader {
        &mut self.modules
    }

    pub fn store(&self) -> AppResult<Arc<Store>> {
        Ok(self.services.get::<Store>()?)
    }

    pub fn favorites(&self) -> AppResult<Arc<FavoriteService>> {
        Ok(self.services.get::<FavoriteService>()?)
    }
}
