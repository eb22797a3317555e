//! Feature module contract and loader.
//!
//! # Invariants
//! - Providers are published at registration time; `load` runs later, once
//!   every module has been registered.
//! - A module's providers are published all together or not at all; a
//!   rejected module leaves nothing behind in the navigator.
//! - Each module is loaded at most once, in registration order.

use super::error::{ModuleError, ModuleResult, NavigationResult};
use super::navigator::Navigator;
use crate::di::{ServiceContainer, TypeKey};
use log::{error, info};
use std::error::Error;
use std::sync::Arc;

/// Error type returned by module activation hooks.
pub type LoadError = Box<dyn Error + Send + Sync>;

/// Independently built feature unit.
pub trait Module: Send + Sync + 'static {
    /// Stable diagnostic name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Publishes the capabilities this module offers to other modules.
    fn register_providers(self: Arc<Self>, navigator: &Navigator) -> NavigationResult<()>;

    /// Activation hook, typically registering the module's services.
    fn load(&self, services: &ServiceContainer) -> Result<(), LoadError>;
}

struct ModuleEntry {
    key: TypeKey,
    module: Arc<dyn Module>,
    loaded: bool,
}

/// Collects feature modules and forwards their providers to the navigator.
pub struct ModuleLoader {
    navigator: Arc<Navigator>,
    modules: Vec<ModuleEntry>,
}

impl ModuleLoader {
    pub fn new(navigator: Arc<Navigator>) -> Self {
        Self {
            navigator,
            modules: Vec::new(),
        }
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Builds a module with `factory`, stores it and publishes its providers.
    pub fn register_module<M, F>(&mut self, factory: F) -> ModuleResult<()>
    where
        M: Module,
        F: FnOnce(&ModuleLoader) -> M,
    {
        let key = TypeKey::of::<M>();
        if self.modules.iter().any(|entry| entry.key == key) {
            return Err(ModuleError::DuplicateModule(key.type_name()));
        }

        let module = Arc::new(factory(self));
        let name = module.name();
        let staged = Navigator::new();
        let published = Arc::clone(&module)
            .register_providers(&staged)
            .and_then(|()| self.navigator.absorb(staged))
            .map_err(|source| {
                error!("event=module_register module=navigation status=error name={name} error={source}");
                ModuleError::Provider {
                    module: name,
                    source,
                }
            })?;

        self.modules.push(ModuleEntry {
            key,
            module,
            loaded: false,
        });
        info!("event=module_register module=navigation status=ok name={name} providers={published}");
        Ok(())
    }

    /// Runs `load` on every module that has not been loaded yet.
    ///
    /// Returns the number of modules loaded by this call. Stops at the first
    /// failing module; modules after it stay unloaded.
    pub fn load_all_modules(&mut self, services: &ServiceContainer) -> ModuleResult<usize> {
        let mut loaded_now = 0;
        for entry in self.modules.iter_mut().filter(|entry| !entry.loaded) {
            let name = entry.module.name();
            info!("event=module_load module=navigation status=start name={name}");
            if let Err(err) = entry.module.load(services) {
                error!("event=module_load module=navigation status=error name={name} error={err}");
                return Err(ModuleError::LoadFailed {
                    module: name,
                    message: err.to_string(),
                });
            }
            entry.loaded = true;
            loaded_now += 1;
        }
        Ok(loaded_now)
    }

    pub fn is_loaded<M: Module>(&self) -> bool {
        let key = TypeKey::of::<M>();
        self.modules
            .iter()
            .any(|entry| entry.key == key && entry.loaded)
    }

    /// Module names in registration order.
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|entry| entry.module.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
