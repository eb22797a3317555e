//! Capability provider registry shared by feature modules.

use super::error::{NavigationError, NavigationResult};
use crate::di::TypeKey;
use log::info;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

struct ProviderEntry {
    key: TypeKey,
    // Always holds an `Arc<P>` for the `P` named by `key`.
    provider: Box<dyn Any + Send + Sync>,
}

/// Registry mapping a provider type to the instance a module published.
///
/// Provider types are usually trait objects (`dyn FavoritesProvider`), so a
/// consumer depends on the capability, never on the module that offers it.
#[derive(Default)]
pub struct Navigator {
    providers: RwLock<HashMap<TypeId, ProviderEntry>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `provider` under the key of `P`.
    pub fn register_provider<P>(&self, provider: Arc<P>) -> NavigationResult<()>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<P>();
        let mut providers = self.providers.write();
        if providers.contains_key(&key.type_id()) {
            return Err(NavigationError::DuplicateProvider(key.type_name()));
        }
        providers.insert(
            key.type_id(),
            ProviderEntry {
                key,
                provider: Box::new(provider),
            },
        );
        info!("event=provider_register module=navigation status=ok provider={key}");
        Ok(())
    }

    /// Returns the provider published under `P`.
    pub fn get_provider<P>(&self) -> NavigationResult<Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<P>();
        self.providers
            .read()
            .get(&key.type_id())
            .and_then(|entry| entry.provider.downcast_ref::<Arc<P>>())
            .cloned()
            .ok_or(NavigationError::ProviderNotFound(key.type_name()))
    }

    pub fn contains<P: ?Sized + 'static>(&self) -> bool {
        self.providers.read().contains_key(&TypeId::of::<P>())
    }

    /// Reports every provider in `required` that nobody published.
    pub fn validate(&self, required: &[TypeKey]) -> NavigationResult<()> {
        let providers = self.providers.read();
        let mut missing: Vec<_> = required
            .iter()
            .filter(|key| !providers.contains_key(&TypeKey::type_id(key)))
            .map(TypeKey::type_name)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        missing.dedup();
        Err(NavigationError::MissingProviders(missing))
    }

    /// Moves every provider of `staged` into this navigator, or none of them
    /// when any key is already taken.
    pub(crate) fn absorb(&self, staged: Navigator) -> NavigationResult<usize> {
        let incoming = staged.providers.into_inner();
        let mut providers = self.providers.write();
        let taken = incoming
            .iter()
            .filter(|(type_id, _)| providers.contains_key(*type_id))
            .map(|(_, entry)| entry.key.type_name())
            .min();
        if let Some(name) = taken {
            return Err(NavigationError::DuplicateProvider(name));
        }
        let count = incoming.len();
        providers.extend(incoming);
        Ok(count)
    }

    /// Sorted provider names.
    pub fn provider_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .providers
            .read()
            .values()
            .map(|entry| entry.key.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}
