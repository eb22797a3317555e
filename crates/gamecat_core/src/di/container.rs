//! Lazy-singleton service container.
//!
//! # Invariants
//! - Registration is first-write-wins; a second factory for a key is dropped.
//! - A factory runs at most once per successful resolution of its key, even
//!   when several threads resolve the key concurrently.
//! - A failed factory leaves the key unresolved; the next `get` retries.
//! - Resolving a type from inside its own factory chain is reported as
//!   `ResolveError::Cycle` instead of blocking forever. This holds across
//!   threads: before a thread waits on a key another thread is building, the
//!   container follows the waits-for chain and fails if it leads back.

use super::error::{ResolveError, ResolveResult};
use super::key::TypeKey;
use log::{debug, info};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&ServiceContainer) -> ResolveResult<Instance> + Send + Sync>;

struct Registration {
    key: TypeKey,
    factory: Factory,
}

/// Factories currently running, per thread, and the key each blocked thread
/// is waiting on.
#[derive(Default)]
struct InFlight {
    builders: HashMap<TypeId, ThreadId>,
    stacks: HashMap<ThreadId, Vec<TypeKey>>,
    waiting: HashMap<ThreadId, TypeKey>,
}

impl InFlight {
    /// Chain of keys that would close a loop if `me` waited on `key`.
    fn cycle_through(&self, me: ThreadId, key: TypeKey) -> Option<Vec<&'static str>> {
        let mut tail = Vec::new();
        let mut target = key;
        // Every other thread's wait was checked when it was recorded, so the
        // walk either reaches `me` or runs out.
        loop {
            let owner = *self.builders.get(&target.type_id())?;
            let stack = self.stacks.get(&owner)?;
            let position = stack.iter().position(|entry| *entry == target)?;
            if owner == me {
                let mut chain: Vec<_> = stack[position..].iter().map(TypeKey::type_name).collect();
                chain.extend(tail);
                chain.push(target.type_name());
                return Some(chain);
            }
            tail.push(target.type_name());
            tail.extend(stack[position + 1..].iter().map(TypeKey::type_name));
            target = *self.waiting.get(&owner)?;
        }
    }
}

/// Type-keyed lazy service registry.
///
/// Built explicitly at startup and shared by reference (usually through
/// `Arc<ServiceContainer>`); there is no process-wide instance.
#[derive(Default)]
pub struct ServiceContainer {
    factories: RwLock<HashMap<TypeId, Registration>>,
    instances: Mutex<HashMap<TypeId, Arc<OnceCell<Instance>>>>,
    in_flight: Mutex<InFlight>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `T` unless one is already present.
    ///
    /// Returns `true` when the factory was stored.
    pub fn register<T, F>(&self, factory: F) -> bool
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceContainer) -> ResolveResult<T> + Send + Sync + 'static,
    {
        self.insert_factory(
            TypeKey::of::<T>(),
            Arc::new(move |container| factory(container).map(|value| Arc::new(value) as Instance)),
        )
    }

    /// Registers an already-built instance for `T`.
    ///
    /// `get::<T>()` returns this exact `Arc`.
    pub fn register_instance<T>(&self, instance: Arc<T>) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.insert_factory(
            TypeKey::of::<T>(),
            Arc::new(move |_| Ok(Arc::clone(&instance) as Instance)),
        )
    }

    /// Drops the factory for `T`. Cached instances stay until `remove`.
    pub fn unregister<T: 'static>(&self) -> bool {
        let removed = self.factories.write().remove(&TypeId::of::<T>()).is_some();
        if removed {
            info!(
                "event=service_unregister module=di status=ok service={}",
                TypeKey::of::<T>()
            );
        }
        removed
    }

    /// Drops the cached instance for `T`. The next `get` runs the factory again.
    pub fn remove<T: 'static>(&self) -> bool {
        let removed = self.instances.lock().remove(&TypeId::of::<T>());
        matches!(removed, Some(cell) if cell.get().is_some())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.factories.read().contains_key(&TypeId::of::<T>())
    }

    pub fn is_resolved<T: 'static>(&self) -> bool {
        self.instances
            .lock()
            .get(&TypeId::of::<T>())
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Sorted names of every registered service.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .factories
            .read()
            .values()
            .map(|registration| registration.key.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the shared instance of `T`, building it on first use.
    pub fn get<T>(&self) -> ResolveResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let cell = self.instance_cell(key);
        if let Some(instance) = cell.get() {
            return downcast::<T>(key, instance);
        }

        let factory = self
            .factories
            .read()
            .get(&key.type_id())
            .map(|registration| Arc::clone(&registration.factory))
            .ok_or(ResolveError::Unregistered(key.type_name()))?;

        let _wait = WaitGuard::enter(self, key)?;
        let instance = cell.get_or_try_init(|| {
            let _build = BuildGuard::enter(self, key);
            let built = factory(self);
            match &built {
                Ok(_) => debug!("event=service_resolve module=di status=ok service={key}"),
                Err(err) => debug!(
                    "event=service_resolve module=di status=error service={key} error={err}"
                ),
            }
            built
        })?;
        downcast::<T>(key, instance)
    }

    /// Checks that every key in `required` has a factory.
    ///
    /// Reports all missing keys at once so startup wiring can be fixed in
    /// one pass.
    pub fn validate(&self, required: &[TypeKey]) -> ResolveResult<()> {
        let factories = self.factories.read();
        let mut missing: Vec<_> = required
            .iter()
            .filter(|key| !factories.contains_key(&TypeKey::type_id(key)))
            .map(TypeKey::type_name)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        missing.dedup();
        Err(ResolveError::Missing(missing))
    }

    fn insert_factory(&self, key: TypeKey, factory: Factory) -> bool {
        let mut factories = self.factories.write();
        if factories.contains_key(&key.type_id()) {
            debug!("event=service_register module=di status=skipped service={key} reason=already_registered");
            return false;
        }
        factories.insert(key.type_id(), Registration { key, factory });
        info!("event=service_register module=di status=ok service={key}");
        true
    }

    fn instance_cell(&self, key: TypeKey) -> Arc<OnceCell<Instance>> {
        Arc::clone(self.instances.lock().entry(key.type_id()).or_default())
    }
}

fn downcast<T: Send + Sync + 'static>(key: TypeKey, instance: &Instance) -> ResolveResult<Arc<T>> {
    Arc::clone(instance)
        .downcast::<T>()
        .map_err(|_| ResolveError::TypeMismatch(key.type_name()))
}

/// Marks the current thread as waiting on `key` until dropped.
struct WaitGuard<'a> {
    container: &'a ServiceContainer,
    thread: ThreadId,
}

impl<'a> WaitGuard<'a> {
    fn enter(container: &'a ServiceContainer, key: TypeKey) -> ResolveResult<Self> {
        let thread = thread::current().id();
        let mut in_flight = container.in_flight.lock();
        if let Some(chain) = in_flight.cycle_through(thread, key) {
            debug!(
                "event=service_resolve module=di status=error service={key} reason=cycle chain={}",
                chain.join("->")
            );
            return Err(ResolveError::Cycle(chain));
        }
        in_flight.waiting.insert(thread, key);
        Ok(Self { container, thread })
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.container.in_flight.lock().waiting.remove(&self.thread);
    }
}

/// Marks the current thread as the builder of `key` while its factory runs.
struct BuildGuard<'a> {
    container: &'a ServiceContainer,
    thread: ThreadId,
    key: TypeKey,
}

impl<'a> BuildGuard<'a> {
    fn enter(container: &'a ServiceContainer, key: TypeKey) -> Self {
        let thread = thread::current().id();
        let mut in_flight = container.in_flight.lock();
        in_flight.waiting.remove(&thread);
        in_flight.builders.insert(key.type_id(), thread);
        in_flight.stacks.entry(thread).or_default().push(key);
        Self {
            container,
            thread,
            key,
        }
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.container.in_flight.lock();
        in_flight.builders.remove(&self.key.type_id());
        if let Some(stack) = in_flight.stacks.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                in_flight.stacks.remove(&self.thread);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceContainer;
    use crate::di::error::ResolveError;
    use std::sync::Arc;

    struct Clock(u64);

    #[test]
    fn register_instance_returns_same_arc() {
        let container = ServiceContainer::new();
        let clock = Arc::new(Clock(7));
        assert!(container.register_instance(Arc::clone(&clock)));

        let resolved = container.get::<Clock>().expect("registered instance");
        assert!(Arc::ptr_eq(&clock, &resolved));
        assert_eq!(resolved.0, 7);
    }

    #[test]
    fn remove_reports_whether_an_instance_was_cached() {
        let container = ServiceContainer::new();
        container.register(|_| Ok(Clock(1)));
        assert!(!container.remove::<Clock>());

        container.get::<Clock>().expect("resolve");
        assert!(container.is_resolved::<Clock>());
        assert!(container.remove::<Clock>());
        assert!(!container.is_resolved::<Clock>());
    }

    #[test]
    fn registered_names_are_sorted() {
        let container = ServiceContainer::new();
        container.register(|_| Ok(Clock(1)));
        container.register(|_| Ok(String::from("svc")));
        let names = container.registered_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn factory_error_is_not_cached() {
        let container = ServiceContainer::new();
        let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        container.register(move |_| {
            let attempt = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if attempt == 0 {
                Err(ResolveError::factory::<Clock>("warming up"))
            } else {
                Ok(Clock(attempt as u64))
            }
        });

        let err = container.get::<Clock>().err().expect("first attempt fails");
        assert!(matches!(err, ResolveError::Factory { .. }));
        let clock = container.get::<Clock>().expect("second attempt succeeds");
        assert_eq!(clock.0, 1);
    }
}
