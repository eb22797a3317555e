//! Dependency-injection container.
//!
//! # Responsibility
//! - Map a service type to a factory and lazily cache the built instance.
//! - Report wiring gaps as values, never by aborting the process.
//!
//! # Invariants
//! - Keys are compile-time type tokens (`TypeKey`), not strings.
//! - One container instance per application context; no global state.

mod container;
mod error;
mod key;

pub use container::ServiceContainer;
pub use error::{ResolveError, ResolveResult};
pub use key::TypeKey;
