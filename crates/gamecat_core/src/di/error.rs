//! Resolution errors for the service container.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Service resolution/wiring error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No factory is registered for the requested service.
    Unregistered(&'static str),
    /// Startup validation found services without a factory.
    Missing(Vec<&'static str>),
    /// The factory chain re-entered a service that is still being built.
    Cycle(Vec<&'static str>),
    /// A factory reported a failure while building its service.
    Factory {
        service: &'static str,
        message: String,
    },
    /// A cached instance does not have the requested type.
    TypeMismatch(&'static str),
}

impl ResolveError {
    /// Wraps a factory-level failure for service `T`.
    pub fn factory<T: ?Sized + 'static>(message: impl Display) -> Self {
        Self::Factory {
            service: std::any::type_name::<T>(),
            message: message.to_string(),
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unregistered(service) => {
                write!(f, "service `{service}` is not registered in the container")
            }
            Self::Missing(services) => {
                write!(f, "services not registered: {}", services.join(", "))
            }
            Self::Cycle(chain) => write!(f, "dependency cycle: {}", chain.join(" -> ")),
            Self::Factory { service, message } => {
                write!(f, "factory for `{service}` failed: {message}")
            }
            Self::TypeMismatch(service) => {
                write!(f, "cached instance for `{service}` has an unexpected type")
            }
        }
    }
}

impl Error for ResolveError {}
