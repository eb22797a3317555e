//! Navigator and module-loader errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NavigationResult<T> = Result<T, NavigationError>;
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Provider registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    DuplicateProvider(&'static str),
    ProviderNotFound(&'static str),
    MissingProviders(Vec<&'static str>),
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateProvider(provider) => {
                write!(f, "provider already registered: {provider}")
            }
            Self::ProviderNotFound(provider) => write!(f, "provider not registered: {provider}"),
            Self::MissingProviders(providers) => {
                write!(f, "providers not registered: {}", providers.join(", "))
            }
        }
    }
}

impl Error for NavigationError {}

/// Module registration/activation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    DuplicateModule(&'static str),
    Provider {
        module: &'static str,
        source: NavigationError,
    },
    LoadFailed {
        module: &'static str,
        message: String,
    },
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateModule(module) => write!(f, "module already registered: {module}"),
            Self::Provider { module, source } => {
                write!(f, "module `{module}` failed to publish providers: {source}")
            }
            Self::LoadFailed { module, message } => {
                write!(f, "module `{module}` failed to load: {message}")
            }
        }
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider { source, .. } => Some(source),
            Self::DuplicateModule(_) | Self::LoadFailed { .. } => None,
        }
    }
}
