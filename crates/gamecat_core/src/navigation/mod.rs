//! Feature module wiring and cross-module navigation.
//!
//! # Responsibility
//! - Register feature modules and activate them after startup wiring.
//! - Let modules reach each other's capabilities through typed providers
//!   instead of compile-time references.

mod error;
mod module;
mod navigator;

pub use error::{ModuleError, ModuleResult, NavigationError, NavigationResult};
pub use module::{LoadError, Module, ModuleLoader};
pub use navigator::Navigator;
