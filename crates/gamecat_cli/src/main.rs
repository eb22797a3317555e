//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gamecat_core` linkage and startup wiring without a host shell.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `gamecat [config.json]`. Without an argument the default config is
//! used, which keeps the store in memory.

use gamecat_core::{AppContext, CoreConfig, StoreLocation};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gamecat_core version={}", gamecat_core::core_version());

    let config = match load_config(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("config error: {message}");
            return ExitCode::FAILURE;
        }
    };

    match report(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("bootstrap error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<String>) -> Result<CoreConfig, String> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let raw = std::fs::read_to_string(&path).map_err(|err| format!("{path}: {err}"))?;
    CoreConfig::from_json_str(&raw).map_err(|err| err.to_string())
}

fn report(config: CoreConfig) -> Result<(), String> {
    gamecat_core::init_logging_from_config(&config)?;

    let context = AppContext::bootstrap(config).map_err(|err| err.to_string())?;
    println!("modules={}", context.modules().module_names().join(","));
    println!("providers={}", context.navigator().provider_names().join(","));
    println!("services={}", context.services().registered_names().join(","));

    let store = context.store().map_err(|err| err.to_string())?;
    let location = match store.location() {
        StoreLocation::File(path) => path.display().to_string(),
        StoreLocation::Memory => "memory".to_string(),
    };
    println!("store name={} location={location}", store.name());
    Ok(())
}
