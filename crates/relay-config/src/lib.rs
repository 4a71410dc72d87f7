#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod providers;
pub mod server;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use providers::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level Relay configuration
///
/// Built once at startup and handed to the subsystems that need it.
/// Every section is optional; an empty file yields a working server
/// backed by the built-in provider catalog.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Completion providers keyed by the name callers use in requests
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
