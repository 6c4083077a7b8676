//! Declarative resource provider for Instana
//!
//! Manages alerting channels, alerting configurations, SLI configurations
//! and website monitoring configurations through the Instana REST API.

pub mod config;
pub mod host;
pub mod instana;
pub mod resource;
pub mod resources;
pub mod state;

/// Version injected at compile time via INSTANA_PROVIDER_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("INSTANA_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
