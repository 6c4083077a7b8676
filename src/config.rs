//! Configuration Management
//!
//! Provider settings come from a YAML (or JSON) file, with the API token and
//! the endpoint overridable from the environment.

use crate::instana::client::InstanaApi;
use crate::instana::http::RetryPolicy;
use crate::resource::{Provider, ProviderMeta, ResourceNameFormatter};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_TOKEN_ENV: &str = "INSTANA_API_TOKEN";
pub const ENDPOINT_ENV: &str = "INSTANA_ENDPOINT";

fn default_name_suffix() -> String {
    "(TF managed)".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

/// Provider configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_token: String,
    /// Host (`tenant-unit.instana.io`) or full URL
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub default_name_prefix: String,
    #[serde(default = "default_name_suffix")]
    pub default_name_suffix: String,
    #[serde(default)]
    pub tls_skip_verify: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            endpoint: String::new(),
            default_name_prefix: String::new(),
            default_name_suffix: default_name_suffix(),
            tls_skip_verify: false,
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// The token never ends up in logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("default_name_prefix", &self.default_name_prefix)
            .field("default_name_suffix", &self.default_name_suffix)
            .field("tls_skip_verify", &self.tls_skip_verify)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

impl ProviderConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("instana-provider").join("config.yaml"))
    }

    /// Load configuration from `path`, or from the default location when no
    /// path is given, then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file; YAML is accepted as well as JSON
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Override token and endpoint from `lookup` (the environment in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.api_token = token;
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            self.endpoint = endpoint;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            bail!("No API token configured. Set {} or api_token in the config file", API_TOKEN_ENV);
        }
        if self.endpoint.trim().is_empty() {
            bail!("No endpoint configured. Set {} or endpoint in the config file", ENDPOINT_ENV);
        }
        Ok(())
    }

    pub fn formatter(&self) -> ResourceNameFormatter {
        ResourceNameFormatter::from_prefix_and_suffix(
            &self.default_name_prefix,
            &self.default_name_suffix,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Build the API client and the provider with all resource types
    pub fn build_provider(&self) -> Result<Provider> {
        self.validate()?;

        let api = InstanaApi::new(
            &self.endpoint,
            &self.api_token,
            self.tls_skip_verify,
            self.retry_policy(),
        )
        .context("Failed to create Instana API client")?;

        Provider::new(ProviderMeta::new(api, self.formatter()))
            .context("Failed to register resource types")
    }
}
