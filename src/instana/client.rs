//! Instana Client
//!
//! Main client for the Instana REST API, combining the endpoint with the
//! authenticated HTTP client and building the per-type REST resources.

use super::error::RestError;
use super::http::{InstanaHttpClient, RetryPolicy};
use super::model::{AlertingChannel, AlertingConfiguration, SliConfig, WebsiteMonitoringConfig};
use super::rest::{RestResource, UpsertMode};
use url::Url;

pub const ALERTING_CHANNELS_PATH: &str = "/api/events/settings/alertingChannels";
pub const ALERTING_CONFIGURATIONS_PATH: &str = "/api/events/settings/alerts";
pub const SLI_CONFIGS_PATH: &str = "/api/settings/v1/slis";
pub const WEBSITE_MONITORING_CONFIG_PATH: &str = "/api/website-monitoring/config";

/// Main Instana client, cheap to clone and safe to share between tasks
#[derive(Clone)]
pub struct InstanaApi {
    pub http: InstanaHttpClient,
    base_url: Url,
}

impl InstanaApi {
    /// Create a new client. `endpoint` is either a bare host
    /// (`tenant-unit.instana.io`) or a full URL with scheme.
    pub fn new(
        endpoint: &str,
        api_token: &str,
        tls_skip_verify: bool,
        retry: RetryPolicy,
    ) -> Result<Self, RestError> {
        let base_url = parse_endpoint(endpoint)?;
        let http = InstanaHttpClient::new(api_token, tls_skip_verify, retry)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an absolute API URL from a path starting with `/`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Build the URL of a single object under `path`
    pub fn object_url(&self, path: &str, id: &str) -> String {
        format!("{}/{}", self.api_url(path), urlencoding::encode(id))
    }

    // =========================================================================
    // REST resources
    // =========================================================================

    pub fn alerting_channels(&self) -> RestResource<AlertingChannel> {
        RestResource::new(self.clone(), ALERTING_CHANNELS_PATH, UpsertMode::PutById)
    }

    pub fn alerting_configurations(&self) -> RestResource<AlertingConfiguration> {
        RestResource::new(self.clone(), ALERTING_CONFIGURATIONS_PATH, UpsertMode::PutById)
    }

    pub fn sli_configs(&self) -> RestResource<SliConfig> {
        RestResource::new(self.clone(), SLI_CONFIGS_PATH, UpsertMode::CreatePostUpdatePut)
    }

    pub fn website_monitoring_configs(&self) -> RestResource<WebsiteMonitoringConfig> {
        RestResource::new(
            self.clone(),
            WEBSITE_MONITORING_CONFIG_PATH,
            UpsertMode::NameQueryParameter,
        )
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, RestError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(RestError::InvalidEndpoint(endpoint.to_string()));
    }

    let candidate = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    let url = Url::parse(&candidate).map_err(|_| RestError::InvalidEndpoint(endpoint.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(RestError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
}
