//! Resource Registry
//!
//! Holds the process-wide provider state (API client and name formatter)
//! and every resource type the provider manages, keyed by its type name.

use super::data::{RawState, ResourceData};
use super::error::ProviderError;
use super::formatter::{ResourceNameFormatter, ResourceStringFormatter};
use super::handle::ResourceHandle;
use super::lifecycle;
use super::schema::Schema;
use crate::instana::client::InstanaApi;
use crate::instana::model::{
    AlertingChannel, AlertingConfiguration, SliConfig, WebsiteMonitoringConfig,
};
use std::collections::BTreeMap;

/// State shared by all lifecycle calls, fixed at provider start
#[derive(Clone)]
pub struct ProviderMeta {
    pub api: InstanaApi,
    pub formatter: ResourceNameFormatter,
    /// Name formatter plus the managed-by note for free-text descriptions
    pub descriptions: ResourceStringFormatter,
}

impl ProviderMeta {
    pub fn new(api: InstanaApi, formatter: ResourceNameFormatter) -> Self {
        Self {
            api,
            descriptions: ResourceStringFormatter::new(formatter.clone()),
            formatter,
        }
    }
}

/// A resource type together with its lifecycle operations
#[derive(Debug)]
pub enum ResourceDefinition {
    AlertingChannel(ResourceHandle<AlertingChannel>),
    AlertingConfiguration(ResourceHandle<AlertingConfiguration>),
    SliConfig(ResourceHandle<SliConfig>),
    WebsiteMonitoringConfig(ResourceHandle<WebsiteMonitoringConfig>),
}

macro_rules! with_handle {
    ($definition:expr, $handle:ident => $body:expr) => {
        match $definition {
            ResourceDefinition::AlertingChannel($handle) => $body,
            ResourceDefinition::AlertingConfiguration($handle) => $body,
            ResourceDefinition::SliConfig($handle) => $body,
            ResourceDefinition::WebsiteMonitoringConfig($handle) => $body,
        }
    };
}

impl ResourceDefinition {
    pub fn resource_name(&self) -> &'static str {
        with_handle!(self, handle => handle.resource_name())
    }

    pub fn schema(&self) -> &Schema {
        with_handle!(self, handle => handle.schema())
    }

    pub fn schema_version(&self) -> u32 {
        with_handle!(self, handle => handle.schema_version())
    }

    pub fn upgrade_state(&self, raw: RawState, from_version: u32) -> Result<RawState, ProviderError> {
        with_handle!(self, handle => handle.upgrade_state(raw, from_version))
    }

    /// Validate a user configuration and write it into the planned state
    pub fn plan(&self, data: &mut ResourceData, config: &RawState) -> Result<(), ProviderError> {
        self.schema().plan(self.resource_name(), data, config)
    }

    pub async fn create(&self, meta: &ProviderMeta, data: &mut ResourceData) -> Result<(), ProviderError> {
        with_handle!(self, handle => lifecycle::create(handle, meta, data).await)
    }

    pub async fn read(&self, meta: &ProviderMeta, data: &mut ResourceData) -> Result<(), ProviderError> {
        with_handle!(self, handle => lifecycle::read(handle, meta, data).await)
    }

    pub async fn update(&self, meta: &ProviderMeta, data: &mut ResourceData) -> Result<(), ProviderError> {
        with_handle!(self, handle => lifecycle::update(handle, meta, data).await)
    }

    pub async fn delete(&self, meta: &ProviderMeta, data: &mut ResourceData) -> Result<(), ProviderError> {
        with_handle!(self, handle => lifecycle::delete(handle, meta, data).await)
    }

    pub async fn import(
        &self,
        meta: &ProviderMeta,
        data: &mut ResourceData,
        id: &str,
    ) -> Result<(), ProviderError> {
        with_handle!(self, handle => lifecycle::import(handle, meta, data, id).await)
    }
}

/// The provider: shared state plus all registered resource types
pub struct Provider {
    meta: ProviderMeta,
    resources: BTreeMap<&'static str, ResourceDefinition>,
}

impl Provider {
    /// Build the provider with every resource type from [`crate::resources`]
    pub fn new(meta: ProviderMeta) -> Result<Self, ProviderError> {
        let mut resources = BTreeMap::new();
        for definition in crate::resources::definitions()? {
            let name = definition.resource_name();
            if resources.insert(name, definition).is_some() {
                return Err(ProviderError::InvalidHandle {
                    resource: name.to_string(),
                    message: "registered twice".to_string(),
                });
            }
        }
        Ok(Self { meta, resources })
    }

    pub fn meta(&self) -> &ProviderMeta {
        &self.meta
    }

    /// Get a resource definition by type name
    pub fn resource(&self, name: &str) -> Result<&ResourceDefinition, ProviderError> {
        self.resources
            .get(name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// All resource type names, sorted
    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }
}
