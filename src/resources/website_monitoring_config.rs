//! Website monitoring configuration

use super::with_name_fields;
use crate::instana::client::InstanaApi;
use crate::instana::model::WebsiteMonitoringConfig;
use crate::resource::naming::{compute_full_name, FULL_NAME_FIELD};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_website_monitoring_config";

pub const SCHEMA_VERSION: u32 = 0;

const APP_NAME_FIELD: &str = "app_name";

pub fn handle() -> Result<ResourceHandle<WebsiteMonitoringConfig>, ProviderError> {
    ResourceHandle::new(
        RESOURCE_NAME,
        with_name_fields(Schema::new().field(
            APP_NAME_FIELD,
            FieldSchema::string()
                .computed()
                .describe("The application name assigned by Instana"),
        )),
        SCHEMA_VERSION,
        Vec::new(),
        InstanaApi::website_monitoring_configs,
        project,
        materialize,
    )
}

fn project(data: &mut ResourceData, config: &WebsiteMonitoringConfig) -> Result<(), ProviderError> {
    data.set_id(config.id.clone());
    data.set(FULL_NAME_FIELD, config.name.clone());
    data.set(APP_NAME_FIELD, config.app_name.clone());
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<WebsiteMonitoringConfig, ProviderError> {
    Ok(WebsiteMonitoringConfig {
        id: data.id().to_string(),
        name: compute_full_name(data, formatter)?,
        app_name: data.get_optional_string(APP_NAME_FIELD)?,
    })
}
