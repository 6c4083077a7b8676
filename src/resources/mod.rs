//! Resource types managed by the provider
//!
//! Each module binds one Instana object type to the generic resource layer:
//! a schema, a projector, a materializer and the state upgraders of the
//! type's schema history.

mod alerting_channel;
pub mod alerting_channel_email;
pub mod alerting_channel_opsgenie;
pub mod alerting_channel_pagerduty;
pub mod alerting_channel_slack;
pub mod alerting_channel_splunk;
pub mod alerting_channel_webhook;
pub mod alerting_config;
pub mod sli_config;
pub mod upgrade;
pub mod website_monitoring_config;

use crate::resource::naming::{FULL_NAME_FIELD, NAME_FIELD};
use crate::resource::{FieldSchema, ProviderError, ResourceDefinition, Schema};

/// Every resource type, in registration order
pub fn definitions() -> Result<Vec<ResourceDefinition>, ProviderError> {
    Ok(vec![
        ResourceDefinition::AlertingChannel(alerting_channel_email::handle()?),
        ResourceDefinition::AlertingChannel(alerting_channel_opsgenie::handle()?),
        ResourceDefinition::AlertingChannel(alerting_channel_pagerduty::handle()?),
        ResourceDefinition::AlertingChannel(alerting_channel_slack::handle()?),
        ResourceDefinition::AlertingChannel(alerting_channel_splunk::handle()?),
        ResourceDefinition::AlertingChannel(alerting_channel_webhook::handle()?),
        ResourceDefinition::AlertingConfiguration(alerting_config::handle()?),
        ResourceDefinition::SliConfig(sli_config::handle()?),
        ResourceDefinition::WebsiteMonitoringConfig(website_monitoring_config::handle()?),
    ])
}

/// Add the `name` / `full_name` pair shared by all resource types
pub(crate) fn with_name_fields(schema: Schema) -> Schema {
    schema
        .field(
            NAME_FIELD,
            FieldSchema::string()
                .required()
                .length(1, 256)
                .describe("Configures the name of the resource"),
        )
        .field(
            FULL_NAME_FIELD,
            FieldSchema::string()
                .computed()
                .describe("The name as shown in Instana, including prefix and suffix"),
        )
}
