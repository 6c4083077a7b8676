//! PagerDuty alerting channel

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_alerting_channel_pagerduty";

const SERVICE_INTEGRATION_KEY_FIELD: &str = "service_integration_key";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new().field(
            SERVICE_INTEGRATION_KEY_FIELD,
            FieldSchema::string()
                .required()
                .sensitive()
                .describe("The PagerDuty service integration key"),
        ),
        project,
        materialize,
    )
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::PagerDuty {
        service_integration_key,
    } = &channel.details
    else {
        return Err(kind_mismatch("PAGER_DUTY", channel));
    };
    project_common(data, channel);
    data.set(SERVICE_INTEGRATION_KEY_FIELD, service_integration_key.clone());
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::PagerDuty {
        service_integration_key: data.get_string(SERVICE_INTEGRATION_KEY_FIELD)?,
    };
    materialize_common(data, formatter, details)
}
