//! Splunk alerting channel

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_alerting_channel_splunk";

const URL_FIELD: &str = "url";
const TOKEN_FIELD: &str = "token";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new()
            .field(
                URL_FIELD,
                FieldSchema::string()
                    .required()
                    .describe("The URL of the Splunk alerting channel"),
            )
            .field(
                TOKEN_FIELD,
                FieldSchema::string()
                    .required()
                    .sensitive()
                    .describe("The token of the Splunk alerting channel"),
            ),
        project,
        materialize,
    )
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::Splunk { url, token } = &channel.details else {
        return Err(kind_mismatch("SPLUNK", channel));
    };
    project_common(data, channel);
    data.set(URL_FIELD, url.clone());
    data.set(TOKEN_FIELD, token.clone());
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::Splunk {
        url: data.get_string(URL_FIELD)?,
        token: data.get_string(TOKEN_FIELD)?,
    };
    materialize_common(data, formatter, details)
}
