//! Slack alerting channel

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_alerting_channel_slack";

const WEBHOOK_URL_FIELD: &str = "webhook_url";
const ICON_URL_FIELD: &str = "icon_url";
const CHANNEL_FIELD: &str = "channel";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new()
            .field(
                WEBHOOK_URL_FIELD,
                FieldSchema::string()
                    .required()
                    .describe("The webhook URL of the Slack alerting channel"),
            )
            .field(
                ICON_URL_FIELD,
                FieldSchema::string()
                    .optional()
                    .describe("The icon URL of the Slack alerting channel"),
            )
            .field(
                CHANNEL_FIELD,
                FieldSchema::string()
                    .optional()
                    .describe("The Slack channel of the alerting channel"),
            ),
        project,
        materialize,
    )
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::Slack {
        webhook_url,
        icon_url,
        channel: slack_channel,
    } = &channel.details
    else {
        return Err(kind_mismatch("SLACK", channel));
    };
    project_common(data, channel);
    data.set(WEBHOOK_URL_FIELD, webhook_url.clone());
    data.set(ICON_URL_FIELD, icon_url.clone());
    data.set(CHANNEL_FIELD, slack_channel.clone());
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::Slack {
        webhook_url: data.get_string(WEBHOOK_URL_FIELD)?,
        icon_url: data.get_optional_string(ICON_URL_FIELD)?,
        channel: data.get_optional_string(CHANNEL_FIELD)?,
    };
    materialize_common(data, formatter, details)
}
