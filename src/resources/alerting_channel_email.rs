//! Email alerting channel

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_alerting_channel_email";

const EMAILS_FIELD: &str = "emails";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new().field(
            EMAILS_FIELD,
            FieldSchema::string_list()
                .required()
                .min_items(1)
                .describe("The list of emails of the alerting channel"),
        ),
        project,
        materialize,
    )
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::Email { emails } = &channel.details else {
        return Err(kind_mismatch("EMAIL", channel));
    };
    project_common(data, channel);
    data.set(EMAILS_FIELD, emails.clone());
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::Email {
        emails: data.get_string_list(EMAILS_FIELD)?,
    };
    materialize_common(data, formatter, details)
}
