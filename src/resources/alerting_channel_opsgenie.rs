//! OpsGenie alerting channel
//!
//! Tags are a list locally and a comma separated string on the wire.

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails, OPS_GENIE_REGIONS};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};

pub const RESOURCE_NAME: &str = "instana_alerting_channel_opsgenie";

const API_KEY_FIELD: &str = "api_key";
const REGION_FIELD: &str = "region";
const TAGS_FIELD: &str = "tags";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new()
            .field(
                API_KEY_FIELD,
                FieldSchema::string()
                    .required()
                    .sensitive()
                    .describe("The OpsGenie API key"),
            )
            .field(
                REGION_FIELD,
                FieldSchema::string()
                    .required()
                    .one_of(OPS_GENIE_REGIONS)
                    .describe("The OpsGenie region"),
            )
            .field(
                TAGS_FIELD,
                FieldSchema::string_list()
                    .required()
                    .min_items(1)
                    .describe("The OpsGenie tags"),
            ),
        project,
        materialize,
    )
}

/// Split the wire form, trimming spaces around each tag
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::OpsGenie {
        api_key,
        region,
        tags,
    } = &channel.details
    else {
        return Err(kind_mismatch("OPS_GENIE", channel));
    };
    project_common(data, channel);
    data.set(API_KEY_FIELD, api_key.clone());
    data.set(REGION_FIELD, region.clone());
    data.set(TAGS_FIELD, split_tags(tags));
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::OpsGenie {
        api_key: data.get_string(API_KEY_FIELD)?,
        region: data.get_string(REGION_FIELD)?,
        tags: data.get_string_list(TAGS_FIELD)?.join(","),
    };
    materialize_common(data, formatter, details)
}
