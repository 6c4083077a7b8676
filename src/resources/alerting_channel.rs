//! Parts shared by all alerting channel flavours

use super::upgrade;
use super::with_name_fields;
use crate::instana::client::InstanaApi;
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::handle::{Materializer, Projector};
use crate::resource::naming::{compute_full_name, FULL_NAME_FIELD};
use crate::resource::{
    ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema, StateUpgrader,
};

pub(crate) const SCHEMA_VERSION: u32 = 1;

pub(crate) fn new_handle(
    resource_name: &'static str,
    fields: Schema,
    project: Projector<AlertingChannel>,
    materialize: Materializer<AlertingChannel>,
) -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    ResourceHandle::new(
        resource_name,
        with_name_fields(fields),
        SCHEMA_VERSION,
        vec![StateUpgrader {
            version: 0,
            upgrade: upgrade::full_name_from_name,
        }],
        InstanaApi::alerting_channels,
        project,
        materialize,
    )
}

/// Write id and name of any channel
pub(crate) fn project_common(data: &mut ResourceData, channel: &AlertingChannel) {
    data.set_id(channel.id.clone());
    data.set(FULL_NAME_FIELD, channel.name.clone());
}

pub(crate) fn materialize_common(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
    details: AlertingChannelDetails,
) -> Result<AlertingChannel, ProviderError> {
    Ok(AlertingChannel {
        id: data.id().to_string(),
        name: compute_full_name(data, formatter)?,
        details,
    })
}

pub(crate) fn kind_mismatch(expected: &str, channel: &AlertingChannel) -> ProviderError {
    ProviderError::KindMismatch {
        expected: expected.to_string(),
        actual: channel.details.kind().to_string(),
    }
}
