//! Alerting configuration
//!
//! Routes events, filtered either by event type or by rule id, to a set of
//! alerting channels.

use super::upgrade;
use super::with_name_fields;
use crate::instana::client::InstanaApi;
use crate::instana::model::{AlertingConfiguration, EventFilteringConfiguration, ALERT_EVENT_TYPES};
use crate::resource::naming::{compute_full_name, FULL_NAME_FIELD};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
    StateUpgrader,
};

pub const RESOURCE_NAME: &str = "instana_alerting_config";

pub const SCHEMA_VERSION: u32 = 1;

const INTEGRATION_IDS_FIELD: &str = "integration_ids";
const EVENT_FILTER_QUERY_FIELD: &str = "event_filter_query";
const EVENT_FILTER_EVENT_TYPES_FIELD: &str = "event_filter_event_types";
const EVENT_FILTER_RULE_IDS_FIELD: &str = "event_filter_rule_ids";

/// Upper bound on the number of channels per configuration
const MAX_INTEGRATION_IDS: usize = 1024;

pub fn handle() -> Result<ResourceHandle<AlertingConfiguration>, ProviderError> {
    ResourceHandle::new(
        RESOURCE_NAME,
        schema(),
        SCHEMA_VERSION,
        vec![StateUpgrader {
            version: 0,
            upgrade: upgrade::full_name_from_name,
        }],
        InstanaApi::alerting_configurations,
        project,
        materialize,
    )
}

fn schema() -> Schema {
    with_name_fields(
        Schema::new()
            .field(
                INTEGRATION_IDS_FIELD,
                FieldSchema::string_set()
                    .optional()
                    .max_items(MAX_INTEGRATION_IDS)
                    .describe("The ids of the alerting channels to notify"),
            )
            .field(
                EVENT_FILTER_QUERY_FIELD,
                FieldSchema::string()
                    .optional()
                    .length(0, 2048)
                    .describe("Dynamic focus query restricting the affected entities"),
            )
            .field(
                EVENT_FILTER_EVENT_TYPES_FIELD,
                FieldSchema::string_set()
                    .optional()
                    .one_of_ignore_case(ALERT_EVENT_TYPES)
                    .conflicts_with(&[EVENT_FILTER_RULE_IDS_FIELD])
                    .describe("The event types to alert on"),
            )
            .field(
                EVENT_FILTER_RULE_IDS_FIELD,
                FieldSchema::string_set()
                    .optional()
                    .conflicts_with(&[EVENT_FILTER_EVENT_TYPES_FIELD])
                    .describe("The ids of the event rules to alert on"),
            ),
    )
}

/// `None` for an empty list, the list sorted otherwise
fn sorted_non_empty(mut values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        return None;
    }
    values.sort();
    values.dedup();
    Some(values)
}

fn project(data: &mut ResourceData, config: &AlertingConfiguration) -> Result<(), ProviderError> {
    let filter = &config.event_filtering_configuration;

    data.set_id(config.id.clone());
    data.set(FULL_NAME_FIELD, config.alert_name.clone());
    data.set(
        INTEGRATION_IDS_FIELD,
        sorted_non_empty(config.integration_ids.clone()),
    );
    data.set(EVENT_FILTER_QUERY_FIELD, filter.query.clone());
    data.set(
        EVENT_FILTER_EVENT_TYPES_FIELD,
        filter.event_types.clone().and_then(|types| {
            sorted_non_empty(types.iter().map(|t| t.to_lowercase()).collect())
        }),
    );
    data.set(
        EVENT_FILTER_RULE_IDS_FIELD,
        filter.rule_ids.clone().and_then(sorted_non_empty),
    );
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingConfiguration, ProviderError> {
    let event_types: Vec<String> = data
        .get_string_list(EVENT_FILTER_EVENT_TYPES_FIELD)?
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    Ok(AlertingConfiguration {
        id: data.id().to_string(),
        alert_name: compute_full_name(data, formatter)?,
        integration_ids: data.get_string_list(INTEGRATION_IDS_FIELD)?,
        event_filtering_configuration: EventFilteringConfiguration {
            query: data.get_optional_string(EVENT_FILTER_QUERY_FIELD)?,
            rule_ids: sorted_non_empty(data.get_string_list(EVENT_FILTER_RULE_IDS_FIELD)?),
            event_types: sorted_non_empty(event_types),
        },
    })
}
