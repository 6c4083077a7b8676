//! SLI configuration
//!
//! The metric configuration and the SLI entity are single nested blocks.

use super::with_name_fields;
use crate::instana::client::InstanaApi;
use crate::instana::model::{
    MetricConfiguration, SliConfig, SliEntity, SLI_AGGREGATIONS, SLI_BOUNDARY_SCOPES, SLI_TYPES,
};
use crate::resource::data::{value_as_f64, value_as_string};
use crate::resource::naming::{compute_full_name, FULL_NAME_FIELD};
use crate::resource::{
    FieldSchema, ProviderError, RawState, ResourceData, ResourceHandle, ResourceNameFormatter,
    Schema, StateUpgrader,
};
use serde_json::Value;

pub const RESOURCE_NAME: &str = "instana_sli_config";

pub const SCHEMA_VERSION: u32 = 1;

const INITIAL_EVALUATION_TIMESTAMP_FIELD: &str = "initial_evaluation_timestamp";
const METRIC_CONFIGURATION_FIELD: &str = "metric_configuration";
const METRIC_NAME_FIELD: &str = "metric_name";
const AGGREGATION_FIELD: &str = "aggregation";
const THRESHOLD_FIELD: &str = "threshold";
const SLI_ENTITY_FIELD: &str = "sli_entity";
const TYPE_FIELD: &str = "type";
const APPLICATION_ID_FIELD: &str = "application_id";
const SERVICE_ID_FIELD: &str = "service_id";
const ENDPOINT_ID_FIELD: &str = "endpoint_id";
const BOUNDARY_SCOPE_FIELD: &str = "boundary_scope";

pub fn handle() -> Result<ResourceHandle<SliConfig>, ProviderError> {
    ResourceHandle::new(
        RESOURCE_NAME,
        schema(),
        SCHEMA_VERSION,
        vec![StateUpgrader {
            version: 0,
            upgrade: threshold_to_float,
        }],
        InstanaApi::sli_configs,
        project,
        materialize,
    )
}

fn schema() -> Schema {
    let metric_configuration = Schema::new()
        .field(
            METRIC_NAME_FIELD,
            FieldSchema::string().required().describe("The metric name"),
        )
        .field(
            AGGREGATION_FIELD,
            FieldSchema::string()
                .required()
                .one_of(SLI_AGGREGATIONS)
                .describe("The aggregation type of the metric"),
        )
        .field(
            THRESHOLD_FIELD,
            FieldSchema::float().required().describe("The metric threshold"),
        );

    let sli_entity = Schema::new()
        .field(
            TYPE_FIELD,
            FieldSchema::string()
                .required()
                .one_of(SLI_TYPES)
                .describe("The entity type"),
        )
        .field(APPLICATION_ID_FIELD, FieldSchema::string().optional())
        .field(SERVICE_ID_FIELD, FieldSchema::string().optional())
        .field(ENDPOINT_ID_FIELD, FieldSchema::string().optional())
        .field(
            BOUNDARY_SCOPE_FIELD,
            FieldSchema::string()
                .required()
                .one_of(SLI_BOUNDARY_SCOPES)
                .describe("The boundary scope of the entity"),
        );

    with_name_fields(
        Schema::new()
            .field(
                INITIAL_EVALUATION_TIMESTAMP_FIELD,
                FieldSchema::int()
                    .optional()
                    .default_value(0)
                    .describe("Epoch millis at which the SLI is first evaluated"),
            )
            .field(
                METRIC_CONFIGURATION_FIELD,
                FieldSchema::block(metric_configuration)
                    .required()
                    .min_items(1)
                    .max_items(1),
            )
            .field(
                SLI_ENTITY_FIELD,
                FieldSchema::block(sli_entity)
                    .required()
                    .min_items(1)
                    .max_items(1),
            ),
    )
}

/// 0 → 1: version 0 stored the metric threshold as a string
pub fn threshold_to_float(mut state: RawState) -> Result<RawState, String> {
    let Some(Value::Array(blocks)) = state.get_mut(METRIC_CONFIGURATION_FIELD) else {
        return Ok(state);
    };

    for block in blocks.iter_mut() {
        let Some(block) = block.as_object_mut() else {
            return Err("metric_configuration must contain objects".to_string());
        };
        if let Some(Value::String(threshold)) = block.get(THRESHOLD_FIELD) {
            let parsed: f64 = threshold
                .trim()
                .parse()
                .map_err(|_| format!("threshold '{}' is not a number", threshold))?;
            if !parsed.is_finite() {
                return Err(format!("threshold '{}' is not a finite number", threshold));
            }
            block.insert(THRESHOLD_FIELD.to_string(), Value::from(parsed));
        }
    }
    Ok(state)
}

fn required_block<'a>(data: &'a ResourceData, field: &str) -> Result<&'a RawState, ProviderError> {
    data.get_block(field)?
        .ok_or_else(|| ProviderError::schema(field, "block is missing"))
}

fn block_string(block: &RawState, parent: &str, field: &str) -> Result<Option<String>, ProviderError> {
    value_as_string(&format!("{}.0.{}", parent, field), block.get(field))
}

fn project(data: &mut ResourceData, config: &SliConfig) -> Result<(), ProviderError> {
    data.set_id(config.id.clone());
    data.set(FULL_NAME_FIELD, config.sli_name.clone());
    data.set(
        INITIAL_EVALUATION_TIMESTAMP_FIELD,
        config.initial_evaluation_timestamp,
    );

    let metric = &config.metric_configuration;
    let mut metric_block = RawState::new();
    metric_block.insert(METRIC_NAME_FIELD.to_string(), metric.metric_name.clone().into());
    metric_block.insert(AGGREGATION_FIELD.to_string(), metric.aggregation.clone().into());
    metric_block.insert(THRESHOLD_FIELD.to_string(), metric.threshold.into());
    data.set_block(METRIC_CONFIGURATION_FIELD, metric_block);

    let entity = &config.sli_entity;
    let mut entity_block = RawState::new();
    entity_block.insert(TYPE_FIELD.to_string(), entity.sli_type.clone().into());
    for (field, value) in [
        (APPLICATION_ID_FIELD, &entity.application_id),
        (SERVICE_ID_FIELD, &entity.service_id),
        (ENDPOINT_ID_FIELD, &entity.endpoint_id),
    ] {
        if let Some(value) = value {
            entity_block.insert(field.to_string(), value.clone().into());
        }
    }
    entity_block.insert(
        BOUNDARY_SCOPE_FIELD.to_string(),
        entity.boundary_scope.clone().into(),
    );
    data.set_block(SLI_ENTITY_FIELD, entity_block);
    Ok(())
}

fn materialize(data: &ResourceData, formatter: &ResourceNameFormatter) -> Result<SliConfig, ProviderError> {
    let metric = required_block(data, METRIC_CONFIGURATION_FIELD)?;
    let entity = required_block(data, SLI_ENTITY_FIELD)?;
    let metric_path = METRIC_CONFIGURATION_FIELD;
    let entity_path = SLI_ENTITY_FIELD;

    Ok(SliConfig {
        id: data.id().to_string(),
        sli_name: compute_full_name(data, formatter)?,
        initial_evaluation_timestamp: data.get_i64(INITIAL_EVALUATION_TIMESTAMP_FIELD)?,
        metric_configuration: MetricConfiguration {
            metric_name: block_string(metric, metric_path, METRIC_NAME_FIELD)?.unwrap_or_default(),
            aggregation: block_string(metric, metric_path, AGGREGATION_FIELD)?.unwrap_or_default(),
            threshold: value_as_f64(
                &format!("{}.0.{}", metric_path, THRESHOLD_FIELD),
                metric.get(THRESHOLD_FIELD),
            )?,
        },
        sli_entity: SliEntity {
            sli_type: block_string(entity, entity_path, TYPE_FIELD)?.unwrap_or_default(),
            application_id: block_string(entity, entity_path, APPLICATION_ID_FIELD)?,
            service_id: block_string(entity, entity_path, SERVICE_ID_FIELD)?,
            endpoint_id: block_string(entity, entity_path, ENDPOINT_ID_FIELD)?,
            boundary_scope: block_string(entity, entity_path, BOUNDARY_SCOPE_FIELD)?
                .unwrap_or_default(),
        },
    })
}
