//! Service level indicator configurations

use crate::instana::rest::RestObject;
use serde::{Deserialize, Serialize};

pub const SLI_AGGREGATIONS: &[&str] = &[
    "SUM", "MEAN", "MAX", "MIN", "P25", "P50", "P75", "P90", "P95", "P98", "P99",
];

pub const SLI_TYPES: &[&str] = &[
    "application",
    "custom",
    "availability",
    "websiteEventBased",
    "websiteTimeBased",
];

pub const SLI_BOUNDARY_SCOPES: &[&str] = &["ALL", "INBOUND"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliConfig {
    #[serde(default)]
    pub id: String,
    pub sli_name: String,
    #[serde(default)]
    pub initial_evaluation_timestamp: i64,
    pub metric_configuration: MetricConfiguration,
    pub sli_entity: SliEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfiguration {
    pub metric_name: String,
    pub aggregation: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliEntity {
    pub sli_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,
    pub boundary_scope: String,
}

impl RestObject for SliConfig {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.sli_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_threshold_is_numeric_on_the_wire() {
        let config = SliConfig {
            id: "sli-1".to_string(),
            sli_name: "latency".to_string(),
            initial_evaluation_timestamp: 0,
            metric_configuration: MetricConfiguration {
                metric_name: "latency".to_string(),
                aggregation: "P90".to_string(),
                threshold: 12.5,
            },
            sli_entity: SliEntity {
                sli_type: "application".to_string(),
                application_id: Some("app-1".to_string()),
                service_id: None,
                endpoint_id: None,
                boundary_scope: "ALL".to_string(),
            },
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["metricConfiguration"]["threshold"], json!(12.5));
        assert_eq!(value["sliEntity"]["sliType"], "application");
        assert!(value["sliEntity"].get("serviceId").is_none());
    }
}
