//! Alerting configurations

use crate::instana::rest::RestObject;
use serde::{Deserialize, Serialize};

/// Event types an alert can be filtered on, in wire form
pub const ALERT_EVENT_TYPES: &[&str] = &[
    "incident",
    "critical",
    "warning",
    "change",
    "online",
    "offline",
    "agent_monitoring_issue",
    "none",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertingConfiguration {
    #[serde(default)]
    pub id: String,
    pub alert_name: String,
    #[serde(default)]
    pub integration_ids: Vec<String>,
    #[serde(default)]
    pub event_filtering_configuration: EventFilteringConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilteringConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,
}

impl RestObject for AlertingConfiguration {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.alert_name
    }
}
