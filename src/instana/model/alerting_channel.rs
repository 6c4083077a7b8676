//! Alerting channels
//!
//! All channel flavours share one endpoint and are told apart by the `kind`
//! field. Each variant only carries its own fields.

use crate::instana::rest::RestObject;
use serde::{Deserialize, Serialize};

/// Regions supported by OpsGenie
pub const OPS_GENIE_REGIONS: &[&str] = &["EU", "US"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertingChannel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub details: AlertingChannelDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AlertingChannelDetails {
    #[serde(rename = "EMAIL")]
    Email { emails: Vec<String> },

    #[serde(rename = "OPS_GENIE", rename_all = "camelCase")]
    OpsGenie {
        api_key: String,
        region: String,
        /// Comma separated list of tags
        tags: String,
    },

    #[serde(rename = "PAGER_DUTY", rename_all = "camelCase")]
    PagerDuty { service_integration_key: String },

    #[serde(rename = "SLACK", rename_all = "camelCase")]
    Slack {
        webhook_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },

    #[serde(rename = "SPLUNK")]
    Splunk { url: String, token: String },

    #[serde(rename = "WEB_HOOK", rename_all = "camelCase")]
    WebHook {
        webhook_urls: Vec<String>,
        /// Headers in `key: value` form
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<Vec<String>>,
    },
}

impl AlertingChannelDetails {
    /// The `kind` tag written on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Email { .. } => "EMAIL",
            Self::OpsGenie { .. } => "OPS_GENIE",
            Self::PagerDuty { .. } => "PAGER_DUTY",
            Self::Slack { .. } => "SLACK",
            Self::Splunk { .. } => "SPLUNK",
            Self::WebHook { .. } => "WEB_HOOK",
        }
    }
}

impl RestObject for AlertingChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
