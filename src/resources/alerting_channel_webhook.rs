//! Generic webhook alerting channel
//!
//! Headers are a map locally and a list of `key: value` strings on the wire.

use super::alerting_channel::{kind_mismatch, materialize_common, new_handle, project_common};
use crate::instana::model::{AlertingChannel, AlertingChannelDetails};
use crate::resource::{
    FieldSchema, ProviderError, ResourceData, ResourceHandle, ResourceNameFormatter, Schema,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const RESOURCE_NAME: &str = "instana_alerting_channel_webhook";

const WEBHOOK_URLS_FIELD: &str = "webhook_urls";
const HTTP_HEADERS_FIELD: &str = "http_headers";

pub fn handle() -> Result<ResourceHandle<AlertingChannel>, ProviderError> {
    new_handle(
        RESOURCE_NAME,
        Schema::new()
            .field(
                WEBHOOK_URLS_FIELD,
                FieldSchema::string_list()
                    .required()
                    .min_items(1)
                    .describe("The list of webhook URLs"),
            )
            .field(
                HTTP_HEADERS_FIELD,
                FieldSchema::string_map()
                    .optional()
                    .describe("Optional HTTP headers sent with every request"),
            ),
        project,
        materialize,
    )
}

fn format_headers(headers: &BTreeMap<String, String>) -> Option<Vec<String>> {
    if headers.is_empty() {
        return None;
    }
    Some(
        headers
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect(),
    )
}

/// Parse `key: value` headers; entries without a colon get an empty value
fn parse_headers(headers: &[String]) -> Map<String, Value> {
    headers
        .iter()
        .map(|header| match header.split_once(':') {
            Some((key, value)) => (key.trim().to_string(), Value::String(value.trim().to_string())),
            None => (header.trim().to_string(), Value::String(String::new())),
        })
        .collect()
}

fn project(data: &mut ResourceData, channel: &AlertingChannel) -> Result<(), ProviderError> {
    let AlertingChannelDetails::WebHook {
        webhook_urls,
        headers,
    } = &channel.details
    else {
        return Err(kind_mismatch("WEB_HOOK", channel));
    };
    project_common(data, channel);
    data.set(WEBHOOK_URLS_FIELD, webhook_urls.clone());
    match headers.as_deref() {
        Some(headers) if !headers.is_empty() => {
            data.set(HTTP_HEADERS_FIELD, Value::Object(parse_headers(headers)))
        }
        _ => data.remove(HTTP_HEADERS_FIELD),
    }
    Ok(())
}

fn materialize(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<AlertingChannel, ProviderError> {
    let details = AlertingChannelDetails::WebHook {
        webhook_urls: data.get_string_list(WEBHOOK_URLS_FIELD)?,
        headers: format_headers(&data.get_string_map(HTTP_HEADERS_FIELD)?),
    };
    materialize_common(data, formatter, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_are_sent_as_key_value_strings() {
        let mut data = ResourceData::new();
        data.set("name", "hook");
        data.set(WEBHOOK_URLS_FIELD, json!(["https://a", "https://b"]));
        data.set(HTTP_HEADERS_FIELD, json!({"X-Token": "abc", "Accept": "json"}));

        let channel = materialize(&data, &ResourceNameFormatter::default()).unwrap();
        let value = serde_json::to_value(&channel).unwrap();

        assert_eq!(value["kind"], "WEB_HOOK");
        assert_eq!(value["webhookUrls"], json!(["https://a", "https://b"]));
        assert_eq!(value["headers"], json!(["Accept: json", "X-Token: abc"]));
    }

    #[test]
    fn test_no_headers_are_omitted() {
        let mut data = ResourceData::new();
        data.set("name", "hook");
        data.set(WEBHOOK_URLS_FIELD, json!(["https://a"]));

        let channel = materialize(&data, &ResourceNameFormatter::default()).unwrap();
        assert!(serde_json::to_value(&channel).unwrap().get("headers").is_none());
    }

    #[test]
    fn test_project_parses_headers() {
        let channel = AlertingChannel {
            id: "ch-9".to_string(),
            name: "hook".to_string(),
            details: AlertingChannelDetails::WebHook {
                webhook_urls: vec!["https://a".to_string()],
                headers: Some(vec![
                    "X-Token: a:b".to_string(),
                    "X-Empty".to_string(),
                ]),
            },
        };
        let mut data = ResourceData::new();

        project(&mut data, &channel).unwrap();

        assert_eq!(
            data.get(HTTP_HEADERS_FIELD),
            Some(&json!({"X-Token": "a:b", "X-Empty": ""}))
        );
    }
}
