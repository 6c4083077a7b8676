//! Integration tests for the lifecycle driver against a mocked Instana API
//!
//! These tests drive create/read/update/delete/import through the provider
//! registry and check the requests sent and the state written back.

use instana_provider::instana::client::InstanaApi;
use instana_provider::instana::error::RestError;
use instana_provider::instana::http::RetryPolicy;
use instana_provider::resource::{
    Provider, ProviderError, ProviderMeta, RawState, ResourceData, ResourceNameFormatter,
};
use instana_provider::resources::alerting_channel_email;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNELS: &str = "/api/events/settings/alertingChannels";
const EMAIL: &str = "instana_alerting_channel_email";

fn provider_with(server: &MockServer, retry: RetryPolicy) -> Provider {
    let api = InstanaApi::new(&server.uri(), "test-token", false, retry).unwrap();
    Provider::new(ProviderMeta::new(api, ResourceNameFormatter::default())).unwrap()
}

fn provider(server: &MockServer) -> Provider {
    provider_with(server, RetryPolicy::none())
}

fn raw(value: Value) -> RawState {
    value.as_object().cloned().unwrap()
}

fn alpha_config() -> RawState {
    raw(json!({"name": "alpha", "emails": ["a@x", "b@x"]}))
}

/// State after a successful create of the `alpha` channel
fn alpha_state() -> ResourceData {
    ResourceData::from_state(
        "ch-1",
        raw(json!({
            "name": "alpha",
            "full_name": "alpha (TF managed)",
            "emails": ["a@x", "b@x"]
        })),
    )
}

/// Test module for the end-to-end lifecycle scenarios
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_email_channel() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/api/events/settings/alertingChannels/[0-9a-f-]{36}$"))
            .and(header("Authorization", "apiToken test-token"))
            .and(body_partial_json(json!({
                "name": "alpha (TF managed)",
                "kind": "EMAIL",
                "emails": ["a@x", "b@x"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch-1",
                "name": "alpha (TF managed)",
                "kind": "EMAIL",
                "emails": ["a@x", "b@x"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();
        let mut data = ResourceData::new();

        resource.plan(&mut data, &alpha_config()).unwrap();
        resource.create(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "ch-1");
        assert_eq!(data.get_string("full_name").unwrap(), "alpha (TF managed)");
        assert_eq!(data.get_string_list("emails").unwrap(), vec!["a@x", "b@x"]);
    }

    #[tokio::test]
    async fn test_no_op_reapply_does_not_decorate_twice() {
        let server = MockServer::start().await;
        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();

        let mut data = alpha_state();
        resource.plan(&mut data, &alpha_config()).unwrap();
        assert!(data.changed_fields().is_empty());

        let handle = alerting_channel_email::handle().unwrap();
        let channel = handle
            .materialize(&data, &provider.meta().formatter)
            .unwrap();
        assert_eq!(channel.name, "alpha (TF managed)");
        assert_eq!(channel.id, "ch-1");
    }

    #[tokio::test]
    async fn test_rename_keeps_id() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .and(body_partial_json(json!({"id": "ch-1", "name": "beta (TF managed)"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch-1",
                "name": "beta (TF managed)",
                "kind": "EMAIL",
                "emails": ["a@x", "b@x"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();
        let mut data = alpha_state();

        resource
            .plan(&mut data, &raw(json!({"name": "beta", "emails": ["a@x", "b@x"]})))
            .unwrap();
        assert_eq!(data.changed_fields(), vec!["name".to_string()]);
        resource.update(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "ch-1");
        assert_eq!(data.get_string("full_name").unwrap(), "beta (TF managed)");
    }

    #[tokio::test]
    async fn test_read_after_external_delete_clears_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let mut data = alpha_state();
        provider
            .resource(EMAIL)
            .unwrap()
            .read(provider.meta(), &mut data)
            .await
            .unwrap();

        assert_eq!(data.id(), "");
        assert!(!data.is_persisted());
    }

    #[tokio::test]
    async fn test_opsgenie_tags_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/api/events/settings/alertingChannels/[0-9a-f-]{36}$"))
            .and(body_partial_json(json!({
                "kind": "OPS_GENIE",
                "apiKey": "key",
                "region": "EU",
                "tags": "tag1,tag2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "og-1",
                "name": "pager (TF managed)",
                "kind": "OPS_GENIE",
                "apiKey": "key",
                "region": "EU",
                "tags": "tag1, tag2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider
            .resource("instana_alerting_channel_opsgenie")
            .unwrap();
        let mut data = ResourceData::new();

        resource
            .plan(
                &mut data,
                &raw(json!({
                    "name": "pager",
                    "api_key": "key",
                    "region": "EU",
                    "tags": ["tag1", "tag2"]
                })),
            )
            .unwrap();
        resource.create(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "og-1");
        assert_eq!(data.get_string_list("tags").unwrap(), vec!["tag1", "tag2"]);
    }

    #[tokio::test]
    async fn test_alerting_config_conflict_makes_no_request() {
        let server = MockServer::start().await;
        let provider = provider(&server);
        let resource = provider.resource("instana_alerting_config").unwrap();
        let mut data = ResourceData::new();

        let err = resource
            .plan(
                &mut data,
                &raw(json!({
                    "name": "alert",
                    "event_filter_event_types": ["X"],
                    "event_filter_rule_ids": ["r1"]
                })),
            )
            .unwrap_err();

        match err {
            ProviderError::InvalidConfig { diagnostics, .. } => {
                assert!(diagnostics.iter().any(|d| d.contains("conflicts with")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_object() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let mut data = alpha_state();
        provider
            .resource(EMAIL)
            .unwrap()
            .delete(provider.meta(), &mut data)
            .await
            .unwrap();

        assert_eq!(data.id(), "");
    }

    #[tokio::test]
    async fn test_import_reads_remote_object() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ch-9", CHANNELS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch-9",
                "name": "ops (TF managed)",
                "kind": "EMAIL",
                "emails": ["ops@x"]
            })))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let mut data = ResourceData::new();
        provider
            .resource(EMAIL)
            .unwrap()
            .import(provider.meta(), &mut data, "ch-9")
            .await
            .unwrap();

        assert_eq!(data.id(), "ch-9");
        assert_eq!(data.get_string("full_name").unwrap(), "ops (TF managed)");
        assert_eq!(data.get_string_list("emails").unwrap(), vec!["ops@x"]);
    }

    #[tokio::test]
    async fn test_read_of_other_channel_kind_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch-1",
                "name": "alpha (TF managed)",
                "kind": "SPLUNK",
                "url": "https://splunk",
                "token": "t"
            })))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let mut data = alpha_state();
        let err = provider
            .resource(EMAIL)
            .unwrap()
            .read(provider.meta(), &mut data)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::KindMismatch { .. }));
        assert_eq!(data.id(), "ch-1");
    }

    #[tokio::test]
    async fn test_sli_config_is_created_with_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/settings/v1/slis"))
            .and(body_partial_json(json!({
                "sliName": "latency (TF managed)",
                "metricConfiguration": {"aggregation": "P90", "threshold": 12.5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sli-1",
                "sliName": "latency (TF managed)",
                "initialEvaluationTimestamp": 0,
                "metricConfiguration": {"metricName": "latency", "aggregation": "P90", "threshold": 12.5},
                "sliEntity": {"sliType": "application", "applicationId": "app-1", "boundaryScope": "ALL"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider.resource("instana_sli_config").unwrap();
        let mut data = ResourceData::new();

        resource
            .plan(
                &mut data,
                &raw(json!({
                    "name": "latency",
                    "metric_configuration": [{"metric_name": "latency", "aggregation": "P90", "threshold": 12.5}],
                    "sli_entity": [{"type": "application", "application_id": "app-1", "boundary_scope": "ALL"}]
                })),
            )
            .unwrap();
        resource.create(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "sli-1");
        assert_eq!(
            data.get("metric_configuration").unwrap()[0]["threshold"],
            json!(12.5)
        );
    }

    #[tokio::test]
    async fn test_website_monitoring_name_travels_as_query_parameter() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/website-monitoring/config"))
            .and(query_param("name", "shop (TF managed)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "w-1",
                "name": "shop (TF managed)",
                "appName": "shop"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider
            .resource("instana_website_monitoring_config")
            .unwrap();
        let mut data = ResourceData::new();

        resource.plan(&mut data, &raw(json!({"name": "shop"}))).unwrap();
        resource.create(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "w-1");
        assert_eq!(data.get_string("app_name").unwrap(), "shop");
    }
}

/// Test module for status mapping and retries
mod http_client_tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_error_keeps_body_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/api/events/settings/alertingChannels/.+$"))
            .respond_with(ResponseTemplate::new(422).set_body_string("emails: invalid address"))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();
        let mut data = ResourceData::new();
        resource.plan(&mut data, &alpha_config()).unwrap();

        let err = resource.create(provider.meta(), &mut data).await.unwrap_err();
        match err {
            ProviderError::Rest(RestError::Validation { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "emails: invalid address");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(data.id(), "");
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let mut data = alpha_state();
        let err = provider
            .resource(EMAIL)
            .unwrap()
            .read(provider.meta(), &mut data)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rest(RestError::Transport(_))));
        assert_eq!(data.id(), "ch-1");
    }

    #[tokio::test]
    async fn test_get_is_retried_on_service_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch-1",
                "name": "alpha (TF managed)",
                "kind": "EMAIL",
                "emails": ["a@x", "b@x"]
            })))
            .mount(&server)
            .await;

        let provider = provider_with(
            &server,
            RetryPolicy {
                max_retries: 2,
                backoff: Duration::from_millis(1),
            },
        );
        let mut data = alpha_state();
        provider
            .resource(EMAIL)
            .unwrap()
            .read(provider.meta(), &mut data)
            .await
            .unwrap();

        assert_eq!(data.id(), "ch-1");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_post_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/website-monitoring/config"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_with(
            &server,
            RetryPolicy {
                max_retries: 3,
                backoff: Duration::from_millis(1),
            },
        );
        let resource = provider
            .resource("instana_website_monitoring_config")
            .unwrap();
        let mut data = ResourceData::new();
        resource.plan(&mut data, &raw(json!({"name": "shop"}))).unwrap();

        let err = resource.create(provider.meta(), &mut data).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rest(RestError::Transport(_))));
    }

    #[tokio::test]
    async fn test_empty_update_response_keeps_sent_object() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/ch-1", CHANNELS)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();
        let mut data = alpha_state();
        resource
            .plan(&mut data, &raw(json!({"name": "alpha", "emails": ["c@x"]})))
            .unwrap();
        resource.update(provider.meta(), &mut data).await.unwrap();

        assert_eq!(data.id(), "ch-1");
        assert_eq!(data.get_string_list("emails").unwrap(), vec!["c@x"]);
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected() {
        let server = MockServer::start().await;
        let provider = provider(&server);
        let resource = provider.resource(EMAIL).unwrap();
        let mut data = ResourceData::new();
        resource.plan(&mut data, &alpha_config()).unwrap();

        let err = resource.update(provider.meta(), &mut data).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingId { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
