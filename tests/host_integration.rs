//! Integration tests for the host driver using wiremock
//!
//! These tests run apply/refresh/destroy/import against a mocked API and
//! check the state file written after each command.

use instana_provider::host::{Host, Manifest, ManifestEntry};
use instana_provider::instana::client::InstanaApi;
use instana_provider::instana::http::RetryPolicy;
use instana_provider::resource::{Provider, ProviderMeta, ResourceNameFormatter};
use instana_provider::state::{StateFile, StoredResource};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNELS: &str = "/api/events/settings/alertingChannels";

fn provider(server: &MockServer) -> Provider {
    let api = InstanaApi::new(&server.uri(), "test-token", false, RetryPolicy::none()).unwrap();
    Provider::new(ProviderMeta::new(api, ResourceNameFormatter::default())).unwrap()
}

fn email_manifest(name: &str) -> Manifest {
    Manifest {
        resources: vec![ManifestEntry {
            label: "ops".to_string(),
            resource_type: "instana_alerting_channel_email".to_string(),
            config: json!({"name": name, "emails": ["a@x"]})
                .as_object()
                .cloned()
                .unwrap(),
        }],
    }
}

fn remote_channel(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "kind": "EMAIL", "emails": ["a@x"]})
}

#[tokio::test]
async fn test_apply_creates_then_is_idempotent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    Mock::given(method("PUT"))
        .and(path_regex(r"^/api/events/settings/alertingChannels/[0-9a-f-]{36}$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-1", "ops (TF managed)")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/ch-1", CHANNELS)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-1", "ops (TF managed)")),
        )
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();

    let first = host.apply(&email_manifest("ops")).await.unwrap();
    assert_eq!(first.created, vec!["ops".to_string()]);

    let second = host.apply(&email_manifest("ops")).await.unwrap();
    assert_eq!(second.unchanged, vec!["ops".to_string()]);
    assert!(second.updated.is_empty());

    let stored = StateFile::load(&state_path).unwrap();
    let ops = stored.get("ops").unwrap();
    assert_eq!(ops.id, "ch-1");
    assert_eq!(ops.schema_version, 1);
    assert_eq!(ops.attributes["full_name"], "ops (TF managed)");
    assert_eq!(ops.attributes["name"], "ops");
}

#[tokio::test]
async fn test_apply_upgrades_legacy_state_without_diff() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut legacy = StateFile::default();
    legacy.insert(
        "ops",
        StoredResource {
            resource_type: "instana_alerting_channel_email".to_string(),
            schema_version: 0,
            id: "ch-1".to_string(),
            attributes: json!({"name": "ops (tf managed)", "emails": ["a@x"]})
                .as_object()
                .cloned()
                .unwrap(),
        },
    );
    legacy.save(&state_path).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/ch-1", CHANNELS)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-1", "ops (tf managed)")),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();
    let summary = host.apply(&email_manifest("ops")).await.unwrap();

    assert_eq!(summary.unchanged, vec!["ops".to_string()]);
    let ops = host.state().get("ops").unwrap();
    assert_eq!(ops.schema_version, 1);
    assert_eq!(ops.attributes["full_name"], "ops (tf managed)");
}

#[tokio::test]
async fn test_apply_recreates_externally_deleted_resource() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut state = StateFile::default();
    state.insert(
        "ops",
        StoredResource {
            resource_type: "instana_alerting_channel_email".to_string(),
            schema_version: 1,
            id: "ch-1".to_string(),
            attributes: json!({"name": "ops", "full_name": "ops (TF managed)", "emails": ["a@x"]})
                .as_object()
                .cloned()
                .unwrap(),
        },
    );
    state.save(&state_path).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/ch-1", CHANNELS)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/api/events/settings/alertingChannels/[0-9a-f-]{36}$"))
        .and(body_partial_json(json!({"name": "ops (TF managed)"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-2", "ops (TF managed)")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();
    let summary = host.apply(&email_manifest("ops")).await.unwrap();

    assert_eq!(summary.created, vec!["ops".to_string()]);
    assert_eq!(host.state().get("ops").unwrap().id, "ch-2");
}

#[tokio::test]
async fn test_apply_deletes_resources_missing_from_manifest() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut state = StateFile::default();
    state.insert(
        "old",
        StoredResource {
            resource_type: "instana_website_monitoring_config".to_string(),
            schema_version: 0,
            id: "w-1".to_string(),
            attributes: json!({"name": "shop", "full_name": "shop (TF managed)"})
                .as_object()
                .cloned()
                .unwrap(),
        },
    );
    state.save(&state_path).unwrap();

    Mock::given(method("DELETE"))
        .and(path("/api/website-monitoring/config/w-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();
    let summary = host.apply(&Manifest::default()).await.unwrap();

    assert_eq!(summary.deleted, vec!["old".to_string()]);
    assert!(StateFile::load(&state_path).unwrap().resources.is_empty());
}

#[tokio::test]
async fn test_import_sets_undecorated_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    Mock::given(method("GET"))
        .and(path(format!("{}/ch-7", CHANNELS)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-7", "ops (TF managed)")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/missing", CHANNELS)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();

    host.import("instana_alerting_channel_email", "ops", "ch-7")
        .await
        .unwrap();
    let ops = host.state().get("ops").unwrap();
    assert_eq!(ops.attributes["name"], "ops");
    assert_eq!(ops.attributes["full_name"], "ops (TF managed)");

    assert!(host
        .import("instana_alerting_channel_email", "other", "missing")
        .await
        .is_err());
    assert!(host.state().get("other").is_none());

    // the imported resource matches a manifest with the same name
    let summary = host.apply(&email_manifest("ops")).await.unwrap();
    assert_eq!(summary.unchanged, vec!["ops".to_string()]);
}

#[tokio::test]
async fn test_refresh_and_destroy() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut state = StateFile::default();
    for (label, id) in [("a", "ch-a"), ("b", "ch-b")] {
        state.insert(
            label,
            StoredResource {
                resource_type: "instana_alerting_channel_email".to_string(),
                schema_version: 1,
                id: id.to_string(),
                attributes: json!({"name": label, "full_name": label, "emails": ["a@x"]})
                    .as_object()
                    .cloned()
                    .unwrap(),
            },
        );
    }
    state.save(&state_path).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/ch-a", CHANNELS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_channel("ch-a", "a")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/ch-b", CHANNELS)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/ch-a", CHANNELS)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();

    let dropped = host.refresh().await.unwrap();
    assert_eq!(dropped, vec!["b".to_string()]);

    let deleted = host.destroy().await.unwrap();
    assert_eq!(deleted, vec!["a".to_string()]);
    assert!(StateFile::load(&state_path).unwrap().resources.is_empty());
}

#[tokio::test]
async fn test_recreate_after_external_delete_decorates_name_again() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut legacy = StateFile::default();
    legacy.insert(
        "ops",
        StoredResource {
            resource_type: "instana_alerting_channel_email".to_string(),
            schema_version: 0,
            id: "ch-1".to_string(),
            attributes: json!({"name": "ops (tf managed)", "emails": ["a@x"]})
                .as_object()
                .cloned()
                .unwrap(),
        },
    );
    legacy.save(&state_path).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/ch-1", CHANNELS)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/api/events/settings/alertingChannels/[0-9a-f-]{36}$"))
        .and(body_partial_json(json!({"name": "ops (TF managed)"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(remote_channel("ch-2", "ops (TF managed)")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut host = Host::open(&provider, &state_path).unwrap();
    let summary = host.apply(&email_manifest("ops")).await.unwrap();

    assert_eq!(summary.created, vec!["ops".to_string()]);
    let ops = host.state().get("ops").unwrap();
    assert_eq!(ops.id, "ch-2");
    assert_eq!(ops.attributes["full_name"], "ops (TF managed)");
}
