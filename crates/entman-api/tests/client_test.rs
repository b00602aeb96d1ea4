#![allow(clippy::unwrap_used)]
// Integration tests for `EntityManagerClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use entman_api::types::StatusResponse;
use entman_api::{EntityManagerClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EntityManagerClient) {
    let server = MockServer::start().await;
    let client = EntityManagerClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    (server, client)
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "abc123".to_string().into();
    let client =
        EntityManagerClient::from_token(&server.uri(), &token, &TransportConfig::default())
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/status"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.status().await.unwrap();
    assert_eq!(status["status"], "ok");
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/entities"))
        .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
        .mount(&server)
        .await;

    let result = client.list_entities().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Entity tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_entities() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "entity_id": "light.kitchen",
                "name": "Kitchen",
                "domain": "light",
                "platform": "hue",
                "enabled": true,
                "state": "on",
                "attributes": {"brightness": 200},
                "recorder_days": 10
            },
            {
                "entity_id": "sensor.outdoor",
                "integration_domain": "met",
                "enabled": false,
                "state": null,
                "recorder_exclude": true
            }
        ])))
        .mount(&server)
        .await;

    let entities = client.list_entities().await.unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].platform.as_deref(), Some("hue"));
    assert_eq!(entities[0].recorder_days, Some(10));
    assert_eq!(entities[1].integration_domain.as_deref(), Some("met"));
    assert!(entities[1].state.is_none());
    assert!(entities[1].recorder_exclude);
}

#[tokio::test]
async fn test_list_entities_bad_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/entities"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_entities().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_domains_missing_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/domains"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.list_domains().await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_server_error_message_is_extracted() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/entity_manager/entities"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Entity Manager not initialized"})),
        )
        .mount(&server)
        .await;

    match client.list_entities().await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Entity Manager not initialized");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Service tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_bulk_update_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/entity_manager/bulk_update"))
        .and(body_json(json!({
            "entity_ids": ["light.a", "sensor.b"],
            "recorder_days": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .bulk_update(&ids(&["light.a", "sensor.b"]), None, Some(5))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bulk_update_recorder_exclude_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/entity_manager/bulk_update_recorder_exclude"))
        .and(body_json(json!({
            "entity_ids": ["sensor.b"],
            "recorder_exclude": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .bulk_update_recorder_exclude(&ids(&["sensor.b"]), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_single_entity_services() {
    let (server, client) = setup().await;

    for (service, body) in [
        ("update_entity_state", json!({"entity_id": "light.a", "enabled": false})),
        ("update_recorder_days", json!({"entity_id": "light.a", "recorder_days": 3})),
        ("update_recorder_exclude", json!({"entity_id": "light.a", "recorder_exclude": true})),
        ("delete_entity", json!({"entity_id": "light.a"})),
        ("purge_recorder", json!({"entity_ids": ["light.a"]})),
    ] {
        Mock::given(method("POST"))
            .and(path(format!("/api/services/entity_manager/{service}")))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.update_entity_state("light.a", false).await.unwrap();
    client.update_recorder_days("light.a", 3).await.unwrap();
    client.update_recorder_exclude("light.a", true).await.unwrap();
    client.delete_entity("light.a").await.unwrap();
    client.purge_recorder(&ids(&["light.a"]), false).await.unwrap();
}

#[tokio::test]
async fn test_service_failure_surfaces_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/entity_manager/bulk_delete"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Entity not found"})))
        .mount(&server)
        .await;

    match client.bulk_delete(&ids(&["light.ghost"])).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Entity not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Recorder tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_recorder_report() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/entity_manager/recorder_report"))
        .and(body_json(json!({"limit": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "entities_analyzed": 2,
            "total_records": 1500,
            "report_data": [
                {"entity_id": "sensor.power", "record_count": 1200},
                {"entity_id": "sensor.temp", "record_count": 300}
            ],
            "download_url": "/local/entity_manager_report.json"
        })))
        .mount(&server)
        .await;

    let report = client.recorder_report(100).await.unwrap();
    assert!(report.rejection().is_none());
    assert_eq!(report.total_records, Some(1500));
    assert_eq!(report.report_data[0].entity_id, "sensor.power");
}

#[tokio::test]
async fn test_recorder_health_counts_history_rows() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/history/period"))
        .and(query_param("filter_entity_id", "sun.sun"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"entity_id": "sun.sun", "state": "above_horizon"},
            {"state": "below_horizon"}
        ]])))
        .mount(&server)
        .await;

    assert_eq!(client.recorder_health().await.unwrap(), 2);
}

#[tokio::test]
async fn test_recorder_health_rejects_non_list_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/history/period"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "oops"})))
        .mount(&server)
        .await;

    let err = client.recorder_health().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_purge_all_reports_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/entity_manager/purge_all_entities"))
        .and(body_json(json!({"force_purge": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "Recorder not available"
        })))
        .mount(&server)
        .await;

    let resp = client.purge_all_entities(false).await.unwrap();
    assert_eq!(resp.rejection().as_deref(), Some("Recorder not available"));
}

// ── Domain tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_bulk_domain_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/entity_manager/bulk_exclude_domains"))
        .and(body_json(json!({"domains": ["sun", "weather"], "recorder_exclude": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/entity_manager/bulk_update_domain_recorder_days"))
        .and(body_json(json!({"domains": ["sensor"], "domain_recorder_days": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .bulk_exclude_domains(&ids(&["sun", "weather"]), true)
        .await
        .unwrap();
    client
        .bulk_update_domain_recorder_days(&ids(&["sensor"]), 7)
        .await
        .unwrap();
}
