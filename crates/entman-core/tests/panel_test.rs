#![allow(clippy::unwrap_used)]
// Integration tests for `Panel` against a mocked Home Assistant.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use entman_core::{
    BatchOutcome, BulkAction, Command, CommandResult, Confirmed, ConnectionState, CoreError,
    DomainAction, EntityFilter, EnabledCategory, Panel, PanelConfig, RecorderHealth, ViewBody,
};

// ── Helpers ─────────────────────────────────────────────────────────

const ENTITIES: &str = "/api/entity_manager/entities";
const DOMAINS: &str = "/api/entity_manager/domains";
const STATUS: &str = "/api/entity_manager/status";

fn config(server: &MockServer) -> PanelConfig {
    PanelConfig::new(
        server.uri().parse().unwrap(),
        "test-token".to_string().into(),
    )
}

fn sensors(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "entity_id": format!("sensor.s{i:02}"),
                    "name": format!("Sensor {i}"),
                    "platform": "demo",
                    "state": "12",
                    "enabled": i % 2 == 0,
                    "recorder_exclude": i == 0,
                })
            })
            .collect(),
    )
}

async fn mount_backend(server: &MockServer, entities: Value) {
    Mock::given(method("GET"))
        .and(path(STATUS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENTITIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(entities))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"domain": "sensor", "total_entities": 25, "excluded_entities": 1, "enabled_entities": 13}
        ])))
        .mount(server)
        .await;
}

async fn connected(server: &MockServer, entities: Value) -> Panel {
    mount_backend(server, entities).await;
    let panel = Panel::new(config(server));
    panel.connect().await.unwrap();
    panel
}

async fn service_bodies(server: &MockServer, service: &str) -> Vec<Value> {
    let wanted = format!("/api/services/entity_manager/{service}");
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

async fn hits(server: &MockServer, wanted: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == wanted)
        .count()
}

fn ok_service(service: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(format!("/api/services/entity_manager/{service}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
}

// ── Loading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_loads_entities_and_domains() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(3)).await;

    let state = panel.state();
    assert!(!state.loading);
    assert_eq!(state.entities.len(), 3);
    assert_eq!(state.domains.len(), 1);
    assert_eq!(state.entities[0].integration_domain.as_deref(), Some("demo"));
    assert_eq!(*panel.connection_state().borrow(), ConnectionState::Connected);
    panel.disconnect().await;
    assert_eq!(*panel.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_auto_refresh_reloads_until_disconnect() {
    let server = MockServer::start().await;
    mount_backend(&server, sensors(2)).await;
    let mut cfg = config(&server);
    cfg.options.auto_refresh = true;
    cfg.options.refresh_interval_secs = 1;
    let panel = Panel::new(cfg);
    panel.connect().await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
    let while_connected = hits(&server, ENTITIES).await;
    assert!(while_connected >= 3, "only {while_connected} loads");

    panel.disconnect().await;
    let at_disconnect = hits(&server, ENTITIES).await;
    tokio::time::sleep(std::time::Duration::from_millis(1_500)).await;
    assert_eq!(hits(&server, ENTITIES).await, at_disconnect);
}

#[tokio::test]
async fn test_missing_domains_endpoint_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENTITIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(sensors(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let panel = Panel::new(config(&server));
    panel.connect().await.unwrap();
    let state = panel.state();
    assert_eq!(state.entities.len(), 2);
    assert!(state.domains.is_empty());
    assert!(state.load_error.is_none());
}

#[tokio::test]
async fn test_load_without_session_is_a_noop() {
    let server = MockServer::start().await;
    let panel = Panel::new(config(&server));

    panel.load().await.unwrap();

    let state = panel.state();
    assert!(!state.loading);
    assert!(state.entities.is_empty());
    assert!(state.load_error.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_status_probe_shows_error_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let panel = Panel::new(config(&server));
    let err = panel.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "got {err:?}");
    assert_eq!(*panel.connection_state().borrow(), ConnectionState::Failed);
    assert!(matches!(panel.view().body, ViewBody::Error { .. }));

    // Still no session: loads stay silent.
    panel.load().await.unwrap();
    assert_eq!(hits(&server, ENTITIES).await, 0);
}

#[tokio::test]
async fn test_failed_load_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENTITIES))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db locked"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let panel = Panel::new(config(&server));
    assert!(panel.connect().await.is_err());

    let state = panel.state();
    assert!(!state.loading);
    let failure = state.load_error.unwrap();
    assert!(failure.message.contains("db locked"), "{}", failure.message);
}

// ── Bulk runs ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bulk_enable_runs_three_sequential_batches() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(25)).await;
    ok_service("bulk_update").expect(3).mount(&server).await;

    panel.select_all_visible(true);
    assert_eq!(panel.state().selection.len(), 25);

    let mut percents = Vec::new();
    let report = panel
        .run_bulk(BulkAction::Enable, None, |p| percents.push(p.percent))
        .await
        .unwrap();

    assert_eq!(percents, vec![33, 67, 100]);
    assert!(report.is_success());
    assert_eq!(report.total_ids(), 25);

    let bodies = service_bodies(&server, "bulk_update").await;
    let sizes: Vec<usize> = bodies
        .iter()
        .map(|b| b["entity_ids"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(bodies[0]["enabled"], json!(true));
    assert_eq!(bodies[0]["entity_ids"][0], json!("sensor.s00"));
    assert_eq!(bodies[2]["entity_ids"][4], json!("sensor.s24"));

    // Reloaded once after the run, selection cleared, progress gone.
    assert_eq!(hits(&server, ENTITIES).await, 2);
    let state = panel.state();
    assert!(state.selection.is_empty());
    assert!(state.progress.is_none());
}

#[tokio::test]
async fn test_failed_batch_does_not_abort_the_run() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(25)).await;

    let second: Vec<String> = (10..20).map(|i| format!("sensor.s{i:02}")).collect();
    Mock::given(method("POST"))
        .and(path("/api/services/entity_manager/bulk_update"))
        .and(body_json(json!({"entity_ids": second, "recorder_days": 30})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .with_priority(1)
        .mount(&server)
        .await;
    ok_service("bulk_update").mount(&server).await;

    panel.select_all_visible(true);
    let mut outcomes = Vec::new();
    let report = panel
        .run_bulk(BulkAction::SetRecorderDays(30), None, |p| {
            outcomes.push(p.outcome.is_ok());
        })
        .await
        .unwrap();

    assert_eq!(outcomes, vec![true, false, true]);
    assert_eq!(report.failed_ids(), second);
    assert!(matches!(report.batches[1].outcome, BatchOutcome::Failed(_)));
    assert_eq!(service_bodies(&server, "bulk_update").await.len(), 3);
    assert!(panel.state().selection.is_empty());
}

#[tokio::test]
async fn test_bulk_with_empty_selection_is_rejected_locally() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(3)).await;

    let err = panel
        .run_bulk(BulkAction::Disable, None, |_| {})
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(service_bodies(&server, "bulk_update").await.is_empty());
}

#[tokio::test]
async fn test_bulk_delete_requires_confirmation() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(3)).await;
    ok_service("bulk_delete").expect(1).mount(&server).await;

    panel.toggle("sensor.s01", true);
    panel.toggle("sensor.s02", true);

    let err = panel
        .run_bulk(BulkAction::Delete, None, |_| {})
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(service_bodies(&server, "bulk_delete").await.is_empty());
    assert_eq!(panel.state().selection.len(), 2);

    panel
        .run_bulk(BulkAction::Delete, Some(Confirmed::by_user()), |_| {})
        .await
        .unwrap();
    let bodies = service_bodies(&server, "bulk_delete").await;
    assert_eq!(bodies, vec![json!({"entity_ids": ["sensor.s01", "sensor.s02"]})]);
}

#[tokio::test]
async fn test_filter_survives_bulk_reload() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(6)).await;
    ok_service("bulk_update_recorder_exclude").mount(&server).await;

    panel.set_filter(EntityFilter {
        enabled: Some(EnabledCategory::Disabled),
        ..EntityFilter::default()
    });
    panel.select_all_visible(true);
    assert_eq!(panel.state().selected_ids(), vec!["sensor.s01", "sensor.s03", "sensor.s05"]);

    panel
        .run_bulk(BulkAction::ExcludeRecorder, None, |_| {})
        .await
        .unwrap();

    let view = panel.view();
    assert_eq!(view.filter.enabled, Some(EnabledCategory::Disabled));
    assert_eq!(view.stats.shown, 3);
    let bodies = service_bodies(&server, "bulk_update_recorder_exclude").await;
    assert_eq!(bodies[0]["recorder_exclude"], json!(true));
}

#[tokio::test]
async fn test_domain_bulk_exclude() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(2)).await;
    Mock::given(method("POST"))
        .and(path("/api/entity_manager/bulk_exclude_domains"))
        .and(body_json(json!({"domains": ["sensor"], "recorder_exclude": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "message": "1 domain excluded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(panel.toggle_domain("sensor", true));
    assert!(
        panel
            .run_domain_bulk(DomainAction::Exclude, None)
            .await
            .unwrap_err()
            .is_validation()
    );

    let result = panel
        .run_domain_bulk(DomainAction::Exclude, Some(Confirmed::by_user()))
        .await
        .unwrap();
    assert_eq!(result, CommandResult::Message("1 domain excluded".into()));
    assert!(panel.state().domain_selection.is_empty());
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_entity_command_reloads() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(2)).await;
    ok_service("update_entity_state").expect(1).mount(&server).await;

    let result = panel
        .execute(
            Command::SetEnabled {
                entity_id: "sensor.s01".into(),
                enabled: true,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Ok);
    assert_eq!(
        service_bodies(&server, "update_entity_state").await,
        vec![json!({"entity_id": "sensor.s01", "enabled": true})]
    );
    assert_eq!(hits(&server, ENTITIES).await, 2);
    panel.disconnect().await;
}

#[tokio::test]
async fn test_command_without_session_fails() {
    let server = MockServer::start().await;
    let panel = Panel::new(config(&server));

    let err = panel.execute(Command::ReloadConfig, None).await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));
}

#[tokio::test]
async fn test_purge_all_rejected_by_backend() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(2)).await;
    Mock::given(method("POST"))
        .and(path("/api/entity_manager/purge_all_entities"))
        .and(body_json(json!({"force_purge": false})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "Recorder not available"})),
        )
        .mount(&server)
        .await;

    let err = panel
        .execute(
            Command::PurgeAllExcluded { force: false },
            Some(Confirmed::by_user()),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CoreError::Rejected { message } if message == "Recorder not available"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_selection_lookups() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(3)).await;
    assert!(panel.toggle("sensor.s01", true));
    assert!(panel.toggle_domain("sensor", true));

    assert!(panel.is_selected("sensor.s01"));
    assert!(!panel.is_selected("sensor.s02"));
    assert!(panel.is_domain_selected("sensor"));
    assert_eq!(panel.selection_counts(), (1, 1));

    panel.clear_selection();
    assert_eq!(panel.selection_counts(), (0, 1));
}

// ── Report and export ───────────────────────────────────────────────

#[tokio::test]
async fn test_report_restricts_entity_list() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(5)).await;
    Mock::given(method("POST"))
        .and(path("/api/entity_manager/recorder_report"))
        .and(body_json(json!({"limit": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "entities_analyzed": 2,
            "total_records": 900,
            "report_data": [
                {"entity_id": "sensor.s03", "record_count": 600},
                {"entity_id": "sensor.s01", "record_count": 300}
            ]
        })))
        .mount(&server)
        .await;

    let report = panel.recorder_report(entman_core::REPORT_LIMIT).await.unwrap();
    assert_eq!(report.top(10).len(), 2);

    panel.filter_to_report(&report);
    let ids: Vec<String> = panel
        .state()
        .visible_ids()
        .map(str::to_owned)
        .collect();
    assert_eq!(ids, vec!["sensor.s01", "sensor.s03"]);

    let export = panel.export().unwrap();
    assert_eq!(export.count, 2);
    assert!(export.content.contains("- entity_id: sensor.s03"));
}

#[tokio::test]
async fn test_recorder_check_reports_healthy_history() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/history/period"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"entity_id": "sun.sun", "state": "above_horizon"}
        ]])))
        .mount(&server)
        .await;

    let health = panel.check_recorder().await.unwrap();
    assert_eq!(health, RecorderHealth::Healthy { rows: 1 });
}

#[tokio::test]
async fn test_recorder_check_turns_failures_into_unavailable() {
    let server = MockServer::start().await;
    let panel = connected(&server, sensors(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/history/period"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "no database"})))
        .mount(&server)
        .await;

    let health = panel.check_recorder().await.unwrap();
    match &health {
        RecorderHealth::Unavailable { reason } => assert!(reason.contains("no database"), "{reason}"),
        other => panic!("expected Unavailable, got {other:?}"),
    }
    assert!(!health.guidance().is_empty());
}

#[tokio::test]
async fn test_recorder_check_without_session_fails() {
    let server = MockServer::start().await;
    let panel = Panel::new(config(&server));
    assert!(matches!(
        panel.check_recorder().await,
        Err(CoreError::NotConnected)
    ));
}
