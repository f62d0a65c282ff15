//! Dashboard client tests against a mock backend

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tissue_client::{ClientConfig, ClientError, ConfigError, DashboardClient};
use tissue_metrics::{KpiCatalog, KpiGroup};
use tissue_session::{NavigationTarget, SessionStatus};
use tissue_test_utils::{
    sample_metrics, session_config, FakeProvider, SAMPLE_KPI_YAML, TEST_TOKEN,
};

fn dashboard(server: &MockServer, provider: &Arc<FakeProvider>) -> DashboardClient {
    let config = ClientConfig::new(server.base_url()).with_session(session_config());
    DashboardClient::new(config, provider.clone()).unwrap()
}

fn groups() -> Vec<KpiGroup> {
    KpiCatalog::from_yaml_str(SAMPLE_KPI_YAML)
        .unwrap()
        .groups()
        .to_vec()
}

#[tokio::test]
async fn test_load_kpis_fetches_enriches_and_binds() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/metrics")
                .header("authorization", format!("Bearer {TEST_TOKEN}"));
            then.status(200).json_body(sample_metrics());
        })
        .await;

    let provider = Arc::new(FakeProvider::signed_in());
    let client = dashboard(&server, &provider);
    let groups = groups();

    let bound = client.load_kpis(&groups).await.unwrap();

    mock.assert_async().await;
    assert_eq!(bound.len(), 3);
    assert_eq!(bound[0].metrics[0].name, "Daylight Potential");
    assert_eq!(bound[0].metrics[0].value, Some(0.31));
    assert_eq!(bound[1].metrics[1].slug, "envelope_efficiency");
    assert_eq!(bound[1].metrics[1].value, None);
    assert_eq!(groups, self::groups());
    assert_eq!(client.session().status(), SessionStatus::Ready);
}

#[tokio::test]
async fn test_load_kpis_for_version_surfaces_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/metrics/v1");
            then.status(404).json_body(json!({"detail": "Version not found"}));
        })
        .await;

    let provider = Arc::new(FakeProvider::signed_in());
    let client = dashboard(&server, &provider);

    let err = client
        .load_kpis_for_version(&groups(), "v1")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "metrics not found for version v1");
}

#[tokio::test]
async fn test_versions_lists_history() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/metrics/history");
            then.status(200)
                .json_body(json!([{"version_id": "a1"}, {"version_id": "b2"}]));
        })
        .await;

    let provider = Arc::new(FakeProvider::signed_in());
    let versions = dashboard(&server, &provider).versions().await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].version_id, "b2");
}

#[tokio::test]
async fn test_guard_and_sign_out_share_the_session() {
    let server = MockServer::start_async().await;
    let provider = Arc::new(FakeProvider::signed_in());
    let client = dashboard(&server, &provider);

    let decision = client
        .guard()
        .check(&NavigationTarget::protected("/workspace"))
        .await;
    assert!(decision.is_proceed());
    assert!(client.session().is_signed_in());

    let next = client.sign_out().await.unwrap();
    assert_eq!(next, "/sign-in");
    assert_eq!(provider.sign_out_calls(), 1);
    assert_eq!(client.session().status(), SessionStatus::Uninitialized);

    let decision = client
        .guard()
        .check(&NavigationTarget::protected("/workspace"))
        .await;
    assert!(!decision.is_proceed());
}

#[test]
fn test_invalid_api_url_is_rejected() {
    let provider = Arc::new(FakeProvider::signed_in());

    let err = DashboardClient::new(ClientConfig::default(), provider.clone()).unwrap_err();
    assert!(matches!(err, ClientError::Config(ConfigError::Missing(_))));

    let err = DashboardClient::new(ClientConfig::new("::not a url::"), provider).unwrap_err();
    assert!(matches!(err, ClientError::Metrics(_)));
}

#[test]
fn test_config_file_round_trip_builds_client() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
api_url = "http://127.0.0.1:8000"
request_timeout_ms = 1500

[session]
publishable_key = "pk_test_file"

[redirects]
after_sign_out_url = "/goodbye"
"#
    )
    .unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.session.publishable_key(), Some("pk_test_file"));
    assert_eq!(config.redirects.after_sign_out_url, "/goodbye");

    let client = DashboardClient::new(config, Arc::new(FakeProvider::signed_out())).unwrap();
    assert_eq!(client.metrics().base_url().as_str(), "http://127.0.0.1:8000/");
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
