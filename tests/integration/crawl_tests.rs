//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch-test-report cycle end-to-end.

use anyhow::ensure;
use crawl_probe::checks::build_context;
use crawl_probe::config::{parse_config, TransportConfig};
use crawl_probe::crawler::{crawl, CrawlEntry, Subject};
use crawl_probe::output::{report_crawl, JUnitReporter, JsonReporter, Reporter};
use crawl_probe::testing::{TestContext, TestResult};
use crawl_probe::transport::HttpTransport;
use crawl_probe::unit::ResourceDescriptor;
use crawl_probe::ProbeError;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Arc<HttpTransport> {
    let config = TransportConfig {
        timeout_ms: Some(5000),
        ..TransportConfig::default()
    };
    Arc::new(HttpTransport::new(&config).expect("Failed to build transport"))
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn check_200() -> TestContext {
    TestContext::builder()
        .each("check-200", |unit| {
            ensure!(
                unit.response.status_code() == Some(200),
                "expected status 200, got {:?}",
                unit.response.status_code()
            );
            Ok(())
        })
        .build()
}

#[tokio::test]
async fn test_status_check_against_live_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_status(&mock_server, "/", 200).await;
    mount_status(&mock_server, "/missing", 404).await;

    let resources = vec![
        ResourceDescriptor::new(format!("{}/", base_url)),
        ResourceDescriptor::new(format!("{}/missing", base_url)),
    ];

    let stream = crawl(Arc::new(check_200()), transport(), resources, 2).expect("Setup failed");
    let entries: Vec<CrawlEntry> = stream.collect().await;

    assert_eq!(entries.len(), 2);
    for entry in &entries {
        let result = entry.results.get("check-200").expect("Missing result");
        if entry.subject.url().unwrap().ends_with("/missing") {
            assert_eq!(result, &TestResult::fail("expected status 200, got Some(404)"));
        } else {
            assert_eq!(result, &TestResult::Pass);
        }
    }
}

#[tokio::test]
async fn test_connection_failure_still_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_status(&mock_server, "/a", 200).await;
    mount_status(&mock_server, "/b", 200).await;

    // Bind then drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed = format!("http://127.0.0.1:{}/", listener.local_addr().unwrap().port());
    drop(listener);

    let context = TestContext::builder()
        .each("reachable", |unit| {
            ensure!(!unit.response.is_failed(), "fetch failed");
            Ok(())
        })
        .build();

    let resources = vec![
        ResourceDescriptor::new(format!("{}/a", base_url)),
        ResourceDescriptor::new(closed.clone()),
        ResourceDescriptor::new(format!("{}/b", base_url)),
    ];

    let stream = crawl(Arc::new(context), transport(), resources, 3).expect("Setup failed");
    let entries: Vec<CrawlEntry> = stream.collect().await;

    assert_eq!(entries.len(), 3);
    let failed: Vec<_> = entries.iter().filter(|e| e.has_failure()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].subject, Subject::Resource(closed));
}

#[tokio::test]
async fn test_concurrency_limit_with_slow_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
        .mount(&mock_server)
        .await;

    let resources: Vec<_> = (0..6)
        .map(|i| ResourceDescriptor::new(format!("{}/page{}", base_url, i)))
        .collect();

    let stream = crawl(Arc::new(TestContext::default()), transport(), resources, 1)
        .expect("Setup failed");
    let subjects: Vec<_> = stream.map(|e| e.subject).collect().await;

    let expected: Vec<_> = (0..6)
        .map(|i| Subject::Resource(format!("{}/page{}", base_url, i)))
        .collect();
    assert_eq!(subjects, expected);

    assert_eq!(mock_server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_groups_and_cross_unit_checks() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_status(&mock_server, "/", 200).await;
    mount_status(&mock_server, "/docs/a", 200).await;
    mount_status(&mock_server, "/docs/b", 500).await;

    let docs_seen = Arc::new(AtomicUsize::new(0));
    let counter = docs_seen.clone();

    let context = TestContext::builder()
        .each_in_group("docs respond 200", "docs", |unit| {
            ensure!(unit.response.status_code() == Some(200), "docs page failed");
            Ok(())
        })
        .all_in_group("two docs pages", "docs", move |units| {
            counter.store(units.len(), Ordering::SeqCst);
            Ok(())
        })
        .all_in_group("no blog pages", "blog", |_| Ok(()))
        .build();

    let resources = vec![
        ResourceDescriptor::new(format!("{}/", base_url)).with_group("home"),
        ResourceDescriptor::new(format!("{}/docs/a", base_url)).with_group("docs"),
        ResourceDescriptor::new(format!("{}/docs/b", base_url)).with_group("docs"),
    ];

    let stream = crawl(Arc::new(context), transport(), resources, 2).expect("Setup failed");
    let entries: Vec<CrawlEntry> = stream.collect().await;

    assert_eq!(entries.len(), 4);

    let home = entries
        .iter()
        .find(|e| e.subject == Subject::Resource(format!("{}/", base_url)))
        .expect("Missing home entry");
    assert!(home.results.is_empty());

    let last = entries.last().unwrap();
    assert_eq!(last.subject, Subject::AllUnits);
    assert_eq!(last.results.get("two docs pages"), Some(&TestResult::Pass));
    assert!(last.results.get("no blog pages").is_none());
    assert_eq!(docs_seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_full_run_from_crawl_file_writes_reports() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_status(&mock_server, "/", 200).await;
    mount_status(&mock_server, "/gone", 410).await;

    let config = parse_config(&format!(
        r#"
[crawler]
concurrency = 2

[transport]
timeout-ms = 5000

[[resource]]
url = "{base}/"

[[resource]]
url = "{base}/gone"

[[check]]
description = "responds 200"
scope = "each"
expect-status = 200

[[check]]
description = "is reachable"
scope = "each"
reachable = true
"#,
        base = base_url
    ))
    .expect("Failed to parse crawl file");

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("report.json");
    let junit_path = dir.path().join("report.xml");

    let context = Arc::new(build_context(&config.checks));
    let transport = Arc::new(HttpTransport::new(&config.transport).unwrap());
    let stream = crawl(context, transport, config.resources, config.crawler.concurrency)
        .expect("Setup failed");

    let mut reporters: Vec<Box<dyn Reporter>> = vec![
        Box::new(JsonReporter::new(&json_path)),
        Box::new(JUnitReporter::new(&junit_path)),
    ];

    let result = report_crawl(stream, &mut reporters).await;
    assert!(matches!(result, Err(ProbeError::FailedAnalysis(_))));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let gone = &json["results"][format!("{}/gone", base_url)];
    assert_eq!(gone["responds 200"]["status"], "fail");
    assert_eq!(gone["responds 200"]["message"], "expected status 200, got 410");
    assert_eq!(gone["is reachable"]["status"], "pass");
    assert_eq!(json["summary"]["failed"], 1);

    let xml = std::fs::read_to_string(&junit_path).unwrap();
    assert!(xml.contains("tests=\"4\" failures=\"1\""));
}

#[tokio::test]
async fn test_passing_run_has_no_analysis_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let resources: Vec<_> = (0..5)
        .map(|i| ResourceDescriptor::new(format!("{}/{}", base_url, i)))
        .collect();

    let stream = crawl(Arc::new(check_200()), transport(), resources, 2).expect("Setup failed");
    let summary = report_crawl(stream, &mut []).await.expect("Expected success");

    assert_eq!(summary.units, 5);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_setup_failure_propagates_without_fetching() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/", 200).await;

    let resources = vec![
        ResourceDescriptor::new(format!("{}/", mock_server.uri())),
        ResourceDescriptor::new("::not a url::"),
    ];

    let result = crawl(Arc::new(check_200()), transport(), resources, 2);
    assert!(matches!(result, Err(ProbeError::Setup(_))));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
