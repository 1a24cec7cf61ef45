// tests/fingerprint_test.rs
use std::time::Duration;
use sif_rs::modules::builtin::{FrameworksModule, FRAMEWORK_MODULE_ID};
use sif_rs::modules::{Module, Options};
use sif_rs::webscan::fingerprint::{detect_framework, RiskLevel};
use sif_rs::{Error, ScanContext};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const WORDPRESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta name="generator" content="WordPress 6.1.1" />
  <link rel="stylesheet" href="/wp-content/themes/twenty/style.css" />
  <script src="/wp-includes/js/wp-emoji-release.min.js"></script>
  <link rel="https://api.w.org/" href="/wp-json/" />
</head>
<body>Just another wordpress site</body>
</html>"#;

async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_detects_wordpress_with_cve() {
    let server = serve(WORDPRESS_PAGE).await;

    let result = detect_framework(&server.uri(), Duration::from_secs(5), None)
        .await
        .unwrap()
        .expect("wordpress detected");

    assert_eq!(result.name, "WordPress");
    assert_eq!(result.version, "6.1.1");
    assert_eq!(result.version_confidence, 0.95);
    assert!(result.confidence > 0.5 && result.confidence <= 1.0);
    assert_eq!(result.cves, vec!["CVE-2023-2745 (medium)"]);
    assert_eq!(result.suggestions, vec!["Update to WordPress 6.2 or later"]);
    assert_eq!(result.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn test_laravel_cookie_detection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "laravel_session=eyJpdiI6; path=/; httponly")
                .set_body_string(r#"<meta name="csrf-token" content="abc"><footer>Laravel v8.0.0</footer>"#),
        )
        .mount(&server)
        .await;

    let result = detect_framework(&server.uri(), Duration::from_secs(5), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.name, "Laravel");
    assert_eq!(result.version, "8.0.0");
    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert_eq!(result.cves.len(), 2);
}

#[tokio::test]
async fn test_no_detection_on_plain_page() {
    let server = serve("<html><body>plain</body></html>").await;

    let result = detect_framework(&server.uri(), Duration::from_secs(5), None).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_fetch_failure_is_an_error() {
    let err = detect_framework("http://127.0.0.1:1", Duration::from_secs(2), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_detection_is_logged_per_target() {
    let server = serve(WORDPRESS_PAGE).await;
    let dir = tempfile::tempdir().unwrap();

    detect_framework(&server.uri(), Duration::from_secs(5), Some(dir.path()))
        .await
        .unwrap();

    let logs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(logs.len(), 1);
    let content = std::fs::read_to_string(logs[0].as_ref().unwrap().path()).unwrap();
    assert!(content.contains("Framework: WordPress (version: 6.1.1"));
    assert!(content.contains("CVE-2023-2745 (medium)"));
}

#[tokio::test]
async fn test_frameworks_module_maps_to_finding() {
    let server = serve(WORDPRESS_PAGE).await;
    let module = FrameworksModule::new();
    let opts = Options {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };

    let result = module.execute(&ScanContext::new(), &server.uri(), &opts).await.unwrap();

    assert_eq!(result.module_id, FRAMEWORK_MODULE_ID);
    assert_eq!(result.findings.len(), 1);
    let finding = &result.findings[0];
    assert_eq!(finding.severity, "medium");
    assert!(finding.evidence.starts_with("Detected WordPress framework (version: 6.1.1, confidence: "));
    assert_eq!(finding.extracted["framework"], "WordPress");
    assert_eq!(finding.extracted["version"], "6.1.1");
    assert_eq!(finding.extracted["version_confidence"], "0.95");
    assert_eq!(finding.extracted["cves"], "CVE-2023-2745 (medium)");
    assert_eq!(finding.extracted["risk_level"], "medium");
}

#[tokio::test]
async fn test_frameworks_module_propagates_fetch_failure() {
    let module = FrameworksModule::new();
    let opts = Options {
        timeout: Duration::from_secs(2),
        ..Default::default()
    };
    assert!(module.execute(&ScanContext::new(), "http://127.0.0.1:1", &opts).await.is_err());
}
