// tests/executor_test.rs
use std::time::Duration;
use sif_rs::common::utils::DEFAULT_USER_AGENT;
use sif_rs::modules::definition::DeclarativeModule;
use sif_rs::modules::matcher::MAX_EVIDENCE_LEN;
use sif_rs::modules::{Module, ModuleDefinition, Options};
use sif_rs::ScanContext;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn module(yaml: &str) -> DeclarativeModule {
    DeclarativeModule::new(ModuleDefinition::parse(yaml).unwrap(), None)
}

fn opts() -> Options {
    Options {
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

const ADMIN: &str = r#"
id: admin-check
info:
  name: Admin check
  severity: low
type: http
http:
  paths: ["/admin"]
  matchers:
    - type: status
      status: [200]
"#;

#[tokio::test]
async fn test_admin_scenario_single_finding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Admin</title>"))
        .mount(&server)
        .await;

    let target = format!("{}/", server.uri());
    let result = module(ADMIN).execute(&ScanContext::new(), &target, &opts()).await.unwrap();

    assert_eq!(result.module_id, "admin-check");
    assert_eq!(result.findings.len(), 1);
    assert!(result.findings[0].url.ends_with("/admin"));
    assert_eq!(result.findings[0].severity, "low");
    assert_eq!(result.findings[0].evidence, "<title>Admin</title>");
}

#[tokio::test]
async fn test_literal_path_resolves_against_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = module(ADMIN).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].url, format!("{}/admin", server.uri()));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/admin");
}

#[tokio::test]
async fn test_missing_path_gives_empty_result() {
    let server = MockServer::start().await;

    let result = module(ADMIN).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();
    assert!(result.findings.is_empty());
}

#[tokio::test]
async fn test_unreachable_target_is_not_an_error() {
    let result = module(ADMIN)
        .execute(&ScanContext::new(), "http://127.0.0.1:1", &opts())
        .await
        .unwrap();
    assert!(result.findings.is_empty());
}

#[tokio::test]
async fn test_cancelled_context_dispatches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let ctx = ScanContext::new();
    ctx.cancel();
    let result = module(ADMIN).execute(&ctx, &server.uri(), &opts()).await.unwrap();

    assert!(result.findings.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_payload_expansion_hits_matching_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("result found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing"))
        .mount(&server)
        .await;

    let yaml = r#"
id: search-check
type: http
http:
  paths: ["{{BaseURL}}/search?q={{payload}}"]
  payloads: [a, b, c]
  threads: 2
  matchers:
    - type: word
      part: body
      words: ["found"]
"#;
    let result = module(yaml).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(result.findings.len(), 1);
    assert!(result.findings[0].url.ends_with("q=b"));
    assert_eq!(result.findings[0].severity, "info");
}

#[tokio::test]
async fn test_negative_matcher_hits_on_absence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("xyz"))
        .mount(&server)
        .await;

    let yaml = r#"
id: negated
type: http
http:
  paths: ["{{BaseURL}}/"]
  matchers:
    - type: word
      words: ["a"]
      part: body
      negative: true
"#;
    let result = module(yaml).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();
    assert_eq!(result.findings.len(), 1);
}

#[tokio::test]
async fn test_long_evidence_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string("z".repeat(800)))
        .mount(&server)
        .await;

    let yaml = r#"
id: big
type: http
http:
  paths: ["{{BaseURL}}/big"]
  matchers:
    - type: status
      status: [200]
"#;
    let result = module(yaml).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();
    let evidence = &result.findings[0].evidence;

    assert_eq!(evidence.len(), MAX_EVIDENCE_LEN + 3);
    assert!(evidence.ends_with("..."));
    assert_eq!(&evidence[..MAX_EVIDENCE_LEN], "z".repeat(MAX_EVIDENCE_LEN));
}

#[tokio::test]
async fn test_extractors_and_default_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-powered-by", "Acme/2.1")
                .set_body_string("build: none\nrelease=4.2.0"),
        )
        .mount(&server)
        .await;

    let yaml = r#"
id: version-check
type: http
http:
  paths: ["{{BaseURL}}/version"]
  matchers:
    - type: status
      status: [200]
    - type: regex
      part: header
      regex: ['X-Powered-By: Acme']
  extractors:
    - type: regex
      name: release
      part: body
      regex: ['version=(\d+)', 'release=([\d.]+)']
    - type: regex
      name: engine
      part: header
      regex: ['Acme/([\d.]+)']
"#;
    let result = module(yaml).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();

    assert_eq!(result.findings.len(), 1);
    let extracted = &result.findings[0].extracted;
    assert_eq!(extracted.get("release").map(String::as_str), Some("4.2.0"));
    assert_eq!(extracted.get("engine").map(String::as_str), Some("2.1"));
}

#[tokio::test]
async fn test_configured_headers_and_body_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("user-agent", "custom-agent"))
        .and(header("x-check", "p1"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let yaml = r#"
id: post-check
type: http
http:
  method: post
  paths: ["{{BaseURL}}/login"]
  payloads: [p1]
  headers:
    User-Agent: custom-agent
    X-Check: "{{payload}}"
  body: "user=admin&pass={{payload}}"
  matchers:
    - type: status
      status: [302]
"#;
    let result = module(yaml).execute(&ScanContext::new(), &server.uri(), &opts()).await.unwrap();
    assert_eq!(result.findings.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(String::from_utf8_lossy(&requests[0].body), "user=admin&pass=p1");
}

#[tokio::test]
async fn test_target_log_is_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut options = opts();
    options.log_dir = Some(dir.path().to_path_buf());
    module(ADMIN).execute(&ScanContext::new(), &server.uri(), &options).await.unwrap();

    let logs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(logs.len(), 1);
    let content = std::fs::read_to_string(logs[0].as_ref().unwrap().path()).unwrap();
    assert!(content.contains("Module admin-check: 1 findings"));
}
