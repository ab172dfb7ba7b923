use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dnswatch_core::{DnsResolver, Error, MonitorConfig, Resolution, Result, SessionRegistry};
use dnswatchd::api::{DomainsResponse, ErrorResponse, LogsResponse, StartMonitorResponse};
use dnswatchd::{AppState, create_routes};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Resolves every domain to 1.2.3.4, except `nxdomain.example.com`
struct FixedResolver;

#[async_trait]
impl DnsResolver for FixedResolver {
    async fn resolve(&self, domain: &str, _: &str, _: &str) -> Result<Resolution> {
        if domain == "nxdomain.example.com" {
            Err(Error::resolver("NXDOMAIN"))
        } else {
            Ok(Resolution::new(["1.2.3.4"], 300))
        }
    }

    fn resolver_name(&self) -> &'static str {
        "fixed"
    }
}

fn app() -> (Router, Arc<SessionRegistry>) {
    let registry =
        Arc::new(SessionRegistry::new(Arc::new(FixedResolver), MonitorConfig::default()).unwrap());
    (create_routes(AppState::new(registry.clone())), registry)
}

fn start_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/start_monitor")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn start_json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/start_monitor")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send<T: DeserializeOwned>(app: &Router, request: Request<Body>) -> (StatusCode, T) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn wait_for_log(registry: &SessionRegistry, domain: &str, len: usize) {
    for _ in 0..200 {
        if registry.get_log(domain).await.is_some_and(|log| log.len() >= len) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("log of {} never reached {} records", domain, len);
}

#[tokio::test]
async fn test_start_then_already_running() {
    let (app, _) = app();

    let (status, body): (_, StartMonitorResponse) = send(
        &app,
        start_request("domain=example.com&record_type=A&dns_resolver=8.8.8.8"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "started");
    assert_eq!(
        body.message,
        "Started monitoring example.com (A record) using 8.8.8.8"
    );
    assert!(body.hide_button);

    let (status, body): (_, StartMonitorResponse) =
        send(&app, start_request("domain=example.com&record_type=A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "already_running");
    assert_eq!(body.message, "Monitoring already in progress for this domain.");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (app, registry) = app();

    let (status, body): (_, ErrorResponse) =
        send(&app, start_request("domain=example.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Missing required fields");

    let (status, _): (_, ErrorResponse) =
        send(&app, start_request("domain=&record_type=A")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_start_with_json_body() {
    let (app, registry) = app();

    let (status, body): (_, StartMonitorResponse) = send(
        &app,
        start_json_request(r#"{"domain":"example.com","record_type":"A","dns_resolver":"1.1.1.1"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "started");
    assert_eq!(
        body.message,
        "Started monitoring example.com (A record) using 1.1.1.1"
    );

    let (status, body): (_, ErrorResponse) =
        send(&app, start_json_request(r#"{"domain":"other.example.com"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Missing required fields");

    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn test_unreadable_body_rejected() {
    let (app, registry) = app();

    let empty = Request::builder()
        .method("POST")
        .uri("/start_monitor")
        .body(Body::empty())
        .unwrap();
    let (status, body): (_, ErrorResponse) = send(&app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Missing required fields");

    let (status, body): (_, ErrorResponse) = send(&app, start_json_request("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Missing required fields");

    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_invalid_input_rejected() {
    let (app, registry) = app();

    let (status, body): (_, ErrorResponse) = send(
        &app,
        start_request("domain=example.com&record_type=A&dns_resolver=dns.google"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.starts_with("Invalid input"));
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_logs_rendered() {
    let (app, registry) = app();

    let (status, _): (_, StartMonitorResponse) =
        send(&app, start_request("domain=example.com&record_type=A")).await;
    assert_eq!(status, StatusCode::OK);
    wait_for_log(&registry, "example.com", 2).await;

    let (status, body): (_, LogsResponse) = send(&app, get("/logs/example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.logs,
        vec![
            "✅ Initial A Record: 1.2.3.4 (TTL: 300)".to_string(),
            "SOUND_ALERT_START".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_initial_failure_logged() {
    let (app, registry) = app();

    send::<StartMonitorResponse>(&app, start_request("domain=nxdomain.example.com&record_type=TXT"))
        .await;
    wait_for_log(&registry, "nxdomain.example.com", 1).await;

    let (_, body): (_, LogsResponse) = send(&app, get("/logs/nxdomain.example.com")).await;
    assert_eq!(
        body.logs,
        vec![
            "Error: Unable to resolve TXT record for nxdomain.example.com. Resolver error: NXDOMAIN"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_unknown_domain_not_found() {
    let (app, _) = app();

    let (status, body): (_, ErrorResponse) = send(&app, get("/logs/unknown.example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "No logs found for this domain.");

    let (status, _): (_, ErrorResponse) = send(&app, get("/status/unknown.example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_domains_and_status() {
    let (app, registry) = app();

    send::<StartMonitorResponse>(&app, start_request("domain=b.example.com&record_type=A")).await;
    send::<StartMonitorResponse>(&app, start_request("domain=A.example.com&record_type=A")).await;

    let (_, body): (_, DomainsResponse) = send(&app, get("/domains")).await;
    assert_eq!(body.domains, vec!["a.example.com", "b.example.com"]);

    wait_for_log(&registry, "a.example.com", 2).await;
    let (status, body): (_, serde_json::Value) = send(&app, get("/status/a.example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], "a.example.com");
    assert_eq!(body["alive"], true);
    assert!(body["created_at"].is_string());
    assert_eq!(body["last_ttl"], 300);
    assert_eq!(body["start_sound_emitted"], true);
}

#[tokio::test]
async fn test_events_structured() {
    let (app, registry) = app();

    send::<StartMonitorResponse>(&app, start_request("domain=example.com&record_type=a")).await;
    wait_for_log(&registry, "example.com", 2).await;

    let (status, body): (_, serde_json::Value) = send(&app, get("/events/example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record_type"], "A");
    assert_eq!(body["events"][0]["type"], "initial_resolution");
    assert_eq!(body["events"][0]["value"], "1.2.3.4");
    assert_eq!(body["events"][1]["type"], "sound_alert");
    assert_eq!(body["events"][1]["kind"], "start");
}
