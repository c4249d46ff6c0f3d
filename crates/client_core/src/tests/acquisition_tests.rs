use super::*;

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use shared::domain::{ExhibitorId, ProductId};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct EndpointState {
    status: StatusCode,
    body: Value,
    delay: Duration,
    hits: Arc<AtomicUsize>,
}

async fn serve_exhibitors(State(state): State<EndpointState>) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.body.clone()))
}

async fn spawn_endpoint_with_delay(
    status: StatusCode,
    body: Value,
    delay: Duration,
) -> (Url, Arc<AtomicUsize>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let state = EndpointState {
        status,
        body,
        delay,
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/api/startup", get(serve_exhibitors))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let url = Url::parse(&format!("http://{addr}/api/startup")).expect("url");
    (url, hits)
}

async fn spawn_endpoint(status: StatusCode, body: Value) -> (Url, Arc<AtomicUsize>) {
    spawn_endpoint_with_delay(status, body, Duration::ZERO).await
}

/// An address nothing is listening on.
async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    Url::parse(&format!("http://{addr}/api/startup")).expect("url")
}

fn exhibitor_json(id: i64, name: &str) -> Value {
    json!({
        "ID": id,
        "name": name,
        "banner": "https://cdn.example.com/banner.jpg",
        "logo": "https://cdn.example.com/logo.png",
        "websiteURL": "https://stall.example.com",
        "pitchDeck": "https://example.com/pitch.pdf",
        "dpiitCertNumber": "DPIIT000001",
        "products": [{ "ID": id * 10, "title": format!("{name} product") }]
    })
}

fn settings(primary_url: Option<Url>, backup_url: Option<Url>) -> Settings {
    Settings {
        primary_url,
        backup_url,
        primary_timeout: Duration::from_secs(2),
        backup_timeout: Duration::from_secs(2),
        retry: RetryPolicy::none(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn primary_success_skips_backup() {
    let (primary, _) = spawn_endpoint(StatusCode::OK, json!([exhibitor_json(1, "Live")])).await;
    let (backup, backup_hits) =
        spawn_endpoint(StatusCode::OK, json!([exhibitor_json(2, "Backup")])).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Primary);
    assert_eq!(result.records[0].name, "Live");
    assert!(result.error.is_none());
    assert_eq!(backup_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn primary_server_error_uses_backup_records() {
    let (primary, primary_hits) =
        spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
    let (backup, _) = spawn_endpoint(
        StatusCode::OK,
        json!([exhibitor_json(2, "Backup One"), exhibitor_json(3, "Backup Two")]),
    )
    .await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(primary_hits.load(Ordering::SeqCst), 1);
    assert_eq!(result.source, DataSource::Backup);
    assert_eq!(
        result.records.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![ExhibitorId(2), ExhibitorId(3)]
    );
    assert_ne!(result.records, fallback_exhibitors());
}

#[tokio::test]
async fn both_endpoints_failing_resolves_with_fallback() {
    let (primary, _) =
        spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
    let backup = unreachable_url().await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Fallback(FallbackReason::Unavailable));
    assert!(!result.records.is_empty());
    assert_eq!(result.records, fallback_exhibitors());

    let error = result.error.expect("diagnostic");
    assert_eq!(error.code, ErrorCode::HttpStatus);
    assert_eq!(error.message, "API Error: 500 - Internal Server Error");
}

#[tokio::test]
async fn empty_primary_response_serves_fallback_without_trying_backup() {
    let (primary, _) = spawn_endpoint(StatusCode::OK, json!([])).await;
    let (backup, backup_hits) =
        spawn_endpoint(StatusCode::OK, json!([exhibitor_json(2, "Backup")])).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Fallback(FallbackReason::EmptyResult));
    assert_eq!(result.records, fallback_exhibitors());
    assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::EmptyResult));
    assert_eq!(backup_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_backup_response_also_serves_fallback() {
    let primary = unreachable_url().await;
    let (backup, _) = spawn_endpoint(StatusCode::OK, json!([])).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Fallback(FallbackReason::EmptyResult));
}

#[tokio::test]
async fn non_array_body_counts_as_failure() {
    let (primary, _) = spawn_endpoint(StatusCode::OK, json!({ "data": [] })).await;
    let (backup, _) = spawn_endpoint(StatusCode::OK, json!([exhibitor_json(4, "Backup")])).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Backup);
    assert_eq!(result.records[0].id, ExhibitorId(4));
}

#[tokio::test]
async fn malformed_body_without_backup_reports_malformed() {
    let (primary, _) = spawn_endpoint(StatusCode::OK, json!("<html>maintenance</html>")).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), None), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert!(result.source.is_fallback());
    assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::Malformed));
}

#[tokio::test]
async fn one_null_collection_does_not_discard_the_primary_list() {
    let (primary, _) = spawn_endpoint(
        StatusCode::OK,
        json!([
            exhibitor_json(1, "Good"),
            { "ID": 2, "name": "NullProducts", "products": null },
            { "name": "no identity" }
        ]),
    )
    .await;
    let (backup, backup_hits) =
        spawn_endpoint(StatusCode::OK, json!([exhibitor_json(4, "Backup")])).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Primary);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[1].name, "NullProducts");
    assert!(result.records[1].products.is_empty());
    assert_eq!(backup_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_primary_times_out_and_falls_through_to_backup() {
    let (primary, _) = spawn_endpoint_with_delay(
        StatusCode::OK,
        json!([exhibitor_json(1, "Too Late")]),
        Duration::from_millis(800),
    )
    .await;
    let (backup, _) = spawn_endpoint(StatusCode::OK, json!([exhibitor_json(2, "Backup")])).await;
    let mut settings = settings(Some(primary), Some(backup));
    settings.primary_timeout = Duration::from_millis(100);
    let acquirer = ExhibitorAcquirer::new(&settings, CallCounter::new());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Backup);
    assert_eq!(result.records[0].name, "Backup");
}

#[tokio::test]
async fn unset_urls_serve_fallback_and_count_each_call() {
    let counter = CallCounter::new();
    let acquirer = ExhibitorAcquirer::new(&settings(None, None), counter.clone());

    let first = acquirer.fetch_exhibitors().await;
    assert_eq!(counter.get(), 1);
    let second = acquirer.fetch_exhibitors().await;
    assert_eq!(counter.get(), 2);

    assert_eq!(first.records, fallback_exhibitors());
    assert_eq!(second.source, DataSource::Fallback(FallbackReason::Unavailable));
    assert_eq!(
        first.error.map(|e| e.code),
        Some(ErrorCode::NotConfigured)
    );
}

#[test]
fn empty_replacement_fallback_is_ignored() {
    let acquirer =
        ExhibitorAcquirer::new(&settings(None, None), CallCounter::new()).with_fallback(Vec::new());
    assert_eq!(acquirer.fallback(), fallback_exhibitors().as_slice());
}

#[tokio::test]
async fn probe_reports_status_and_missing_endpoints() {
    let (primary, _) = spawn_endpoint(StatusCode::OK, json!([])).await;
    let (backup, _) = spawn_endpoint(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
    let acquirer = ExhibitorAcquirer::new(&settings(Some(primary), Some(backup)), CallCounter::new());

    let ok = acquirer.probe(Endpoint::Primary).await;
    assert!(ok.success);
    assert_eq!(ok.status, Some(200));

    let unavailable = acquirer.probe(Endpoint::Backup).await;
    assert!(!unavailable.success);
    assert_eq!(unavailable.status, Some(503));

    let missing = ExhibitorAcquirer::new(&settings(None, None), CallCounter::new())
        .probe(Endpoint::Primary)
        .await;
    assert!(!missing.success);
    assert_eq!(missing.error.as_deref(), Some("endpoint not configured"));
}

/// Transport that replays scripted outcomes per endpoint host.
struct ScriptedTransport {
    primary: Mutex<VecDeque<Result<Vec<ExhibitorRecord>, FetchError>>>,
    primary_calls: AtomicUsize,
    backup_calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(primary: Vec<Result<Vec<ExhibitorRecord>, FetchError>>) -> Self {
        Self {
            primary: Mutex::new(primary.into()),
            primary_calls: AtomicUsize::new(0),
            backup_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ExhibitorTransport for ScriptedTransport {
    async fn get_exhibitors(
        &self,
        url: &Url,
        _timeout: Duration,
    ) -> Result<Vec<ExhibitorRecord>, FetchError> {
        if url.host_str() == Some("backup.test") {
            self.backup_calls.fetch_add(1, Ordering::SeqCst);
            return Err(FetchError::Network("connection refused".into()));
        }
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        self.primary
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Network("script exhausted".into())))
    }

    async fn probe(&self, _url: &Url, _timeout: Duration) -> Result<u16, FetchError> {
        Ok(200)
    }
}

fn scripted_settings(retries: u32) -> Settings {
    let mut settings = settings(
        Some(Url::parse("http://primary.test/api/startup").expect("url")),
        Some(Url::parse("http://backup.test/api/startup").expect("url")),
    );
    settings.retry = RetryPolicy {
        retries,
        ..RetryPolicy::default()
    };
    settings
}

fn one_record() -> Vec<ExhibitorRecord> {
    let mut record = fallback_exhibitors().remove(0);
    record.id = ExhibitorId(99);
    record.products.truncate(1);
    record.products[0].id = ProductId(990);
    vec![record]
}

#[tokio::test(start_paused = true)]
async fn retries_failed_rounds_before_succeeding() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Err(FetchError::Timeout),
        Err(FetchError::Network("reset".into())),
        Ok(one_record()),
    ]));
    let counter = CallCounter::new();
    let acquirer =
        ExhibitorAcquirer::with_transport(transport.clone(), &scripted_settings(3), counter.clone());

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Primary);
    assert_eq!(result.records[0].id, ExhibitorId(99));
    assert_eq!(transport.primary_calls.load(Ordering::SeqCst), 3);
    assert_eq!(transport.backup_calls.load(Ordering::SeqCst), 2);
    assert_eq!(counter.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_fall_back() {
    let transport = Arc::new(ScriptedTransport::new(Vec::new()));
    let acquirer = ExhibitorAcquirer::with_transport(
        transport.clone(),
        &scripted_settings(3),
        CallCounter::new(),
    );

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Fallback(FallbackReason::Unavailable));
    assert_eq!(transport.primary_calls.load(Ordering::SeqCst), 4);
    assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::Network));
}

#[tokio::test(start_paused = true)]
async fn missing_endpoints_are_not_retried() {
    let transport = Arc::new(ScriptedTransport::new(Vec::new()));
    let acquirer = ExhibitorAcquirer::with_transport(
        transport.clone(),
        &Settings {
            retry: RetryPolicy::default(),
            ..settings(None, None)
        },
        CallCounter::new(),
    );

    let result = acquirer.fetch_exhibitors().await;

    assert!(result.source.is_fallback());
    assert_eq!(transport.primary_calls.load(Ordering::SeqCst), 0);
    assert_eq!(transport.backup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn malformed_bodies_are_not_retried() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Err(FetchError::Malformed("expected a JSON array".into())),
        Ok(one_record()),
    ]));
    let acquirer = ExhibitorAcquirer::with_transport(
        transport.clone(),
        &scripted_settings(RetryPolicy::default().retries),
        CallCounter::new(),
    );
    let started = tokio::time::Instant::now();

    let result = acquirer.fetch_exhibitors().await;

    assert_eq!(result.source, DataSource::Fallback(FallbackReason::Unavailable));
    assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::Malformed));
    assert_eq!(transport.primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.backup_calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}
