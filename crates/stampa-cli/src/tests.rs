#![deny(clippy::all, clippy::pedantic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use httpmock::MockServer;
use tokio::sync::Semaphore;

use stampa_api_types::{RenderOptions, RenderRequestBody, RequestStatus};

use clap::Parser;

use crate::args::{Cli, Commands, RenderOptionArgs};
use crate::client::HttpTransport;
use crate::ledger::RequestLedger;
use crate::lifecycle::{LifecycleController, RenderTransport, TransportError};
use crate::store::{LedgerStore, StoreError};

#[derive(Clone, Default)]
struct MemoryStore {
    contents: Arc<Mutex<Option<String>>>,
    fail_saves: bool,
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.lock().expect("store lock").clone())
    }

    fn save(&self, contents: &str) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::from(std::io::Error::other("disk full")));
        }
        *self.contents.lock().expect("store lock") = Some(contents.to_string());
        Ok(())
    }
}

struct FixedTransport {
    response: Result<Bytes, String>,
}

#[async_trait]
impl RenderTransport for FixedTransport {
    async fn render(&self, _body: &RenderRequestBody) -> Result<Bytes, TransportError> {
        match &self.response {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(TransportError::Server(message.clone())),
        }
    }
}

struct GatedTransport {
    gate: Arc<Semaphore>,
}

#[async_trait]
impl RenderTransport for GatedTransport {
    async fn render(&self, _body: &RenderRequestBody) -> Result<Bytes, TransportError> {
        let _permit = self.gate.acquire().await.expect("gate open");
        Ok(Bytes::from_static(b"%PDF-1.7 gated"))
    }
}

fn empty_ledger(store: MemoryStore) -> RequestLedger {
    RequestLedger::open(Box::new(store))
}

fn ok_controller(store: MemoryStore) -> LifecycleController {
    LifecycleController::new(
        empty_ledger(store),
        Box::new(FixedTransport {
            response: Ok(Bytes::from_static(b"%PDF-1.7 ok")),
        }),
    )
}

fn failing_controller(store: MemoryStore, message: &str) -> LifecycleController {
    LifecycleController::new(
        empty_ledger(store),
        Box::new(FixedTransport {
            response: Err(message.to_string()),
        }),
    )
}

#[test]
fn option_args_only_carry_flags_the_user_passed() {
    let options = RenderOptionArgs::default().to_options();
    assert_eq!(options, RenderOptions::default());

    let args = RenderOptionArgs {
        format: Some("Letter".to_string()),
        landscape: true,
        margin_top: Some("1cm".to_string()),
        ..RenderOptionArgs::default()
    };
    let options = args.to_options();

    assert_eq!(options.format.as_deref(), Some("Letter"));
    assert_eq!(options.landscape, Some(true));
    assert_eq!(options.print_background, None);
    let margin = options.margin.expect("margin");
    assert_eq!(margin.top.as_deref(), Some("1cm"));
    assert_eq!(margin.bottom, None);
}

#[test]
fn boolean_toggles_carry_explicit_values() {
    let args = RenderOptionArgs {
        omit_background: Some(true),
        prefer_css_page_size: Some(true),
        tagged: Some(false),
        wait_for_fonts: Some(false),
        ..RenderOptionArgs::default()
    };
    let options = args.to_options();

    assert_eq!(options.omit_background, Some(true));
    assert_eq!(options.prefer_css_page_size, Some(true));
    assert_eq!(options.tagged, Some(false));
    assert_eq!(options.wait_for_fonts, Some(false));
    assert_eq!(options.outline, None, "untouched toggles stay absent");
}

#[test]
fn parse_generate_boolean_toggles() {
    let cli = Cli::parse_from([
        "stampa-cli",
        "generate",
        "page.html",
        "--tagged=false",
        "--omit-background=true",
        "--outline=true",
    ]);

    match cli.command {
        Commands::Generate(cmd) => {
            assert_eq!(cmd.options.tagged, Some(false));
            assert_eq!(cmd.options.omit_background, Some(true));
            assert_eq!(cmd.options.outline, Some(true));
            assert_eq!(cmd.options.wait_for_fonts, None);
            assert_eq!(cmd.options.prefer_css_page_size, None);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn corrupt_history_starts_empty() {
    let store = MemoryStore::default();
    *store.contents.lock().expect("store lock") = Some("{not json".to_string());

    let ledger = empty_ledger(store);
    assert!(ledger.all().is_empty());
}

#[test]
fn update_of_unknown_id_is_a_no_op() {
    let store = MemoryStore::default();
    let mut ledger = empty_ledger(store.clone());

    ledger.update_status("missing", RequestStatus::Success, None);
    assert!(ledger.all().is_empty());
}

#[test]
fn save_failure_keeps_in_memory_state() {
    let store = MemoryStore {
        fail_saves: true,
        ..MemoryStore::default()
    };
    let mut ledger = empty_ledger(store);

    ledger.append(record("1-0"));
    assert_eq!(ledger.all().len(), 1);
}

#[test]
fn every_mutation_writes_through_to_the_store() {
    let store = MemoryStore::default();
    let mut ledger = empty_ledger(store.clone());

    ledger.append(record("1-0"));
    let after_append = store.contents.lock().expect("store lock").clone();
    assert!(after_append.expect("saved").contains("\"1-0\""));

    ledger.update_status("1-0", RequestStatus::Error, Some("boom".to_string()));
    let after_update = store.contents.lock().expect("store lock").clone();
    assert!(after_update.expect("saved").contains("boom"));

    ledger.clear();
    let after_clear = store.contents.lock().expect("store lock").clone();
    assert_eq!(after_clear.as_deref(), Some("[]"));
}

#[test]
fn history_survives_a_reload_through_the_store() {
    let store = MemoryStore::default();
    let mut ledger = empty_ledger(store.clone());
    ledger.append(record("1-0"));
    drop(ledger);

    let reloaded = empty_ledger(store);
    assert_eq!(reloaded.all().len(), 1);
    assert_eq!(reloaded.all()[0].id, "1-0");
}

#[test]
fn terminal_entries_never_transition_again() {
    let store = MemoryStore::default();
    let mut ledger = empty_ledger(store);

    ledger.append(record("1-0"));
    ledger.update_status("1-0", RequestStatus::Error, Some("boom".to_string()));
    ledger.update_status("1-0", RequestStatus::Success, None);

    let entry = ledger.get("1-0").expect("entry");
    assert_eq!(entry.status, RequestStatus::Error);
    assert_eq!(entry.error.as_deref(), Some("boom"));
}

fn record(id: &str) -> stampa_api_types::RenderRequestRecord {
    stampa_api_types::RenderRequestRecord {
        id: id.to_string(),
        created_at: time::OffsetDateTime::UNIX_EPOCH,
        html: "<h1>Hi</h1>".to_string(),
        options: RenderOptions::default(),
        status: RequestStatus::Pending,
        error: None,
    }
}

#[tokio::test]
async fn submit_records_pending_then_success() {
    let gate = Arc::new(Semaphore::new(0));
    let controller = Arc::new(LifecycleController::new(
        empty_ledger(MemoryStore::default()),
        Box::new(GatedTransport { gate: gate.clone() }),
    ));

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .submit("<h1>Hi</h1>".to_string(), RenderOptions::default())
                .await
        })
    };

    // Wait until the in-flight submission has recorded its pending entry.
    let mut pending_seen = false;
    for _ in 0..200 {
        let history = controller.history();
        if history.len() == 1 && history[0].status == RequestStatus::Pending {
            pending_seen = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(pending_seen, "submission never reached pending state");

    gate.add_permits(1);

    let outcome = task.await.expect("join");
    assert!(outcome.result.is_ok());

    let history = controller.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.id);
    assert_eq!(history[0].status, RequestStatus::Success);
    assert_eq!(history[0].error, None);
}

#[tokio::test]
async fn failed_submit_preserves_the_message_verbatim() {
    let controller = failing_controller(MemoryStore::default(), "engine exploded: tab crashed");

    let outcome = controller
        .submit("<h1>Hi</h1>".to_string(), RenderOptions::default())
        .await;
    assert!(outcome.result.is_err());

    let history = controller.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RequestStatus::Error);
    assert_eq!(
        history[0].error.as_deref(),
        Some("engine exploded: tab crashed")
    );
}

#[tokio::test]
async fn retry_creates_a_new_entry_and_leaves_the_original_alone() {
    let controller = failing_controller(MemoryStore::default(), "boom");

    let options = RenderOptions {
        format: Some("Letter".to_string()),
        ..RenderOptions::default()
    };
    let first = controller
        .submit("<h1>Hi</h1>".to_string(), options.clone())
        .await;

    let second = controller.retry(&first.id).await.expect("known id");
    assert_ne!(first.id, second.id);

    let history = controller.history();
    assert_eq!(history.len(), 2);
    let original = &history[0];
    let replay = &history[1];
    assert_eq!(original.id, first.id);
    assert_eq!(original.status, RequestStatus::Error);
    assert_eq!(replay.html, original.html);
    assert_eq!(replay.options, original.options);
    assert_eq!(replay.options, options);
}

#[test]
fn detached_controller_reads_and_clears_history() {
    let store = MemoryStore::default();
    let mut seeded = empty_ledger(store.clone());
    seeded.append(record("1-0"));
    drop(seeded);

    let controller = LifecycleController::detached(empty_ledger(store.clone()));
    assert_eq!(controller.history().len(), 1);

    controller.clear();
    assert!(controller.history().is_empty());
    let stored = store.contents.lock().expect("store lock").clone();
    assert_eq!(stored.as_deref(), Some("[]"));
}

#[tokio::test]
async fn retry_of_unknown_id_is_rejected() {
    let controller = ok_controller(MemoryStore::default());
    assert!(controller.retry("nope").await.is_none());
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_entries() {
    let controller = Arc::new(ok_controller(MemoryStore::default()));

    let (first, second) = tokio::join!(
        controller.submit("<p>one</p>".to_string(), RenderOptions::default()),
        controller.submit("<p>two</p>".to_string(), RenderOptions::default()),
    );

    assert_ne!(first.id, second.id);
    let history = controller.history();
    assert_eq!(history.len(), 2);
    assert!(
        history
            .iter()
            .all(|entry| entry.status == RequestStatus::Success)
    );
}

#[tokio::test]
async fn http_transport_returns_pdf_bytes() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/render");
        then.status(200)
            .header("content-type", "application/pdf")
            .body("%PDF-1.7 wire");
    });

    let transport = HttpTransport::new(&server.base_url()).expect("transport");
    let bytes = transport
        .render(&RenderRequestBody {
            html: "<h1>Hi</h1>".to_string(),
            options: RenderOptions::default(),
        })
        .await
        .expect("render");

    assert!(bytes.starts_with(b"%PDF"));
    mock.assert();
}

#[tokio::test]
async fn http_transport_prefers_error_details() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/render");
        then.status(500)
            .header("content-type", "application/json")
            .body(r#"{"error":"Failed to generate PDF","details":"tab crashed"}"#);
    });

    let transport = HttpTransport::new(&server.base_url()).expect("transport");
    let err = transport
        .render(&RenderRequestBody::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Server(message) if message == "tab crashed"));
}

#[tokio::test]
async fn http_transport_falls_back_to_the_error_field() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/render");
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"error":"HTML content is required"}"#);
    });

    let transport = HttpTransport::new(&server.base_url()).expect("transport");
    let err = transport
        .render(&RenderRequestBody::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Server(message) if message == "HTML content is required"));
}

#[tokio::test]
async fn http_transport_reports_unrecognized_error_bodies() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/render");
        then.status(502).body("<html>bad gateway</html>");
    });

    let transport = HttpTransport::new(&server.base_url()).expect("transport");
    let err = transport
        .render(&RenderRequestBody::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Decode(_)));
}
