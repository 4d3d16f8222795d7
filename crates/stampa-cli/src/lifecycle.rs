//! Request lifecycle: submission, status transitions, and retry.

#![deny(clippy::all, clippy::pedantic)]

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;

use stampa_api_types::{RenderOptions, RenderRequestBody, RenderRequestRecord, RequestStatus};

use crate::ledger::RequestLedger;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a structured error; the message carries its
    /// `details` (or `error` when details are absent) verbatim.
    #[error("{0}")]
    Server(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("malformed server response: {0}")]
    Decode(String),
}

/// Boundary call to the rendering server.
#[async_trait]
pub trait RenderTransport: Send + Sync {
    async fn render(&self, body: &RenderRequestBody) -> Result<Bytes, TransportError>;
}

pub struct SubmitOutcome {
    pub id: String,
    pub result: Result<Bytes, TransportError>,
}

/// Drives one request from submission to terminal status. Each submission
/// owns its own ledger entry by id; concurrent submissions never interfere.
/// The ledger lock is held only for the short keyed mutations, never across
/// the boundary call.
pub struct LifecycleController {
    ledger: Mutex<RequestLedger>,
    transport: Option<Box<dyn RenderTransport>>,
    sequence: AtomicU64,
}

impl LifecycleController {
    pub fn new(ledger: RequestLedger, transport: Box<dyn RenderTransport>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            transport: Some(transport),
            sequence: AtomicU64::new(0),
        }
    }

    /// Controller over the ledger alone, for history inspection and
    /// maintenance commands that never reach the server.
    pub fn detached(ledger: RequestLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            transport: None,
            sequence: AtomicU64::new(0),
        }
    }

    /// Record a pending entry, run the boundary call, then move the entry
    /// to success or error. The error message lands in the ledger verbatim.
    pub async fn submit(&self, html: String, options: RenderOptions) -> SubmitOutcome {
        let id = self.next_request_id();
        let record = RenderRequestRecord {
            id: id.clone(),
            created_at: OffsetDateTime::now_utc(),
            html: html.clone(),
            options: options.clone(),
            status: RequestStatus::Pending,
            error: None,
        };
        self.ledger().append(record);

        let body = RenderRequestBody { html, options };
        let result = match &self.transport {
            Some(transport) => transport.render(&body).await,
            None => Err(TransportError::Network(
                "no server transport configured".to_string(),
            )),
        };

        match &result {
            Ok(_) => self.ledger().update_status(&id, RequestStatus::Success, None),
            Err(err) => {
                self.ledger()
                    .update_status(&id, RequestStatus::Error, Some(err.to_string()));
            }
        }

        SubmitOutcome { id, result }
    }

    /// Re-submit the raw markup and options of a recorded request as a
    /// brand-new entry. The original entry is immutable history.
    pub async fn retry(&self, id: &str) -> Option<SubmitOutcome> {
        let (html, options) = {
            let ledger = self.ledger();
            let record = ledger.get(id)?;
            (record.html.clone(), record.options.clone())
        };
        Some(self.submit(html, options).await)
    }

    pub fn history(&self) -> Vec<RenderRequestRecord> {
        self.ledger().all().to_vec()
    }

    pub fn clear(&self) {
        self.ledger().clear();
    }

    fn ledger(&self) -> MutexGuard<'_, RequestLedger> {
        self.ledger.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Timestamp-derived id, unique within the process via a sequence tail.
    fn next_request_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{millis}-{seq}")
    }
}
