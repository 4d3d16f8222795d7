//! In-memory request history with write-through persistence.

#![deny(clippy::all, clippy::pedantic)]

use stampa_api_types::{RenderRequestRecord, RequestStatus};

use crate::store::LedgerStore;

/// Ordered sequence of recorded render requests, oldest first. Every
/// mutation writes the full serialized sequence back to the store; a failed
/// write is reported but never rolls back the in-memory state.
pub struct RequestLedger {
    records: Vec<RenderRequestRecord>,
    store: Box<dyn LedgerStore>,
}

impl RequestLedger {
    /// Load the stored history. Corrupt or unreadable data is reported and
    /// the ledger starts empty rather than failing startup.
    pub fn open(store: Box<dyn LedgerStore>) -> Self {
        let records = match store.load() {
            Ok(Some(contents)) => match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(err) => {
                    warn("request history is corrupt, starting empty", &err);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn("failed to read request history, starting empty", &err);
                Vec::new()
            }
        };

        Self { records, store }
    }

    pub fn append(&mut self, record: RenderRequestRecord) {
        self.records.push(record);
        self.persist();
    }

    /// Move a pending entry to its terminal status. Unknown ids and entries
    /// that already reached a terminal status are left untouched; a
    /// clear-history race makes both possible mid-flight.
    pub fn update_status(&mut self, id: &str, status: RequestStatus, error: Option<String>) {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.id == id && record.status == RequestStatus::Pending)
        else {
            return;
        };

        record.status = status;
        record.error = error;
        self.persist();
    }

    pub fn get(&self, id: &str) -> Option<&RenderRequestRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn all(&self) -> &[RenderRequestRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.persist();
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.records) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn("failed to serialize request history", &err);
                return;
            }
        };
        if let Err(err) = self.store.save(&serialized) {
            warn("failed to persist request history", &err);
        }
    }
}

fn warn(context: &str, err: &dyn std::fmt::Display) {
    eprintln!("warning: {context}: {err}");
}
