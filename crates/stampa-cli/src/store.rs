//! Durable storage port for the request ledger.

#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const HISTORY_FILE: &str = "stampa-history.json";

#[derive(Debug, Error)]
#[error("history storage error: {0}")]
pub struct StoreError(#[from] std::io::Error);

/// Key-value style storage for the serialized ledger. One implementation
/// writes a file on disk; tests substitute an in-memory fake.
pub trait LedgerStore: Send {
    /// Returns `None` when no ledger has been stored yet.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, contents: &str) -> Result<(), StoreError>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
        }
    }
}

impl LedgerStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError(err)),
        }
    }

    fn save(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
