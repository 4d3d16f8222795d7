//! stampa: an HTML-to-PDF rendering service.
//!
//! The crate is layered the usual way: `domain` holds the option
//! normalization rules, `application` orchestrates render sessions behind
//! engine ports, and `infra` supplies the Chromium adapter, HTTP surface,
//! telemetry, and configuration plumbing.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
