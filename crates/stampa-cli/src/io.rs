#![deny(clippy::all, clippy::pedantic)]

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tokio::fs;

use crate::client::CliError;

pub async fn read_html(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })
}

pub async fn write_pdf(path: &Path, bytes: &Bytes) -> Result<(), CliError> {
    fs::write(path, bytes)
        .await
        .map_err(|source| CliError::OutputFile {
            path: path.display().to_string(),
            source,
        })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::InvalidOutput(format!("failed to render output: {err}")))?;
    println!("{out}");
    Ok(())
}
