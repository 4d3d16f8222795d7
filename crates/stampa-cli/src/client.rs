#![deny(clippy::all, clippy::pedantic)]

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;

use stampa_api_types::{RenderErrorBody, RenderRequestBody};

use crate::lifecycle::{RenderTransport, TransportError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("server URL is required (use --server or STAMPA_SERVER_URL)")]
    MissingServer,
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write output file {path}: {source}")]
    OutputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("no recorded request with id {0}")]
    UnknownRequest(String),
    #[error("render failed for request {id}: {message}")]
    Render { id: String, message: String },
    #[error("invalid output: {0}")]
    InvalidOutput(String),
}

/// HTTP transport to a running stampa server.
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(server: &str) -> Result<Self, CliError> {
        let base = Url::parse(server)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("stampa-cli/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl RenderTransport for HttpTransport {
    async fn render(&self, body: &RenderRequestBody) -> Result<Bytes, TransportError> {
        let url = self
            .base
            .join("api/render")
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        if !status.is_success() {
            // Prefer the server's detailed message over the presentation one.
            let message = match serde_json::from_slice::<RenderErrorBody>(&bytes) {
                Ok(error_body) if !error_body.details.is_empty() => error_body.details,
                Ok(error_body) if !error_body.error.is_empty() => error_body.error,
                Ok(_) | Err(_) => {
                    return Err(TransportError::Decode(format!(
                        "status {status} with unrecognized error body"
                    )));
                }
            };
            return Err(TransportError::Server(message));
        }

        Ok(bytes)
    }
}
