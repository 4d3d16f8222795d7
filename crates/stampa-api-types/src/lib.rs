//! Shared request and response types for the stampa rendering API.
//!
//! These types define the wire contract between the server and its clients:
//! the raw rendering option bag, the render request/error bodies, and the
//! request-history record persisted by clients. Field names follow the
//! camelCase JSON contract of the boundary; the server owns defaulting and
//! validation, so everything here is intentionally loose.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A dimension value as submitted by a caller: either a CSS-style length
/// string (`"10cm"`, `"8.5in"`) or a bare number, which means pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Text(String),
    Pixels(f64),
}

impl Length {
    /// The dimension as a string; bare numbers become `"{n}px"`.
    pub fn as_dimension(&self) -> String {
        match self {
            Length::Text(text) => text.clone(),
            Length::Pixels(px) => format!("{px}px"),
        }
    }

    /// True when the value carries no usable dimension (blank string).
    pub fn is_blank(&self) -> bool {
        matches!(self, Length::Text(text) if text.trim().is_empty())
    }
}

/// Per-side page margins, each optional and each a dimension string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

/// Raw rendering options exactly as submitted by a caller, before any
/// normalization. Every field is optional; absent fields take server-side
/// defaults. An explicitly empty string is distinct from an absent field
/// until the server's strip-empties pass removes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_header_footer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landscape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<MarginOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_css_page_size: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_fonts: Option<bool>,
}

/// Request body for `POST /api/render`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderRequestBody {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub options: RenderOptions,
}

/// Structured error body returned by the server on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: String,
}

/// Lifecycle status of a recorded render request. A request is created as
/// `Pending` and transitions exactly once to `Success` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        }
    }
}

/// One entry in the client-side request history.
///
/// `options` intentionally holds the raw, pre-normalization bag so a retry
/// re-runs server-side normalization on exactly what the user entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequestRecord {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub html: String,
    pub options: RenderOptions,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
