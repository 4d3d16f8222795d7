//! Option normalization: raw caller-supplied option bags become strict,
//! engine-ready rendering directives.
//!
//! The engine treats an explicitly-present empty value differently from an
//! absent one for several fields (dimensions and margins in particular), so
//! normalization merges defaults first and then strips every empty value
//! outright instead of forwarding it.

use std::time::Duration;

use stampa_api_types::{Length, RenderOptions};

use crate::domain::error::DomainError;

pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 2.0;

const DEFAULT_SCALE: f64 = 1.0;
const DEFAULT_TIMEOUT_MS: i64 = 30_000;

/// Named paper sizes accepted by the rendering engine, with dimensions in
/// inches matching the engine's paper-format table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperFormat {
    Letter,
    Legal,
    Tabloid,
    Ledger,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
}

impl PaperFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "letter" => Some(PaperFormat::Letter),
            "legal" => Some(PaperFormat::Legal),
            "tabloid" => Some(PaperFormat::Tabloid),
            "ledger" => Some(PaperFormat::Ledger),
            "a0" => Some(PaperFormat::A0),
            "a1" => Some(PaperFormat::A1),
            "a2" => Some(PaperFormat::A2),
            "a3" => Some(PaperFormat::A3),
            "a4" => Some(PaperFormat::A4),
            "a5" => Some(PaperFormat::A5),
            "a6" => Some(PaperFormat::A6),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperFormat::Letter => "Letter",
            PaperFormat::Legal => "Legal",
            PaperFormat::Tabloid => "Tabloid",
            PaperFormat::Ledger => "Ledger",
            PaperFormat::A0 => "A0",
            PaperFormat::A1 => "A1",
            PaperFormat::A2 => "A2",
            PaperFormat::A3 => "A3",
            PaperFormat::A4 => "A4",
            PaperFormat::A5 => "A5",
            PaperFormat::A6 => "A6",
        }
    }

    /// Page size as (width, height) in inches.
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Legal => (8.5, 14.0),
            PaperFormat::Tabloid => (11.0, 17.0),
            PaperFormat::Ledger => (17.0, 11.0),
            PaperFormat::A0 => (33.1, 46.8),
            PaperFormat::A1 => (23.4, 33.1),
            PaperFormat::A2 => (16.54, 23.4),
            PaperFormat::A3 => (11.7, 16.54),
            PaperFormat::A4 => (8.27, 11.7),
            PaperFormat::A5 => (5.83, 8.27),
            PaperFormat::A6 => (4.13, 5.83),
        }
    }
}

/// Page margins with all four sides populated. Either the whole struct is
/// present or the output carries no margin directive at all; the engine
/// distinguishes "no margin directive" from "explicit zero margin".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Margin {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

/// The strict, engine-ready form of rendering options.
///
/// No field ever holds an empty string; `Option` marks the fields where
/// absence is itself a meaningful engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDirectives {
    pub scale: f64,
    pub display_header_footer: bool,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
    pub print_background: bool,
    pub landscape: bool,
    pub page_ranges: Option<String>,
    pub format: Option<PaperFormat>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub margin: Option<Margin>,
    pub omit_background: bool,
    pub prefer_css_page_size: bool,
    pub outline: bool,
    pub tagged: bool,
    pub timeout: Duration,
    pub wait_for_fonts: bool,
}

/// Normalize a raw option bag into engine directives.
///
/// Merges the bag over the fixed default set, validates the numeric fields,
/// and strips empty values. The default `A4` format is injected only when
/// the caller supplied neither a format nor a complete custom width/height
/// pair, so blank-dimension custom-size requests do not silently revert to
/// A4.
pub fn normalize(raw: &RenderOptions) -> Result<RenderDirectives, DomainError> {
    let scale = raw.scale.unwrap_or(DEFAULT_SCALE);
    if !scale.is_finite() || !(SCALE_MIN..=SCALE_MAX).contains(&scale) {
        return Err(DomainError::validation(
            "scale",
            format!("must be a number between {SCALE_MIN} and {SCALE_MAX}, got {scale}"),
        ));
    }

    let timeout_ms = raw.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms <= 0 {
        return Err(DomainError::validation(
            "timeout",
            format!("must be a positive number of milliseconds, got {timeout_ms}"),
        ));
    }

    let width = raw.width.as_ref().and_then(dimension);
    let height = raw.height.as_ref().and_then(dimension);
    let has_custom_size = width.is_some() && height.is_some();

    let format = match raw.format.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(PaperFormat::parse(name).ok_or_else(|| {
            DomainError::validation("format", format!("unknown paper format `{name}`"))
        })?),
        // Absent or blank: default to A4 unless the caller asked for a
        // complete custom page size.
        _ if has_custom_size => None,
        _ => Some(PaperFormat::A4),
    };

    let display_header_footer = raw.display_header_footer.unwrap_or(false);
    // Templates only ride along when the header/footer band is enabled.
    let header_template = display_header_footer
        .then(|| raw.header_template.as_deref().and_then(non_empty))
        .flatten();
    let footer_template = display_header_footer
        .then(|| raw.footer_template.as_deref().and_then(non_empty))
        .flatten();

    // Margin is all-or-nothing: when the caller supplied a margin object,
    // each side independently falls back to "0"; otherwise the directive is
    // omitted entirely.
    let margin = raw.margin.as_ref().map(|m| Margin {
        top: margin_side(m.top.as_deref()),
        bottom: margin_side(m.bottom.as_deref()),
        left: margin_side(m.left.as_deref()),
        right: margin_side(m.right.as_deref()),
    });

    Ok(RenderDirectives {
        scale,
        display_header_footer,
        header_template,
        footer_template,
        print_background: raw.print_background.unwrap_or(false),
        landscape: raw.landscape.unwrap_or(false),
        page_ranges: raw.page_ranges.as_deref().and_then(non_empty),
        format,
        width,
        height,
        margin,
        omit_background: raw.omit_background.unwrap_or(false),
        prefer_css_page_size: raw.prefer_css_page_size.unwrap_or(false),
        outline: raw.outline.unwrap_or(false),
        tagged: raw.tagged.unwrap_or(true),
        timeout: Duration::from_millis(timeout_ms as u64),
        wait_for_fonts: raw.wait_for_fonts.unwrap_or(true),
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

fn dimension(value: &Length) -> Option<String> {
    (!value.is_blank()).then(|| value.as_dimension())
}

fn margin_side(value: Option<&str>) -> String {
    value
        .and_then(non_empty)
        .unwrap_or_else(|| "0".to_string())
}
