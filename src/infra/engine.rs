//! Headless-Chromium adapter for the rendering engine port.
//!
//! Each acquired session owns a private browser process and one tab, so
//! concurrent requests never share engine state. The `headless_chrome` API
//! is blocking; every call runs inside `tokio::task::spawn_blocking`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use headless_chrome::protocol::cdp::{DOM, Emulation};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tokio::task;
use tracing::debug;

use crate::application::engine::{EngineSession, RenderEngine, RenderError};
use crate::config::EngineSettings;
use crate::domain::RenderDirectives;

const FONT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const PX_PER_INCH: f64 = 96.0;

pub struct ChromiumEngine {
    settings: EngineSettings,
}

impl ChromiumEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, RenderError> {
        let settings = self.settings.clone();
        let session = task::spawn_blocking(move || {
            let launch = LaunchOptions {
                headless: true,
                sandbox: settings.sandbox,
                path: settings.browser_path.clone(),
                ..Default::default()
            };
            let browser = Browser::new(launch).map_err(RenderError::engine)?;
            let tab = browser.new_tab().map_err(RenderError::engine)?;
            Ok::<_, RenderError>(ChromiumSession {
                browser: Some(browser),
                tab,
            })
        })
        .await
        .map_err(RenderError::engine)??;

        debug!(target: "stampa::engine", "chromium session acquired");
        Ok(Box::new(session))
    }
}

struct ChromiumSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

#[async_trait]
impl EngineSession for ChromiumSession {
    async fn load(&mut self, html: &str, _budget: Duration) -> Result<(), RenderError> {
        let tab = self.tab.clone();
        let url = format!("data:text/html;base64,{}", BASE64.encode(html));
        task::spawn_blocking(move || {
            tab.navigate_to(&url).map_err(RenderError::load)?;
            tab.wait_until_navigated().map_err(RenderError::load)?;
            Ok(())
        })
        .await
        .map_err(RenderError::load)?
    }

    async fn await_fonts(&mut self, budget: Duration) -> Result<(), RenderError> {
        let tab = self.tab.clone();
        task::spawn_blocking(move || {
            // The CDP surface exposes no font-readiness event, so poll the
            // FontFaceSet status until it settles or the budget runs out.
            let deadline = Instant::now() + budget;
            loop {
                let status = tab
                    .evaluate("document.fonts.status", false)
                    .map_err(RenderError::load)?;
                let loaded = status
                    .value
                    .as_ref()
                    .and_then(|value| value.as_str())
                    .is_some_and(|state| state == "loaded");
                if loaded {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(RenderError::Timeout(budget.as_millis() as u64));
                }
                std::thread::sleep(FONT_POLL_INTERVAL);
            }
        })
        .await
        .map_err(RenderError::load)?
    }

    async fn render(&mut self, directives: &RenderDirectives) -> Result<Bytes, RenderError> {
        let tab = self.tab.clone();
        let options = print_options(directives)?;
        let omit_background = directives.omit_background;
        let pdf = task::spawn_blocking(move || {
            if omit_background {
                tab.call_method(Emulation::SetDefaultBackgroundColorOverride {
                    color: Some(DOM::RGBA {
                        r: 0,
                        g: 0,
                        b: 0,
                        a: Some(0.0),
                    }),
                })
                .map_err(RenderError::render)?;
            }
            tab.print_to_pdf(Some(options)).map_err(RenderError::render)
        })
        .await
        .map_err(RenderError::render)??;
        Ok(Bytes::from(pdf))
    }

    async fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            // Dropping the handle tears down the browser process; do it off
            // the async runtime since teardown blocks on process exit.
            let _ = task::spawn_blocking(move || drop(browser)).await;
            debug!(target: "stampa::engine", "chromium session released");
        }
    }
}

/// Map strict directives onto the engine's print call. Explicit dimensions
/// override the named format side-by-side, matching the engine rule that
/// custom sizes win over formats.
fn print_options(directives: &RenderDirectives) -> Result<PrintToPdfOptions, RenderError> {
    let (mut paper_width, mut paper_height) = match directives.format {
        Some(format) => {
            let (width, height) = format.size_inches();
            (Some(width), Some(height))
        }
        None => (None, None),
    };
    if let Some(width) = directives.width.as_deref() {
        paper_width = Some(length_to_inches(width, "width")?);
    }
    if let Some(height) = directives.height.as_deref() {
        paper_height = Some(length_to_inches(height, "height")?);
    }

    let mut margin_top = None;
    let mut margin_bottom = None;
    let mut margin_left = None;
    let mut margin_right = None;
    if let Some(margin) = directives.margin.as_ref() {
        margin_top = Some(length_to_inches(&margin.top, "margin.top")?);
        margin_bottom = Some(length_to_inches(&margin.bottom, "margin.bottom")?);
        margin_left = Some(length_to_inches(&margin.left, "margin.left")?);
        margin_right = Some(length_to_inches(&margin.right, "margin.right")?);
    }

    Ok(PrintToPdfOptions {
        landscape: Some(directives.landscape),
        display_header_footer: Some(directives.display_header_footer),
        print_background: Some(directives.print_background),
        scale: Some(directives.scale),
        paper_width,
        paper_height,
        margin_top,
        margin_bottom,
        margin_left,
        margin_right,
        page_ranges: directives.page_ranges.clone(),
        header_template: directives.header_template.clone(),
        footer_template: directives.footer_template.clone(),
        prefer_css_page_size: Some(directives.prefer_css_page_size),
        generate_tagged_pdf: Some(directives.tagged),
        generate_document_outline: Some(directives.outline),
        ..Default::default()
    })
}

/// Parse a CSS-style length (`in`, `cm`, `mm`, `px`, or a bare pixel
/// number) into inches for the print call.
fn length_to_inches(value: &str, field: &str) -> Result<f64, RenderError> {
    let trimmed = value.trim();
    let (number, divisor) = if let Some(rest) = trimmed.strip_suffix("in") {
        (rest, 1.0)
    } else if let Some(rest) = trimmed.strip_suffix("cm") {
        (rest, 2.54)
    } else if let Some(rest) = trimmed.strip_suffix("mm") {
        (rest, 25.4)
    } else if let Some(rest) = trimmed.strip_suffix("px") {
        (rest, PX_PER_INCH)
    } else {
        (trimmed, PX_PER_INCH)
    };

    let parsed: f64 = number.trim().parse().map_err(|_| {
        RenderError::Render(format!("invalid dimension `{value}` for `{field}`"))
    })?;
    let inches = parsed / divisor;
    if !inches.is_finite() || inches < 0.0 {
        return Err(RenderError::Render(format!(
            "dimension `{value}` for `{field}` is out of range"
        )));
    }
    Ok(inches)
}
