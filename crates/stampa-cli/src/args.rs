//! Command-line surface for `stampa-cli`.
//! Kept in a shared file so tests can reuse the same definitions as the
//! binary itself.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use stampa_api_types::{Length, MarginOptions, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "stampa-cli", version, about = "Stampa rendering service CLI", long_about = None)]
pub struct Cli {
    /// Server base URL, e.g. <http://localhost:3000>
    #[arg(long, env = "STAMPA_SERVER_URL")]
    pub server: Option<String>,

    /// Directory holding the request history file
    #[arg(long, env = "STAMPA_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an HTML file to PDF
    Generate(GenerateArgs),
    /// Re-submit a recorded request as a new attempt
    Retry(RetryArgs),
    /// Print the request history as JSON
    History,
    /// Delete the whole request history
    Clear,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Path to the HTML input file
    pub input: PathBuf,

    /// Where to write the PDF
    #[arg(long, short, default_value = "generated.pdf")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: RenderOptionArgs,
}

#[derive(Parser, Debug)]
pub struct RetryArgs {
    /// Id of the recorded request to re-submit
    pub id: String,

    /// Where to write the PDF
    #[arg(long, short, default_value = "generated.pdf")]
    pub output: PathBuf,
}

/// Rendering options as CLI flags. Only flags the user actually passed end
/// up in the submitted option bag; the server owns all defaulting.
#[derive(Args, Debug, Default)]
pub struct RenderOptionArgs {
    /// Named paper size (Letter, Legal, A4, ...)
    #[arg(long)]
    pub format: Option<String>,

    /// Custom page width, e.g. "10cm" or "300px"
    #[arg(long)]
    pub width: Option<String>,

    /// Custom page height
    #[arg(long)]
    pub height: Option<String>,

    /// Render scale, 0.1 to 2.0
    #[arg(long)]
    pub scale: Option<f64>,

    #[arg(long, default_value_t = false)]
    pub landscape: bool,

    #[arg(long, default_value_t = false)]
    pub print_background: bool,

    /// Pages to include, e.g. "1-5,8"
    #[arg(long)]
    pub page_ranges: Option<String>,

    #[arg(long)]
    pub margin_top: Option<String>,

    #[arg(long)]
    pub margin_bottom: Option<String>,

    #[arg(long)]
    pub margin_left: Option<String>,

    #[arg(long)]
    pub margin_right: Option<String>,

    #[arg(long, default_value_t = false)]
    pub display_header_footer: bool,

    #[arg(long)]
    pub header_template: Option<String>,

    #[arg(long)]
    pub footer_template: Option<String>,

    /// Capture with a transparent background
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub omit_background: Option<bool>,

    /// Let CSS @page sizes win over the paper format
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub prefer_css_page_size: Option<bool>,

    /// Generate a document outline from headings
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub outline: Option<bool>,

    /// Produce an accessibility-tagged document (server default: on)
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub tagged: Option<bool>,

    /// Wait for web fonts before rendering (server default: on)
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub wait_for_fonts: Option<bool>,

    /// Render timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<i64>,
}

impl RenderOptionArgs {
    pub fn to_options(&self) -> RenderOptions {
        let margin = if self.margin_top.is_some()
            || self.margin_bottom.is_some()
            || self.margin_left.is_some()
            || self.margin_right.is_some()
        {
            Some(MarginOptions {
                top: self.margin_top.clone(),
                bottom: self.margin_bottom.clone(),
                left: self.margin_left.clone(),
                right: self.margin_right.clone(),
            })
        } else {
            None
        };

        RenderOptions {
            scale: self.scale,
            display_header_footer: self.display_header_footer.then_some(true),
            header_template: self.header_template.clone(),
            footer_template: self.footer_template.clone(),
            print_background: self.print_background.then_some(true),
            landscape: self.landscape.then_some(true),
            page_ranges: self.page_ranges.clone(),
            format: self.format.clone(),
            width: self.width.clone().map(Length::Text),
            height: self.height.clone().map(Length::Text),
            margin,
            omit_background: self.omit_background,
            prefer_css_page_size: self.prefer_css_page_size,
            outline: self.outline,
            tagged: self.tagged,
            wait_for_fonts: self.wait_for_fonts,
            timeout: self.timeout,
        }
    }
}
