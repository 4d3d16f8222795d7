//! stampa-cli: render HTML files to PDF through a stampa server, with a
//! persistent request history supporting audit and retry.

#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod io;
mod ledger;
mod lifecycle;
mod store;
#[cfg(test)]
mod tests;

use std::path::Path;

use clap::Parser;

use args::{Cli, Commands};
use client::{CliError, HttpTransport};
use ledger::RequestLedger;
use lifecycle::{LifecycleController, SubmitOutcome};
use store::FileStore;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ledger = RequestLedger::open(Box::new(FileStore::new(&cli.data_dir)));

    match cli.command {
        Commands::Generate(cmd) => {
            let controller = build_controller(cli.server.as_deref(), ledger)?;
            let html = io::read_html(&cmd.input).await?;
            let outcome = controller.submit(html, cmd.options.to_options()).await;
            finish(outcome, &cmd.output).await
        }
        Commands::Retry(cmd) => {
            let controller = build_controller(cli.server.as_deref(), ledger)?;
            let outcome = controller
                .retry(&cmd.id)
                .await
                .ok_or(CliError::UnknownRequest(cmd.id))?;
            finish(outcome, &cmd.output).await
        }
        Commands::History => {
            let controller = LifecycleController::detached(ledger);
            io::print_json(&controller.history())
        }
        Commands::Clear => {
            let controller = LifecycleController::detached(ledger);
            controller.clear();
            println!("request history cleared");
            Ok(())
        }
    }
}

fn build_controller(
    server: Option<&str>,
    ledger: RequestLedger,
) -> Result<LifecycleController, CliError> {
    let server = server.ok_or(CliError::MissingServer)?;
    let transport = HttpTransport::new(server)?;
    Ok(LifecycleController::new(ledger, Box::new(transport)))
}

async fn finish(outcome: SubmitOutcome, output: &Path) -> Result<(), CliError> {
    match outcome.result {
        Ok(bytes) => {
            io::write_pdf(output, &bytes).await?;
            println!(
                "request {}: wrote {} ({} bytes)",
                outcome.id,
                output.display(),
                bytes.len()
            );
            Ok(())
        }
        Err(err) => Err(CliError::Render {
            id: outcome.id,
            message: err.to_string(),
        }),
    }
}
