//! fieldnotes-cli: the admin console on the command line.
//! Local edits land in the draft file; commits go through the relay and
//! refresh the local index copy only when the relay accepts them.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;
#[cfg(test)]
mod tests;

use clap::Parser;
use fieldnotes::config::{LogFormat, LoggingSettings};
use fieldnotes::infra::telemetry;
use tracing::level_filters::LevelFilter;

use args::{Cli, Commands};
use client::CliError;
use handlers::{assets, documents, index, list};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    telemetry::init_for_cli(&LoggingSettings {
        level: LevelFilter::WARN,
        format: LogFormat::Compact,
    })?;

    match cli.command {
        Commands::Draft(ref cmd) => documents::handle(&cli, cmd.action.clone())?,
        Commands::Commit => documents::commit(&cli).await?,
        Commands::Upload(ref cmd) => assets::handle(&cli, cmd.action.clone()).await?,
        Commands::Themes(ref cmd) => index::themes(&cli, cmd.action.clone()).await?,
        Commands::Speculative(ref cmd) => index::speculative(&cli, cmd.action.clone()).await?,
        Commands::Profile(ref cmd) => index::profile(&cli, cmd.action.clone()).await?,
        Commands::List { ref theme, public } => list::handle(&cli, theme.as_deref(), public)?,
    }

    Ok(())
}
