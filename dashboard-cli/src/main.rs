//! Binary crate for the `weather-dash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts (backend setup, city search, insight questions)
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cmd = cli::Cli::parse();
    cmd.run().await
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
