//! Binary crate for the `weather-bot` Telegram webhook.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the webhook and one-shot invocations
//! - Interactive configuration

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

mod cli;
mod configure;
mod invoke;
mod server;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout is reserved for the `handle` acknowledgment.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
