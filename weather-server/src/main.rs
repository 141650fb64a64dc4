//! Binary crate for the `cep-weather` service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - The HTTP surface over `weather-core`

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for `lookup` output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
