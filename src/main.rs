//! ssm: terminal client for the Steam server manager backend.
//!
//! Run with:  `RUST_LOG=info ssm watch`

mod cli;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use ssm_core::SsmError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging on stderr; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("ssm v{} starting", env!("CARGO_PKG_VERSION"));

    let args = cli::Args::parse();
    match commands::run(args).await {
        Err(e) if e.downcast_ref::<SsmError>().is_some_and(SsmError::is_unauthorized) => {
            eprintln!("{e}\nPlease log in first: ssm login --email <address>");
            std::process::exit(2);
        }
        other => other,
    }
}
