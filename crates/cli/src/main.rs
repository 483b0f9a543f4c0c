// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! meteo - Weather station measurement CLI
//!
//! Works directly on the JSONL log, so it runs with or without the daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{export, ingest, latest, recent, status};
use meteo_core::SystemClock;
use meteo_engine::{Durability, MeasurementStore, StoreConfig, DEFAULT_CACHE_CAPACITY};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "meteo",
    version,
    about = "Weather station measurements - inspect, ingest and export the log"
)]
struct Cli {
    /// Path to the JSONL measurement log
    #[arg(
        long,
        global = true,
        env = "METEO_DATA_FILE",
        default_value = "data/mediciones.jsonl"
    )]
    data: PathBuf,

    /// Size of the in-memory window
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_CAPACITY)]
    capacity: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals and the latest measurement
    Status,
    /// Print the latest measurement
    Latest,
    /// Print recent measurements, oldest first
    Recent(recent::RecentArgs),
    /// Validate and append one measurement
    Ingest(ingest::IngestArgs),
    /// Export the full history as CSV or JSONL
    Export(export::ExportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    if cli.capacity == 0 {
        anyhow::bail!("--capacity must be at least 1");
    }

    let config = StoreConfig::new(cli.data.clone())
        .with_capacity(cli.capacity)
        .with_durability(Durability::Sync);
    let store = MeasurementStore::open(&config, SystemClock)
        .await
        .with_context(|| format!("failed to open {}", cli.data.display()))?;

    let result = match cli.command {
        Commands::Status => status::handle(&store),
        Commands::Latest => latest::handle(&store),
        Commands::Recent(args) => recent::handle(args, &store),
        Commands::Ingest(args) => ingest::handle(args, &store).await,
        Commands::Export(args) => export::handle(args, &store).await,
    };

    store.close().await.context("failed to flush the log")?;
    result
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
