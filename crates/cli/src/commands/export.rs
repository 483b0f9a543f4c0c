// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meteo export` - Stream the full history to a file or stdout

use anyhow::Context;
use clap::Args;
use meteo_engine::{write_export, ExportRequest, MeasurementStore};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    /// Output format: csv or jsonl
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Earliest timestamp to include (ISO 8601)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest timestamp to include (ISO 8601)
    #[arg(long)]
    pub to: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn handle(args: ExportArgs, store: &MeasurementStore) -> anyhow::Result<()> {
    let request = ExportRequest::parse(
        Some(args.format.as_str()),
        args.from.as_deref(),
        args.to.as_deref(),
    )?;
    let stream = store.export(&request).await?;

    match args.output {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
            let bytes = write_export(stream, &mut file)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            file.sync_all().await?;
            info!(bytes, path = %path.display(), "export written");
            eprintln!("Exported {} bytes to {}", bytes, path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            write_export(stream, &mut stdout)
                .await
                .context("failed to write export")?;
        }
    }
    Ok(())
}
