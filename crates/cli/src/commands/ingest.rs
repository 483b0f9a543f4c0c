// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meteo ingest` - Validate and append one measurement

use anyhow::Context;
use clap::Args;
use meteo_engine::MeasurementStore;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Args)]
pub struct IngestArgs {
    /// Measurement as a JSON object (read from stdin when omitted)
    pub payload: Option<String>,
}

pub async fn handle(args: IngestArgs, store: &MeasurementStore) -> anyhow::Result<()> {
    let payload = read_payload(args.payload, tokio::io::stdin()).await?;
    let record = store.ingest(payload).await?;
    println!("{}", record.to_line().context("failed to encode measurement")?);
    Ok(())
}

async fn read_payload<R>(arg: Option<String>, mut stdin: R) -> anyhow::Result<Value>
where
    R: AsyncRead + Unpin,
{
    let text = match arg {
        Some(text) => text,
        None => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .await
                .context("failed to read payload from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
