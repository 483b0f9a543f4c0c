// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meteo latest` - Print the most recent measurement

use anyhow::Context;
use meteo_engine::MeasurementStore;

pub fn handle(store: &MeasurementStore) -> anyhow::Result<()> {
    let record = store.latest()?;
    let json = serde_json::to_string_pretty(&record).context("failed to encode measurement")?;
    println!("{}", json);
    Ok(())
}
