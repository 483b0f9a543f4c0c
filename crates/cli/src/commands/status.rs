// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meteo status` - Summarize the log

use meteo_engine::{MeasurementStore, StoreStatus};
use meteo_storage::ReplayStats;
use std::fmt::Write;
use std::path::Path;

pub fn handle(store: &MeasurementStore) -> anyhow::Result<()> {
    print!(
        "{}",
        render(store.log().path(), &store.status(), store.replay_stats())
    );
    Ok(())
}

fn render(path: &Path, status: &StoreStatus, replay: ReplayStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Data file:    {}", path.display());
    let _ = writeln!(out, "Measurements: {}", status.total_count);
    if replay.ignored > 0 {
        let _ = writeln!(out, "Ignored:      {} unreadable lines", replay.ignored);
    }
    let _ = writeln!(
        out,
        "In memory:    {} / {}",
        status.cache_size, status.cache_capacity
    );
    match &status.latest {
        Some(record) => {
            let _ = writeln!(out, "Latest:       #{} at {}", record.id, record.timestamp);
        }
        None => {
            let _ = writeln!(out, "Latest:       none");
        }
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
