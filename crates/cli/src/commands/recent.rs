// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meteo recent` - Print the in-memory window as JSON lines

use anyhow::Context;
use clap::Args;
use meteo_engine::{parse_limit, MeasurementStore};

#[derive(Args)]
pub struct RecentArgs {
    /// Only the newest N measurements
    #[arg(short = 'n', long)]
    pub limit: Option<String>,
}

pub fn handle(args: RecentArgs, store: &MeasurementStore) -> anyhow::Result<()> {
    let limit = args.limit.as_deref().map(parse_limit).transpose()?;
    for record in store.recent(limit)? {
        println!("{}", record.to_line().context("failed to encode measurement")?);
    }
    Ok(())
}
