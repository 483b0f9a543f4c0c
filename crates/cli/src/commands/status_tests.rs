// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use meteo_core::Record;
use serde_json::Map;

fn status(latest: Option<Record>) -> StoreStatus {
    StoreStatus {
        total_count: if latest.is_some() { 3 } else { 0 },
        cache_size: if latest.is_some() { 2 } else { 0 },
        cache_capacity: 2,
        latest,
    }
}

#[test]
fn empty_log() {
    let text = render(
        Path::new("data/mediciones.jsonl"),
        &status(None),
        ReplayStats::default(),
    );

    assert_eq!(
        text,
        "Data file:    data/mediciones.jsonl\n\
         Measurements: 0\n\
         In memory:    0 / 2\n\
         Latest:       none\n"
    );
}

#[test]
fn shows_latest_and_ignored_lines() {
    let at = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
    let replay = ReplayStats {
        valid: 3,
        ignored: 1,
        max_id: Some(3),
    };

    let text = render(
        Path::new("log.jsonl"),
        &status(Some(Record::new(3, at, Map::new()))),
        replay,
    );

    assert!(text.contains("Measurements: 3\n"));
    assert!(text.contains("Ignored:      1 unreadable lines\n"));
    assert!(text.contains("In memory:    2 / 2\n"));
    assert!(text.contains("Latest:       #3 at 2026-02-10T12:00:00.000Z\n"));
}
