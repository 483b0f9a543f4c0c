// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::Map;
use yare::parameterized;

fn record(id: u64) -> Record {
    let at = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
    Record::new(id, at, Map::new())
}

fn filled(capacity: usize, count: u64) -> BoundedCache {
    let mut cache = BoundedCache::new(capacity);
    for id in 1..=count {
        cache.insert(record(id));
    }
    cache
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn empty_cache_has_no_latest() {
    let cache = BoundedCache::new(3);
    assert!(cache.is_empty());
    assert!(cache.latest().is_none());
    assert!(cache.last_n(5).is_empty());
    assert_eq!(cache.capacity(), 3);
}

#[test]
fn zero_capacity_is_raised_to_one() {
    let cache = filled(0, 4);
    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.latest().map(|r| r.id), Some(4));
}

#[test]
fn evicts_oldest_first() {
    let cache = filled(3, 5);

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.oldest().map(|r| r.id), Some(3));
    assert_eq!(cache.latest().map(|r| r.id), Some(5));
    assert_eq!(ids(&cache.to_vec()), [3, 4, 5]);
}

#[parameterized(
    fewer_than_held = { 2, &[4, 5] },
    exactly_held = { 3, &[3, 4, 5] },
    more_than_held = { 10, &[3, 4, 5] },
    single = { 1, &[5] },
    zero = { 0, &[] },
)]
fn last_n_is_oldest_first(n: usize, expected: &[u64]) {
    let cache = filled(3, 5);
    assert_eq!(ids(&cache.last_n(n)), expected);
}

proptest! {
    #[test]
    fn window_tracks_the_tail(capacity in 1usize..20, extra in 1u64..50) {
        let total = capacity as u64 + extra;
        let cache = filled(capacity, total);

        prop_assert_eq!(cache.len(), capacity);
        // oldest held record is the (extra + 1)-th inserted
        prop_assert_eq!(cache.oldest().map(|r| r.id), Some(extra + 1));
        prop_assert_eq!(cache.latest().map(|r| r.id), Some(total));
        let held: Vec<u64> = cache.iter().map(|r| r.id).collect();
        let expected: Vec<u64> = (extra + 1..=total).collect();
        prop_assert_eq!(held, expected);
    }
}
