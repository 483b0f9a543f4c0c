// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Duration, TimeZone, Utc};
use meteo_core::FakeClock;
use serde_json::json;
use tempfile::TempDir;
use yare::parameterized;

fn reading() -> Value {
    json!({
        "temperatura_aire_celsius": 21.5,
        "humedad_aire_porcentaje": 40,
        "presion_atmosferica_hPa": 1012,
        "concentracion_CO2_ppm": 410,
    })
}

fn clock() -> FakeClock {
    FakeClock::at(Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap())
}

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig::new(dir.path().join("data/mediciones.jsonl"))
}

async fn open(dir: &TempDir, capacity: usize) -> MeasurementStore<FakeClock> {
    MeasurementStore::open(&config(dir).with_capacity(capacity), clock())
        .await
        .unwrap()
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn first_ingest_gets_id_one_and_server_timestamp() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;

    let first = store.ingest(reading()).await.unwrap();
    let second = store.ingest(reading()).await.unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(first.timestamp, "2026-02-10T12:00:00.000Z");
    assert_eq!(first.fields, reading().as_object().cloned().unwrap());
    assert_eq!(second.id, 2);
}

#[tokio::test]
async fn ids_have_no_gaps() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 5).await;

    let mut seen = Vec::new();
    for _ in 0..20 {
        seen.push(store.ingest(reading()).await.unwrap().id);
    }

    assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    assert_eq!(store.status().total_count, 20);
}

#[tokio::test]
async fn ids_stay_monotonic_when_clock_goes_backwards() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let store = MeasurementStore::open(&config(&dir), clock.clone()).await.unwrap();

    let a = store.ingest(reading()).await.unwrap();
    clock.advance(Duration::hours(-2));
    let b = store.ingest(reading()).await.unwrap();

    assert!(b.id > a.id);
    assert!(b.timestamp < a.timestamp);
}

#[tokio::test]
async fn caller_cannot_choose_id_or_timestamp() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;
    let mut payload = reading();
    payload["id"] = json!(500);
    payload["timestamp"] = json!("2000-01-01T00:00:00Z");

    let record = store.ingest(payload).await.unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.timestamp, "2026-02-10T12:00:00.000Z");
}

#[tokio::test]
async fn rejected_payloads_change_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;

    let missing = store
        .ingest(json!({ "temperatura_aire_celsius": 20 }))
        .await
        .unwrap_err();
    let not_object = store.ingest(json!([reading()])).await.unwrap_err();

    assert!(matches!(
        missing,
        StoreError::Ingest(IngestError::MissingFields { ref fields }) if fields.len() == 3
    ));
    assert!(matches!(not_object, StoreError::Ingest(IngestError::NotAnObject)));
    let status = store.status();
    assert_eq!(status.total_count, 0);
    assert_eq!(status.cache_size, 0);
    assert_eq!(store.ingest(reading()).await.unwrap().id, 1);
}

#[tokio::test]
async fn window_keeps_the_most_recent_records() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 3).await;

    for _ in 0..5 {
        store.ingest(reading()).await.unwrap();
    }

    let status = store.status();
    assert_eq!(status.cache_size, 3);
    assert_eq!(status.cache_capacity, 3);
    assert_eq!(status.total_count, 5);
    assert_eq!(status.latest.map(|r| r.id), Some(5));
    assert_eq!(ids(&store.recent(None).unwrap()), [3, 4, 5]);
}

#[tokio::test]
async fn latest_on_empty_store_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 3).await;

    assert_eq!(store.latest(), Err(QueryError::NotFound));

    store.ingest(reading()).await.unwrap();
    assert_eq!(store.latest().map(|r| r.id), Ok(1));
}

#[tokio::test]
async fn recent_without_limit_on_empty_store_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 3).await;

    assert_eq!(store.recent(None), Ok(Vec::new()));
}

#[tokio::test]
async fn recent_rejects_non_positive_limits() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 3).await;

    assert_eq!(store.recent(Some(0)), Err(QueryError::InvalidLimit));
    assert_eq!(store.recent(Some(-1)), Err(QueryError::InvalidLimit));
}

#[tokio::test]
async fn recent_limit_returns_tail_oldest_first() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;
    for _ in 0..4 {
        store.ingest(reading()).await.unwrap();
    }

    assert_eq!(ids(&store.recent(Some(2)).unwrap()), [3, 4]);
    assert_eq!(ids(&store.recent(Some(100)).unwrap()), [1, 2, 3, 4]);
}

#[parameterized(
    one = { "1", Ok(1) },
    padded = { " 60 ", Ok(60) },
    zero = { "0", Err(QueryError::InvalidLimit) },
    negative = { "-1", Err(QueryError::InvalidLimit) },
    word = { "ten", Err(QueryError::InvalidLimit) },
    float = { "2.5", Err(QueryError::InvalidLimit) },
    empty = { "", Err(QueryError::InvalidLimit) },
)]
fn limit_parsing(raw: &str, expected: Result<i64, QueryError>) {
    assert_eq!(parse_limit(raw), expected);
}

#[tokio::test]
async fn reopen_restores_counters_and_window() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir, 2).await;
        for _ in 0..3 {
            store.ingest(reading()).await.unwrap();
        }
        store.close().await.unwrap();
    }

    let store = open(&dir, 2).await;

    let status = store.status();
    assert_eq!(status.total_count, 3);
    assert_eq!(status.cache_size, 2);
    assert_eq!(status.latest.map(|r| r.id), Some(3));
    assert_eq!(store.ingest(reading()).await.unwrap().id, 4);
}

#[tokio::test]
async fn reopen_counts_only_valid_lines() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir, 10).await;
        for _ in 0..3 {
            store.ingest(reading()).await.unwrap();
        }
        store.close().await.unwrap();
    }
    let path = dir.path().join("data/mediciones.jsonl");
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{broken\nnot json either\n");
    std::fs::write(&path, content).unwrap();

    let store = open(&dir, 10).await;

    assert_eq!(store.status().total_count, 3);
    assert_eq!(store.replay_stats().ignored, 2);
    assert_eq!(ids(&store.recent(None).unwrap()), [1, 2, 3]);
}

#[tokio::test]
async fn acknowledged_record_survives_truncated_tail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data/mediciones.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        concat!(
            r#"{"id":1,"timestamp":"2026-02-10T10:00:00.000Z"}"#,
            "\n",
            r#"{"id":2,"timest"#,
        ),
    )
    .unwrap();

    let store = open(&dir, 10).await;
    let stored = store.ingest(reading()).await.unwrap();
    store.close().await.unwrap();
    assert_eq!(stored.id, 2);

    let store = open(&dir, 10).await;

    assert_eq!(ids(&store.recent(None).unwrap()), [1, 2]);
    assert_eq!(store.replay_stats().ignored, 1);
    assert_eq!(store.latest().unwrap(), stored);
}

#[tokio::test(flavor = "current_thread")]
async fn replay_does_not_stall_the_runtime() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data/mediciones.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut content = String::new();
    for id in 1..=20_000u64 {
        let at = clock().now() + Duration::seconds(id as i64);
        content.push_str(&Record::new(id, at, reading().as_object().cloned().unwrap()).to_line().unwrap());
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();

    let ticked = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = std::sync::Arc::clone(&ticked);
    tokio::spawn(async move { flag.store(true, std::sync::atomic::Ordering::SeqCst) });

    let store = open(&dir, 10).await;

    assert!(ticked.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(store.status().total_count, 20_000);
    assert_eq!(ids(&store.recent(Some(2)).unwrap()), [19_999, 20_000]);
}

#[tokio::test]
async fn reopen_continues_after_highest_stored_id() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data/mediciones.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        concat!(
            r#"{"id":1,"timestamp":"2026-02-10T10:00:00.000Z"}"#,
            "\n{garbage\n{garbage\n",
            r#"{"id":7,"timestamp":"2026-02-10T11:00:00.000Z"}"#,
            "\n",
        ),
    )
    .unwrap();

    let store = open(&dir, 10).await;

    assert_eq!(store.status().total_count, 2);
    assert_eq!(store.ingest(reading()).await.unwrap().id, 8);
}

#[tokio::test]
async fn deferred_ingest_is_persisted_by_close() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir)
        .with_capacity(10)
        .with_durability(Durability::Deferred);
    let store = MeasurementStore::open(&config, clock()).await.unwrap();

    for _ in 0..5 {
        store.ingest(reading()).await.unwrap();
    }
    let stats = store.close().await.unwrap();

    assert_eq!(stats.written, 5);
    let loaded = store.log().load().unwrap();
    assert_eq!(ids(&loaded.records), [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn sync_ingest_is_on_disk_when_acknowledged() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;

    let record = store.ingest(reading()).await.unwrap();

    assert_eq!(store.log().load().unwrap().records, vec![record]);
}

#[tokio::test]
async fn sync_ingest_reports_write_failure_but_keeps_record_in_memory() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, 10).await;
    std::fs::remove_dir_all(dir.path().join("data")).unwrap();

    let err = store.ingest(reading()).await.unwrap_err();

    assert!(matches!(err, StoreError::Log(LogError::Io(_))));
    assert_eq!(store.latest().map(|r| r.id), Ok(1));
}

#[tokio::test]
async fn deferred_ingest_after_close_stays_in_memory() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_durability(Durability::Deferred);
    let store = MeasurementStore::open(&config, clock()).await.unwrap();
    store.close().await.unwrap();

    let record = store.ingest(reading()).await.unwrap();

    assert_eq!(record.id, 1);
    assert!(!store.log().exists());
}

#[test]
fn durability_parses_case_insensitively() {
    assert_eq!("SYNC".parse::<Durability>(), Ok(Durability::Sync));
    assert_eq!("deferred".parse::<Durability>(), Ok(Durability::Deferred));
    assert!("eventually".parse::<Durability>().is_err());
    assert_eq!(Durability::Deferred.to_string(), "deferred");
}
