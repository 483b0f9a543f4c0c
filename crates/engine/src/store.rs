// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Measurement store: ingestion and recent-window queries
//!
//! One `MeasurementStore` is built per process. It owns the bounded window,
//! the counters and the log appender, and is the only thing that creates
//! records. Mutation happens under a single short-lived lock that is never
//! held across an await.
//!
//! ## Durability
//!
//! - [`Durability::Sync`] (default): `ingest` returns only after the record's
//!   line is written and synced.
//! - [`Durability::Deferred`]: `ingest` returns once memory is updated and
//!   the append is queued. A crash before the queued write completes loses
//!   records the caller was told were stored.
//!
//! In both modes the appender writes lines in id order.

use crate::export::{self, ExportError, ExportRequest, ExportStream};
use meteo_core::{validate_payload, BoundedCache, Clock, IngestError, Record, SystemClock};
use meteo_storage::{AppendStats, DurableLog, LogAppender, LogError, ReplayStats};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{error, info};

/// Records kept in memory unless configured otherwise
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// When an ingestion is acknowledged relative to its log write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Durability {
    /// Acknowledge after the line is written and synced
    #[default]
    Sync,
    /// Acknowledge once memory is updated; the write happens in the background
    Deferred,
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Durability::Sync => write!(f, "sync"),
            Durability::Deferred => write!(f, "deferred"),
        }
    }
}

impl FromStr for Durability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(Durability::Sync),
            "deferred" => Ok(Durability::Deferred),
            other => Err(format!("unknown durability {other:?}, expected sync or deferred")),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the append-only log
    pub data_file: PathBuf,
    /// Size of the in-memory window
    pub cache_capacity: usize,
    pub durability: Durability,
}

impl StoreConfig {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            durability: Durability::default(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("log error: {0}")]
    Log(#[from] LogError),
}

/// Failures of the read-only queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("the \"limit\" parameter must be a positive integer")]
    InvalidLimit,

    #[error("no measurements stored yet")]
    NotFound,
}

/// Parse a textual `limit` parameter as a positive base-10 integer
pub fn parse_limit(raw: &str) -> Result<i64, QueryError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QueryError::InvalidLimit),
    }
}

/// Snapshot for status reporting
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatus {
    /// Valid records in the log plus records ingested since startup
    pub total_count: u64,
    pub latest: Option<Record>,
    pub cache_size: usize,
    pub cache_capacity: usize,
}

struct StoreState {
    cache: BoundedCache,
    total_count: u64,
    next_id: u64,
}

/// The measurement store
pub struct MeasurementStore<C: Clock = SystemClock> {
    log: DurableLog,
    appender: LogAppender,
    state: Mutex<StoreState>,
    clock: C,
    durability: Durability,
    replay: ReplayStats,
}

impl<C: Clock> MeasurementStore<C> {
    /// Open the store, rebuilding counters and the window from the log.
    ///
    /// The replay runs on the blocking pool. Starts the background
    /// appender, so this must run inside a tokio runtime.
    pub async fn open(config: &StoreConfig, clock: C) -> Result<Self, StoreError> {
        let log = DurableLog::new(config.data_file.clone());
        log.ensure_parent()?;

        // Replay is plain blocking file I/O
        let replay_log = log.clone();
        let capacity = config.cache_capacity;
        let (cache, replay) = tokio::task::spawn_blocking(move || {
            let mut cache = BoundedCache::new(capacity);
            let replay = replay_log.replay(|record| cache.insert(record))?;
            Ok::<_, LogError>((cache, replay))
        })
        .await
        .map_err(|e| LogError::Task(e.to_string()))??;

        info!(
            path = %log.path().display(),
            valid = replay.valid,
            ignored = replay.ignored,
            max_id = ?replay.max_id,
            in_memory = cache.len(),
            "loaded measurements from log"
        );

        let appender = LogAppender::spawn(&log);

        Ok(Self {
            state: Mutex::new(StoreState {
                cache,
                total_count: replay.valid,
                next_id: replay.next_id(),
            }),
            log,
            appender,
            clock,
            durability: config.durability,
            replay,
        })
    }

    /// Validate and store one payload.
    ///
    /// Assigns the next id and the current UTC time, updates the counters
    /// and the window, then hands the record to the appender. Returns the
    /// stored record.
    pub async fn ingest(&self, payload: Value) -> Result<Record, StoreError> {
        let fields = validate_payload(payload)?;
        let sync = self.durability == Durability::Sync;

        let (record, pending) = {
            let mut state = self.lock();
            let record = Record::new(state.next_id, self.clock.now(), fields);
            state.next_id += 1;
            state.total_count += 1;
            state.cache.insert(record.clone());
            // Submitted under the lock so log order matches id order
            let pending = self.appender.submit(&record, sync);
            (record, pending)
        };

        info!(id = record.id, timestamp = %record.timestamp, "measurement received");

        if sync {
            let written = match pending {
                Ok(pending) => pending.wait().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                error!(id = record.id, error = %e, "measurement kept in memory but not persisted");
                return Err(e.into());
            }
        } else if let Err(e) = pending {
            error!(id = record.id, error = %e, "measurement kept in memory but not queued for the log");
        }

        Ok(record)
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.lock();
        StoreStatus {
            total_count: state.total_count,
            latest: state.cache.latest().cloned(),
            cache_size: state.cache.len(),
            cache_capacity: state.cache.capacity(),
        }
    }

    /// The most recent record
    pub fn latest(&self) -> Result<Record, QueryError> {
        self.lock().cache.latest().cloned().ok_or(QueryError::NotFound)
    }

    /// Up to `limit` most recent records, oldest first; the whole window
    /// when `limit` is absent
    pub fn recent(&self, limit: Option<i64>) -> Result<Vec<Record>, QueryError> {
        let state = self.lock();
        match limit {
            None => Ok(state.cache.to_vec()),
            Some(n) if n > 0 => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                Ok(state.cache.last_n(n))
            }
            Some(_) => Err(QueryError::InvalidLimit),
        }
    }

    /// Stream the full history restricted to the request's range
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportStream, ExportError> {
        export::export(&self.log, request).await
    }

    pub fn log(&self) -> &DurableLog {
        &self.log
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    /// Counters from the startup replay
    pub fn replay_stats(&self) -> ReplayStats {
        self.replay
    }

    /// Flush and stop the appender. Later ingestions fail in sync mode and
    /// are memory-only in deferred mode.
    pub async fn close(&self) -> Result<AppendStats, StoreError> {
        let stats = self.appender.close().await?;
        info!(written = stats.written, failed = stats.failed, "log appender closed");
        Ok(stats)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
