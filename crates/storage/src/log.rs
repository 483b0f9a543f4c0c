// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log of records, one JSON object per line
//!
//! The log is the complete history and the source of truth. Lines that do
//! not parse as a record (including a half-written final line after a
//! crash) are skipped. Replay counts them, scans pass over them, and neither
//! treats them as fatal.

use meteo_core::{Record, TimeRange};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};

/// Errors that can occur in log operations
#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("log file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("log appender is closed")]
    Closed,

    #[error("log appender task failed: {0}")]
    Task(String),
}

/// Counters from a full replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines that parsed as records
    pub valid: u64,
    /// Non-blank lines that did not parse
    pub ignored: u64,
    /// Highest id seen among valid records
    pub max_id: Option<u64>,
}

impl ReplayStats {
    /// Next id to assign after this replay.
    ///
    /// Uses the highest stored id rather than the number of valid lines, so
    /// a log with corrupt lines never causes an id to be handed out twice.
    pub fn next_id(&self) -> u64 {
        self.max_id.unwrap_or(0).max(self.valid) + 1
    }
}

/// Every valid record plus replay counters
#[derive(Debug, Default)]
pub struct LoadedLog {
    pub records: Vec<Record>,
    pub stats: ReplayStats,
}

/// Handle to the log file at a fixed path
#[derive(Debug, Clone)]
pub struct DurableLog {
    path: PathBuf,
}

impl DurableLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the directory holding the log if it does not exist yet
    pub fn ensure_parent(&self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!(dir = %parent.display(), "created data directory");
            }
        }
        Ok(())
    }

    /// Read the whole log front to back, handing each valid record to
    /// `visit` in log order.
    ///
    /// A missing file replays as empty. Only one line is held in memory at
    /// a time.
    pub fn replay(&self, mut visit: impl FnMut(Record)) -> Result<ReplayStats, LogError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no previous log, starting empty");
                return Ok(ReplayStats::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_number = 0u64;
        let mut stats = ReplayStats::default();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let line = trim_line(&buf);
            if line.is_empty() {
                continue;
            }

            match Record::from_line(line) {
                Ok(record) => {
                    stats.valid += 1;
                    stats.max_id = stats.max_id.max(Some(record.id));
                    visit(record);
                }
                Err(e) => {
                    stats.ignored += 1;
                    warn!(line = line_number, error = %e, "invalid line in log, ignoring");
                }
            }
        }

        Ok(stats)
    }

    /// Replay into memory. Intended for small logs and tooling; the store
    /// itself replays straight into its bounded window.
    pub fn load(&self) -> Result<LoadedLog, LogError> {
        let mut records = Vec::new();
        let stats = self.replay(|record| records.push(record))?;
        Ok(LoadedLog { records, stats })
    }

    /// Open a sequential scan of the log restricted to `range`.
    ///
    /// Fails with [`LogError::NotFound`] when the log has never been
    /// written.
    pub async fn open_scan(&self, range: TimeRange) -> Result<LogScan, LogError> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LogError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(LogScan {
            reader: tokio::io::BufReader::new(file),
            buf: Vec::new(),
            range,
            line_number: 0,
            matched: 0,
            skipped: 0,
        })
    }

    /// Scan the log, calling `emit` for every valid record inside `range`
    pub async fn scan(
        &self,
        range: TimeRange,
        mut emit: impl FnMut(Record),
    ) -> Result<ScanStats, LogError> {
        let mut scan = self.open_scan(range).await?;
        while let Some(record) = scan.next_record().await? {
            emit(record);
        }
        Ok(scan.stats())
    }
}

/// Counters from a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub matched: u64,
    pub skipped: u64,
}

/// In-progress sequential read of the log.
///
/// Dropping the scan closes the file.
pub struct LogScan {
    reader: tokio::io::BufReader<tokio::fs::File>,
    buf: Vec<u8>,
    range: TimeRange,
    line_number: u64,
    matched: u64,
    skipped: u64,
}

impl LogScan {
    /// Next valid record inside the range, or `None` at end of file
    pub async fn next_record(&mut self) -> Result<Option<Record>, LogError> {
        Ok(self.next_entry().await?.map(|(record, _)| record))
    }

    /// Like [`next_record`](Self::next_record), also returning the line
    /// exactly as stored (trimmed, without the newline)
    pub async fn next_entry(&mut self) -> Result<Option<(Record, Vec<u8>)>, LogError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = trim_line(&self.buf);
            if line.is_empty() {
                continue;
            }

            match Record::from_line(line) {
                Ok(record) if self.range.admits(&record.timestamp) => {
                    self.matched += 1;
                    return Ok(Some((record, line.to_vec())));
                }
                Ok(_) => {}
                Err(e) => {
                    self.skipped += 1;
                    debug!(line = self.line_number, error = %e, "invalid line in log during scan, ignoring");
                }
            }
        }
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats {
            matched: self.matched,
            skipped: self.skipped,
        }
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
