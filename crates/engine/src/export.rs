// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streamed export of the full history
//!
//! An export re-reads the log from the start and yields one chunk per
//! matching record, so memory use does not grow with the log. The file is
//! opened and the first match read before the stream is returned: a missing
//! log or an early read failure is reported as an error up front, while a
//! read failure later on simply ends the stream with an error item. Dropping
//! the stream closes the file.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use meteo_core::{csv, RangeError, Record, TimeRange};
use meteo_storage::{DurableLog, LogError, LogScan};
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Output encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    /// One JSON object per line, as stored
    Jsonl,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Jsonl => "application/x-ndjson",
        }
    }

    /// Suggested download name
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "mediciones.csv",
            ExportFormat::Jsonl => "mediciones.jsonl",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "jsonl" => Ok(ExportFormat::Jsonl),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported format {0:?}: use format=csv or format=jsonl")]
    UnsupportedFormat(String),

    #[error(transparent)]
    InvalidDate(#[from] RangeError),

    #[error("no data file to export")]
    NoData,

    #[error("IO error while exporting: {0}")]
    Io(#[from] io::Error),

    #[error("log error: {0}")]
    Log(LogError),
}

impl From<LogError> for ExportError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::NotFound(_) => ExportError::NoData,
            LogError::Io(e) => ExportError::Io(e),
            other => ExportError::Log(other),
        }
    }
}

/// A validated export request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub range: TimeRange,
}

impl ExportRequest {
    /// Validate raw parameters: format first (absent or empty means CSV),
    /// then `from`, then `to`.
    pub fn parse(
        format: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, ExportError> {
        let format = match format.filter(|f| !f.trim().is_empty()) {
            Some(raw) => raw.parse()?,
            None => ExportFormat::default(),
        };
        let range = TimeRange::parse(from, to)?;
        Ok(Self { format, range })
    }
}

/// Byte chunks of an export, one row per chunk
pub type ExportStream = BoxStream<'static, io::Result<Bytes>>;

struct ExportState {
    scan: LogScan,
    format: ExportFormat,
    header: Option<String>,
    /// First match, read before the stream was handed out
    first: Option<(Record, Vec<u8>)>,
    rows: u64,
    finished: bool,
}

/// Open the log and start streaming the records that match `request`.
///
/// The first matching row is read here, so a log that cannot be read at all
/// fails before any output is produced.
pub async fn export(log: &DurableLog, request: &ExportRequest) -> Result<ExportStream, ExportError> {
    let mut scan = log.open_scan(request.range).await?;
    let first = scan.next_entry().await?;

    let header = match request.format {
        ExportFormat::Csv => Some(csv::header_line()),
        ExportFormat::Jsonl => None,
    };

    debug!(format = %request.format, range = ?request.range, "export started");

    let state = ExportState {
        scan,
        format: request.format,
        header,
        finished: first.is_none(),
        first,
        rows: 0,
    };

    Ok(stream::unfold(state, next_chunk).boxed())
}

async fn next_chunk(mut state: ExportState) -> Option<(io::Result<Bytes>, ExportState)> {
    if let Some(header) = state.header.take() {
        return Some((Ok(Bytes::from(header)), state));
    }
    if state.finished {
        return None;
    }

    let next = match state.first.take() {
        Some(entry) => Ok(Some(entry)),
        None => state.scan.next_entry().await,
    };

    match next {
        Ok(Some((record, line))) => {
            state.rows += 1;
            let chunk = render(state.format, &record, line);
            Some((Ok(chunk), state))
        }
        Ok(None) => {
            let stats = state.scan.stats();
            debug!(rows = state.rows, skipped = stats.skipped, "export finished");
            None
        }
        Err(e) => {
            warn!(rows = state.rows, error = %e, "export aborted while reading log");
            state.finished = true;
            Some((Err(into_io(e)), state))
        }
    }
}

/// CSV projects the record; JSONL passes the stored line through untouched
fn render(format: ExportFormat, record: &Record, mut line: Vec<u8>) -> Bytes {
    match format {
        ExportFormat::Csv => Bytes::from(csv::record_line(record)),
        ExportFormat::Jsonl => {
            line.push(b'\n');
            Bytes::from(line)
        }
    }
}

fn into_io(e: LogError) -> io::Error {
    match e {
        LogError::Io(e) => e,
        other => io::Error::other(other),
    }
}

/// Drain an export into `writer`, returning the number of bytes written
pub async fn write_export<W>(mut stream: ExportStream, writer: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
