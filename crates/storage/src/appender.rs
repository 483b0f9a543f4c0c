// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered background writer for log appends
//!
//! All appends go through one task that owns the file handle, so lines land
//! in the order they were submitted. Submitting never blocks: callers get a
//! [`PendingAppend`] they may await for the write result or simply drop.

use crate::log::{DurableLog, LogError};
use meteo_core::Record;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

struct AppendRequest {
    id: u64,
    line: String,
    sync: bool,
    ack: oneshot::Sender<io::Result<()>>,
}

/// Totals reported when the appender shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendStats {
    pub written: u64,
    pub failed: u64,
}

/// Outcome of a queued append
pub struct PendingAppend {
    id: u64,
    rx: oneshot::Receiver<io::Result<()>>,
}

impl PendingAppend {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait until the line has been written (and synced, if requested)
    pub async fn wait(self) -> Result<(), LogError> {
        match self.rx.await {
            Ok(result) => result.map_err(LogError::from),
            Err(_) => Err(LogError::Closed),
        }
    }
}

/// Handle to the background append task
pub struct LogAppender {
    tx: Mutex<Option<mpsc::UnboundedSender<AppendRequest>>>,
    task: Mutex<Option<JoinHandle<AppendStats>>>,
}

impl LogAppender {
    /// Start the writer task. Must be called from within a tokio runtime.
    pub fn spawn(log: &DurableLog) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(log.path().to_path_buf(), rx));
        Self {
            tx: Mutex::new(Some(tx)),
            task: Mutex::new(Some(task)),
        }
    }

    /// Queue a record for appending.
    ///
    /// With `sync` set the writer calls `sync_data` after the write, so a
    /// successful [`PendingAppend::wait`] means the line is on disk.
    pub fn submit(&self, record: &Record, sync: bool) -> Result<PendingAppend, LogError> {
        let mut line = record.to_line()?;
        line.push('\n');

        let (ack, rx) = oneshot::channel();
        let request = AppendRequest {
            id: record.id,
            line,
            sync,
            ack,
        };

        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        tx.as_ref()
            .ok_or(LogError::Closed)?
            .send(request)
            .map_err(|_| LogError::Closed)?;

        Ok(PendingAppend { id: record.id, rx })
    }

    /// Stop accepting appends and wait for every queued line to be written
    pub async fn close(&self) -> Result<AppendStats, LogError> {
        drop(self.tx.lock().unwrap_or_else(|e| e.into_inner()).take());

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        match task {
            Some(handle) => handle.await.map_err(|e| LogError::Task(e.to_string())),
            None => Ok(AppendStats::default()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).is_none()
    }
}

async fn run(path: PathBuf, mut rx: mpsc::UnboundedReceiver<AppendRequest>) -> AppendStats {
    let mut file: Option<File> = None;
    let mut stats = AppendStats::default();

    while let Some(request) = rx.recv().await {
        let result = write_line(&path, &mut file, &request.line, request.sync).await;
        match &result {
            Ok(()) => {
                stats.written += 1;
                debug!(id = request.id, "record appended to log");
            }
            Err(e) => {
                stats.failed += 1;
                error!(id = request.id, path = %path.display(), error = %e, "failed to append record to log");
                // Reopen on the next request
                file = None;
            }
        }
        // Receiver gone means the caller chose not to wait
        let _ = request.ack.send(result);
    }

    if let Some(file) = file {
        if let Err(e) = file.sync_all().await {
            warn!(path = %path.display(), error = %e, "failed to sync log on close");
        }
    }

    stats
}

async fn write_line(path: &Path, file: &mut Option<File>, line: &str, sync: bool) -> io::Result<()> {
    if file.is_none() {
        *file = Some(open_for_append(path).await?);
    }
    let Some(f) = file.as_mut() else {
        return Err(io::Error::other("log file unavailable"));
    };

    f.write_all(line.as_bytes()).await?;
    f.flush().await?;
    if sync {
        f.sync_data().await?;
    }
    Ok(())
}

/// Open the log for appending. A partial final line (crash, or a write that
/// failed halfway) is closed off with a newline so the next record starts on
/// a line of its own.
async fn open_for_append(path: &Path) -> io::Result<File> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await?;

    if file.metadata().await?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).await?;
        file.read_exact(&mut last).await?;
        if last[0] != b'\n' {
            warn!(path = %path.display(), "log ends with a partial line, terminating it");
            file.write_all(b"\n").await?;
        }
    }
    Ok(file)
}

#[cfg(test)]
#[path = "appender_tests.rs"]
mod tests;
