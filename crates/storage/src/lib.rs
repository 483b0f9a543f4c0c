// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! meteo-storage: durable append-only record log

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod appender;
mod log;

pub use appender::{AppendStats, LogAppender, PendingAppend};
pub use log::{DurableLog, LoadedLog, LogError, LogScan, ReplayStats, ScanStats};
