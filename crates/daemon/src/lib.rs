// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weather station daemon library: config, lifecycle and HTTP routes.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use lifecycle::{startup, Config, Daemon, LifecycleError};
pub use protocol::{ErrorBody, IngestResponse, StatusResponse};
pub use server::{router, ApiError, RouterOptions};
