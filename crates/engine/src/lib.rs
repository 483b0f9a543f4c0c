// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! meteo-engine: the measurement store and history export

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod export;
pub mod store;

pub use export::{write_export, ExportError, ExportFormat, ExportRequest, ExportStream};
pub use store::{
    parse_limit, Durability, MeasurementStore, QueryError, StoreConfig, StoreError, StoreStatus,
    DEFAULT_CACHE_CAPACITY,
};
