// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! meteo-core: core types for the weather station measurement store
//!
//! This crate provides:
//! - The stored [`Record`] shape and the catalogue of known sensor keys
//! - Payload validation (required-key presence only)
//! - The bounded in-memory window over recent records
//! - Date-time parsing and inclusive ranges for export
//! - CSV projection

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cache;
pub mod clock;
pub mod csv;
pub mod payload;
pub mod range;
pub mod record;

pub use cache::BoundedCache;
pub use clock::{Clock, FakeClock, SystemClock};
pub use payload::{validate_payload, IngestError};
pub use range::{parse_datetime, Bound, RangeError, TimeRange};
pub use record::{format_timestamp, Record, SensorField};
