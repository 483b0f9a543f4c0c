// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod export;
pub mod ingest;
pub mod latest;
pub mod recent;
pub mod status;
