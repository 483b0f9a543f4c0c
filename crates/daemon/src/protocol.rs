// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP wire bodies
//!
//! Key names match what the station dashboard already reads
//! (`mediciones_totales`, `ultima_medicion`, ...), so they are fixed.

use meteo_core::Record;
use meteo_engine::StoreStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Body of `GET /api/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(rename = "mediciones_totales")]
    pub total_count: u64,
    #[serde(rename = "ultima_medicion")]
    pub latest: Option<Record>,
    #[serde(rename = "ventana_en_memoria")]
    pub cache_size: usize,
    #[serde(rename = "max_en_memoria")]
    pub cache_capacity: usize,
    #[serde(rename = "archivo_datos")]
    pub data_file: PathBuf,
}

impl StatusResponse {
    pub fn new(status: StoreStatus, data_file: &Path) -> Self {
        Self {
            status: "ok".to_string(),
            total_count: status.total_count,
            latest: status.latest,
            cache_size: status.cache_size,
            cache_capacity: status.cache_capacity,
            data_file: data_file.to_path_buf(),
        }
    }
}

/// Body of a successful `POST /api/mediciones`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ok: bool,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "medicion")]
    pub record: Record,
}

impl IngestResponse {
    pub fn stored(record: Record) -> Self {
        Self {
            ok: true,
            message: "measurement stored".to_string(),
            record,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(
        rename = "campos_faltantes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub missing_fields: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            missing_fields: None,
        }
    }

    pub fn with_missing_fields(mut self, fields: &[&str]) -> Self {
        self.missing_fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

/// Query string of `GET /api/mediciones`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentParams {
    pub limit: Option<String>,
}

/// Query string of `GET /api/mediciones/export`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
