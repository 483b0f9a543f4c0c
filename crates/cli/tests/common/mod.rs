// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch station: a temp directory holding one measurement log.
/// Cleaned up when dropped.
pub struct Station {
    temp: TempDir,
    pub data: PathBuf,
}

impl Station {
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let data = temp.path().join("data").join("mediciones.jsonl");
        Self { temp, data }
    }

    /// Station whose log already holds `lines`, one per line
    pub fn with_log(lines: &[&str]) -> Self {
        let station = Self::empty();
        fs::create_dir_all(station.data.parent().expect("log has a parent"))
            .expect("Failed to create data dir");
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&station.data, content).expect("Failed to write log");
        station
    }

    /// `meteo --data <log>` with a clean environment
    pub fn meteo(&self) -> Command {
        let mut cmd = Command::cargo_bin("meteo").expect("meteo binary not built");
        cmd.current_dir(self.temp.path())
            .env_remove("METEO_DATA_FILE")
            .env_remove("RUST_LOG")
            .arg("--data")
            .arg(&self.data);
        cmd
    }

    /// Ingest one reading through the CLI and return the stored record
    pub fn ingest(&self, payload: &Value) -> Value {
        let output = self
            .meteo()
            .args(["ingest", &payload.to_string()])
            .output()
            .expect("Failed to run meteo");
        assert!(
            output.status.success(),
            "ingest failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("ingest printed invalid JSON")
    }

    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.data)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp.path()
    }
}

/// A payload with the four required readings
pub fn reading() -> Value {
    json!({
        "temperatura_aire_celsius": 21.5,
        "humedad_aire_porcentaje": 40,
        "presion_atmosferica_hPa": 1012,
        "concentracion_CO2_ppm": 410,
    })
}

/// A stored log line with the given id and timestamp
pub fn log_line(id: u64, timestamp: &str) -> String {
    json!({
        "id": id,
        "timestamp": timestamp,
        "temperatura_aire_celsius": 20.0,
        "humedad_aire_porcentaje": 40,
        "presion_atmosferica_hPa": 1012,
        "concentracion_CO2_ppm": 410,
    })
    .to_string()
}
