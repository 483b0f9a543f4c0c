// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sensor records and the catalogue of known measurement keys
//!
//! A [`Record`] is one observation as it is stored on disk: the two
//! server-assigned keys (`id`, `timestamp`) followed by every key the device
//! sent, in the order it sent them. The store only knows about the keys in
//! [`SensorField`]; anything else rides along untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Measurement keys the store knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    AirTemperature,
    AirHumidity,
    Pressure,
    Co2,
    TemperatureUncertainty,
    HumidityUncertainty,
    Latitude,
    Longitude,
    Satellites,
}

impl SensorField {
    /// Keys that must be present in every ingested payload
    pub const REQUIRED: [SensorField; 4] = [
        SensorField::AirTemperature,
        SensorField::AirHumidity,
        SensorField::Pressure,
        SensorField::Co2,
    ];

    /// Every known key: required readings, then uncertainties, then GPS
    pub const ALL: [SensorField; 9] = [
        SensorField::AirTemperature,
        SensorField::AirHumidity,
        SensorField::Pressure,
        SensorField::Co2,
        SensorField::TemperatureUncertainty,
        SensorField::HumidityUncertainty,
        SensorField::Latitude,
        SensorField::Longitude,
        SensorField::Satellites,
    ];

    /// Wire key as sent by the station firmware
    pub fn key(self) -> &'static str {
        match self {
            SensorField::AirTemperature => "temperatura_aire_celsius",
            SensorField::AirHumidity => "humedad_aire_porcentaje",
            SensorField::Pressure => "presion_atmosferica_hPa",
            SensorField::Co2 => "concentracion_CO2_ppm",
            SensorField::TemperatureUncertainty => "incertidumbre_temperatura_celsius",
            SensorField::HumidityUncertainty => "incertidumbre_humedad_porcentaje",
            SensorField::Latitude => "latitud_grados",
            SensorField::Longitude => "longitud_grados",
            SensorField::Satellites => "numero_satelites",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

/// Key of the server-assigned record id
pub const ID_KEY: &str = "id";
/// Key of the server-assigned ingestion timestamp
pub const TIMESTAMP_KEY: &str = "timestamp";

/// One persisted sensor observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub timestamp: String,
    /// Payload keys in arrival order, never including `id` or `timestamp`
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a validated payload.
    ///
    /// Any caller-supplied `id`/`timestamp` keys are dropped: the
    /// server-assigned values always win.
    pub fn new(id: u64, at: DateTime<Utc>, mut fields: Map<String, Value>) -> Self {
        fields.retain(|key, _| key != ID_KEY && key != TIMESTAMP_KEY);
        Self {
            id,
            timestamp: format_timestamp(at),
            fields,
        }
    }

    /// Value of a known measurement, if present (a JSON `null` counts as present)
    pub fn get(&self, field: SensorField) -> Option<&Value> {
        self.fields.get(field.key())
    }

    /// Parse the stored timestamp; `None` if it is not a recognizable date-time
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        crate::range::parse_datetime(&self.timestamp)
    }

    /// Serialize as a single JSON line (without the trailing newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse one log line. Fails for anything that is not a JSON object
    /// carrying a non-negative integer `id` and a string `timestamp`.
    pub fn from_line(line: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(line)
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-02-10T12:00:00.000Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
