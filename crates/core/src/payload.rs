// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound payload validation
//!
//! Only shape and key presence are checked. Values are never type- or
//! range-checked, and unknown keys are kept as they are.

use crate::record::SensorField;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons an inbound payload is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("body must be a JSON object with the measurements")]
    NotAnObject,

    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
}

/// Check that `payload` is an object holding every required key.
///
/// Returns the object on success. On failure, `MissingFields` lists exactly
/// the absent keys in catalogue order.
pub fn validate_payload(payload: Value) -> Result<Map<String, Value>, IngestError> {
    let Value::Object(fields) = payload else {
        return Err(IngestError::NotAnObject);
    };

    let missing: Vec<&'static str> = SensorField::REQUIRED
        .iter()
        .map(|field| field.key())
        .filter(|key| !fields.contains_key(*key))
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::MissingFields { fields: missing });
    }

    Ok(fields)
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
