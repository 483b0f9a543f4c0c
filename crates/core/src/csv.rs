// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CSV projection of records
//!
//! Columns are fixed: `id`, `timestamp`, then every [`SensorField`] in
//! catalogue order. Keys outside the catalogue are not exported as CSV.

use crate::record::{Record, SensorField, ID_KEY, TIMESTAMP_KEY};
use serde_json::Value;
use std::borrow::Cow;

/// Column names in output order
pub fn columns() -> impl Iterator<Item = &'static str> {
    [ID_KEY, TIMESTAMP_KEY]
        .into_iter()
        .chain(SensorField::ALL.iter().map(|field| field.key()))
}

/// Header row, newline terminated
pub fn header_line() -> String {
    let mut line = columns().collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// Data row for one record, newline terminated
pub fn record_line(record: &Record) -> String {
    let mut cells = Vec::with_capacity(SensorField::ALL.len() + 2);
    cells.push(record.id.to_string());
    cells.push(escape_field(&record.timestamp).into_owned());
    for field in SensorField::ALL {
        cells.push(escape_field(&value_text(record.get(field))).into_owned());
    }

    let mut line = cells.join(",");
    line.push('\n');
    line
}

/// Text form of a JSON value; missing and `null` become empty
pub fn value_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// Quote a cell if it contains a comma, quote, or line break; inner quotes
/// are doubled.
pub fn escape_field(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
#[path = "csv_tests.rs"]
mod tests;
