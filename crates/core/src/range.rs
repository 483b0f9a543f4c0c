// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Date-time parsing and inclusive timestamp ranges for export

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Naive layouts accepted in addition to RFC 3339; read as UTC
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 date-time.
///
/// Accepts RFC 3339 with an offset, a date-time without offset (UTC), or a
/// bare date (midnight UTC).
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Which end of a range a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    From,
    To,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::From => write!(f, "from"),
            Bound::To => write!(f, "to"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid \"{bound}\" parameter {value:?}: use ISO 8601, e.g. 2026-02-10T00:00:00Z")]
    InvalidDate { bound: Bound, value: String },
}

/// Inclusive `[from, to]` window; an absent bound is open on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parse optional bound parameters. Empty strings count as absent.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, RangeError> {
        Ok(Self {
            from: parse_bound(Bound::From, from)?,
            to: parse_bound(Bound::To, to)?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }

    /// Whether a stored timestamp string falls inside the range.
    ///
    /// An unbounded range admits everything. Otherwise a timestamp that does
    /// not parse is outside.
    pub fn admits(&self, timestamp: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        parse_datetime(timestamp).is_some_and(|at| self.contains(at))
    }
}

fn parse_bound(bound: Bound, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, RangeError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    parse_datetime(raw)
        .map(Some)
        .ok_or_else(|| RangeError::InvalidDate {
            bound,
            value: raw.to_string(),
        })
}

#[cfg(test)]
#[path = "range_tests.rs"]
mod tests;
