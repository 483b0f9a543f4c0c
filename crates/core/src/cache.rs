// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-capacity window over the most recent records
//!
//! The cache is a derived view of the tail of the durable log. It never
//! reaches back to disk: asking for more records than it holds simply
//! returns everything it has.

use crate::record::Record;
use std::collections::VecDeque;

/// Insertion-ordered ring of the last `capacity` records
#[derive(Debug, Clone)]
pub struct BoundedCache {
    records: VecDeque<Record>,
    capacity: usize,
}

impl BoundedCache {
    /// Create an empty cache. A capacity of zero is raised to one so the
    /// latest record is always retained.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the tail, evicting from the head once over capacity
    pub fn insert(&mut self, record: Record) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    /// Most recently inserted record
    pub fn latest(&self) -> Option<&Record> {
        self.records.back()
    }

    /// Oldest record still held
    pub fn oldest(&self) -> Option<&Record> {
        self.records.front()
    }

    /// The most recent `min(n, len)` records, oldest first
    pub fn last_n(&self, n: usize) -> Vec<Record> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Every held record, oldest first
    pub fn to_vec(&self) -> Vec<Record> {
        self.records.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
