//! In-memory columnar partition
//!
//! Stores the grouping column as dense dictionary codes plus named payload
//! columns of JSON values. Rows are append-only and physically ordered by
//! write time; the partition timestamp orders partitions between each other.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::index::BitmapIndex;
use crate::symbol::SymbolKey;

use super::errors::{FrameError, FrameResult};
use super::frame::Frame;

/// One time partition's rows in columnar form.
#[derive(Debug)]
pub struct FramePartition {
    partition_ts: DateTime<Utc>,
    keys: Vec<SymbolKey>,
    columns: HashMap<String, Vec<Value>>,
    index: Option<BitmapIndex>,
}

impl FramePartition {
    /// Creates an empty partition for the given partition timestamp.
    pub fn new(partition_ts: DateTime<Utc>, indexed: bool) -> Self {
        Self {
            partition_ts,
            keys: Vec::new(),
            columns: HashMap::new(),
            index: indexed.then(BitmapIndex::new),
        }
    }

    /// The timestamp this partition covers.
    pub fn partition_ts(&self) -> DateTime<Utc> {
        self.partition_ts
    }

    /// Appends a row, returning its physical position.
    ///
    /// Payload columns are sparse: a column not named here reads back as
    /// absent for this row.
    pub fn append(&mut self, key: SymbolKey, payload: &[(&str, Value)]) -> u32 {
        let row = self.keys.len() as u32;
        self.keys.push(key);
        if let Some(index) = self.index.as_mut() {
            index.append(key, row);
        }
        for (column, value) in payload {
            let cells = self.columns.entry((*column).to_string()).or_default();
            // Backfill rows written before this column first appeared.
            cells.resize(row as usize, Value::Null);
            cells.push(value.clone());
        }
        row
    }
}

impl Frame for FramePartition {
    fn row_count(&self) -> usize {
        self.keys.len()
    }

    fn key_at(&self, row: usize) -> FrameResult<SymbolKey> {
        self.keys.get(row).copied().ok_or(FrameError::RowOutOfBounds {
            row,
            count: self.keys.len(),
        })
    }

    fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    fn posting(&self, key: SymbolKey) -> Option<&[u32]> {
        self.index.as_ref()?.posting(key)
    }

    fn value_at(&self, column: &str, row: usize) -> Option<&Value> {
        match self.columns.get(column)?.get(row) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }
}
