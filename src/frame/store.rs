//! In-memory frame store
//!
//! The append path of the table: partitions are opened in ascending
//! partition-timestamp order, rows land in the newest partition, and the
//! grouping column is interned through the store's symbol table on the way
//! in. Implements [`FrameSource`] for the scan engine.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::symbol::{SymbolLookup, SymbolTable};

use super::errors::{FrameError, FrameResult};
use super::frame::{row_id, Frame, FrameSource, RowId};
use super::partition::FramePartition;

/// In-memory, time-partitioned table of frames.
#[derive(Debug, Default)]
pub struct FrameStore {
    symbols: SymbolTable,
    partitions: Vec<FramePartition>,
    indexed: bool,
}

impl FrameStore {
    /// Creates an empty store. `indexed` controls whether new partitions
    /// build per-key posting lists over the grouping column.
    pub fn new(indexed: bool) -> Self {
        Self {
            symbols: SymbolTable::new(),
            partitions: Vec::new(),
            indexed,
        }
    }

    /// Opens a new partition. Partitions must be opened in ascending
    /// partition-timestamp order.
    pub fn begin_partition(&mut self, ts: DateTime<Utc>) -> FrameResult<()> {
        if let Some(tail) = self.partitions.last() {
            if ts <= tail.partition_ts() {
                return Err(FrameError::OutOfOrderPartition {
                    ts: ts.to_rfc3339(),
                    tail: tail.partition_ts().to_rfc3339(),
                });
            }
        }
        self.partitions.push(FramePartition::new(ts, self.indexed));
        Ok(())
    }

    /// Appends a row to the newest partition, interning the grouping value.
    pub fn append(&mut self, symbol: &str, payload: &[(&str, Value)]) -> FrameResult<RowId> {
        let key = self.symbols.intern(symbol);
        let frame = self.partitions.len().checked_sub(1).ok_or(FrameError::NoOpenPartition)?;
        let row = self.partitions[frame].append(key, payload);
        Ok(row_id(frame, row as usize))
    }

    /// The store's symbol table.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Total rows across all partitions.
    pub fn row_count(&self) -> usize {
        self.partitions.iter().map(FramePartition::row_count).sum()
    }
}

impl FrameSource for FrameStore {
    fn frame_count(&self) -> FrameResult<usize> {
        Ok(self.partitions.len())
    }

    fn frame(&self, index: usize) -> FrameResult<&dyn Frame> {
        self.partitions
            .get(index)
            .map(|p| p as &dyn Frame)
            .ok_or(FrameError::FrameOutOfBounds {
                index,
                count: self.partitions.len(),
            })
    }

    fn symbols(&self) -> &dyn SymbolLookup {
        &self.symbols
    }
}
