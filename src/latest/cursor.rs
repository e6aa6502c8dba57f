//! Result cursor
//!
//! Exposes one execution's materialized result rows to downstream
//! consumers in ascending row-id (chronological) order, even though the
//! scan discovered them newest-first. The cursor only replays: restarting
//! or repositioning never re-triggers resolution or scanning.

use serde_json::Value;

use crate::frame::{frame_of, row_of, FrameResult, FrameSource, RowId};
use crate::symbol::SymbolKey;

/// Forward-iterable, restartable, random-access view over one execution's
/// result rows. Borrows the factory's scratch state for the execution's
/// duration; a new execution cannot begin until it is dropped.
pub struct LatestRowCursor<'a> {
    rows: &'a [RowId],
    source: &'a dyn FrameSource,
    /// Index of the next row to deliver
    pos: usize,
    current: Option<RowId>,
}

impl std::fmt::Debug for LatestRowCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestRowCursor")
            .field("rows", &self.rows)
            .field("pos", &self.pos)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a> LatestRowCursor<'a> {
    pub(crate) fn new(rows: &'a [RowId], source: &'a dyn FrameSource) -> Self {
        Self {
            rows,
            source,
            pos: 0,
            current: None,
        }
    }

    /// Number of result rows, known before iteration begins.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no target key found a matching row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Advances to the next row, returning its location.
    pub fn next_row(&mut self) -> Option<RowId> {
        let id = self.rows.get(self.pos).copied();
        if id.is_some() {
            self.pos += 1;
        }
        self.current = id;
        id
    }

    /// Rewinds to before the first row. Replays the materialized rows;
    /// never rescans.
    pub fn to_top(&mut self) {
        self.pos = 0;
        self.current = None;
    }

    /// Positions the cursor on the row at `position`.
    ///
    /// Returns false (and leaves the cursor unchanged) when out of range.
    pub fn seek(&mut self, position: usize) -> bool {
        match self.rows.get(position) {
            Some(id) => {
                self.current = Some(*id);
                self.pos = position + 1;
                true
            }
            None => false,
        }
    }

    /// Location of the row the cursor is positioned on.
    pub fn current(&self) -> Option<RowId> {
        self.current
    }

    /// Row location at `position` without moving the cursor.
    pub fn row_at(&self, position: usize) -> Option<RowId> {
        self.rows.get(position).copied()
    }

    /// Grouping key of the current row.
    pub fn key(&self) -> FrameResult<Option<SymbolKey>> {
        match self.current {
            Some(id) => {
                let frame = self.source.frame(frame_of(id))?;
                frame.key_at(row_of(id)).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Payload column value of the current row.
    ///
    /// None when the cursor is not positioned or the column is absent for
    /// this row.
    pub fn value(&self, column: &str) -> FrameResult<Option<&'a Value>> {
        match self.current {
            Some(id) => {
                let frame = self.source.frame(frame_of(id))?;
                Ok(frame.value_at(column, row_of(id)))
            }
            None => Ok(None),
        }
    }
}

impl Iterator for LatestRowCursor<'_> {
    type Item = RowId;

    fn next(&mut self) -> Option<RowId> {
        self.next_row()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.len() - self.pos.min(self.rows.len());
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameStore;
    use crate::symbol::SymbolLookup;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn store() -> FrameStore {
        let mut store = FrameStore::new(false);
        store
            .begin_partition(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        store.append("A", &[("ts", json!(1))]).unwrap();
        store.append("B", &[("ts", json!(2))]).unwrap();
        store.append("A", &[("ts", json!(3))]).unwrap();
        store
    }

    #[test]
    fn test_cursor_replays_in_order() {
        let store = store();
        let rows = vec![1u64, 2u64];
        let mut cursor = LatestRowCursor::new(&rows, &store);

        assert_eq!(cursor.size(), 2);
        assert_eq!(cursor.next_row(), Some(1));
        assert_eq!(cursor.next_row(), Some(2));
        assert_eq!(cursor.next_row(), None);

        cursor.to_top();
        assert_eq!(cursor.next_row(), Some(1));
    }

    #[test]
    fn test_cursor_random_access() {
        let store = store();
        let rows = vec![0u64, 1u64, 2u64];
        let mut cursor = LatestRowCursor::new(&rows, &store);

        assert!(cursor.seek(2));
        assert_eq!(cursor.current(), Some(2));
        assert_eq!(cursor.value("ts").unwrap(), Some(&json!(3)));
        assert!(!cursor.seek(3));
        // Failed seek leaves the position untouched.
        assert_eq!(cursor.current(), Some(2));
        assert_eq!(cursor.row_at(0), Some(0));
    }

    #[test]
    fn test_cursor_reads_current_row() {
        let store = store();
        let rows = vec![1u64];
        let mut cursor = LatestRowCursor::new(&rows, &store);

        assert_eq!(cursor.value("ts").unwrap(), None);
        cursor.next_row();
        assert_eq!(cursor.value("ts").unwrap(), Some(&json!(2)));
        assert_eq!(
            cursor.key().unwrap(),
            store.symbol_table().lookup("B")
        );
    }

    #[test]
    fn test_iterator_adapter() {
        let store = store();
        let rows = vec![0u64, 2u64];
        let cursor = LatestRowCursor::new(&rows, &store);

        assert_eq!(cursor.collect::<Vec<_>>(), vec![0, 2]);
    }
}
