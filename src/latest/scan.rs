//! Latest-by scan engine
//!
//! Walks frames newest-first and rows last-to-first, consuming the target
//! key set as rows are accepted. The early exit when the set drains is the
//! central performance property: work is bounded by the distance back to
//! the point where every target key's latest occurrence has been found,
//! not by table size.
//!
//! Indexed and filtered behavior are independent capability flags over the
//! same two routines (key set vs single key) rather than separate scan
//! implementations. A frame without an index falls back to the row walk
//! for that frame only.

use std::collections::BTreeSet;

use crate::exec::ExecutionContext;
use crate::frame::{row_id, Frame, FrameSource, RowId};
use crate::symbol::SymbolKey;

use super::errors::{ScanError, ScanResult};
use super::filter::RowFilter;
use super::resolve::TargetKeySet;

/// Work counters for one execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames visited before the scan stopped
    pub frames_visited: usize,
    /// Rows whose key was decoded or whose posting entry was tested
    pub rows_scanned: usize,
}

fn accept(
    filter: Option<&mut (dyn RowFilter + 'static)>,
    frame: &dyn Frame,
    row: usize,
) -> ScanResult<bool> {
    match filter {
        Some(f) => f.matches(frame, row),
        None => Ok(true),
    }
}

/// Finds the latest qualifying row for every key in `targets`.
///
/// Accepted row locations land in `rows`; satisfied keys leave `targets`.
/// Stops as soon as the set drains or frames are exhausted.
pub(crate) fn scan_key_set(
    source: &dyn FrameSource,
    targets: &mut TargetKeySet,
    mut filter: Option<&mut (dyn RowFilter + 'static)>,
    use_index: bool,
    ctx: &ExecutionContext,
    rows: &mut BTreeSet<RowId>,
    stats: &mut ScanStats,
) -> ScanResult<()> {
    let frame_count = source.frame_count()?;
    // Scratch for the indexed walk: keys cannot be removed from the set
    // while iterating it. Sorted so work order is deterministic.
    let mut outstanding: Vec<SymbolKey> = Vec::new();

    for frame_idx in (0..frame_count).rev() {
        if targets.is_empty() {
            break;
        }
        if ctx.is_cancelled() {
            return Err(ScanError::cancelled());
        }
        let frame = source.frame(frame_idx)?;
        stats.frames_visited += 1;

        if use_index && frame.is_indexed() {
            outstanding.clear();
            outstanding.extend(targets.iter().copied());
            outstanding.sort_unstable();
            for &key in &outstanding {
                let posting = match frame.posting(key) {
                    Some(posting) => posting,
                    None => continue,
                };
                for &row in posting.iter().rev() {
                    stats.rows_scanned += 1;
                    if accept(filter.as_deref_mut(), frame, row as usize)? {
                        rows.insert(row_id(frame_idx, row as usize));
                        targets.remove(key);
                        break;
                    }
                }
            }
        } else {
            for row in (0..frame.row_count()).rev() {
                stats.rows_scanned += 1;
                let key = frame.key_at(row)?;
                if !targets.contains(key) {
                    continue;
                }
                if accept(filter.as_deref_mut(), frame, row)? {
                    rows.insert(row_id(frame_idx, row));
                    targets.remove(key);
                    if targets.is_empty() {
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Single-key specialization for deferred-literal cursors.
///
/// Stops at the first accepted row; an exhausted table leaves `rows`
/// untouched.
pub(crate) fn scan_single_key(
    source: &dyn FrameSource,
    key: SymbolKey,
    mut filter: Option<&mut (dyn RowFilter + 'static)>,
    use_index: bool,
    ctx: &ExecutionContext,
    rows: &mut BTreeSet<RowId>,
    stats: &mut ScanStats,
) -> ScanResult<()> {
    let frame_count = source.frame_count()?;

    for frame_idx in (0..frame_count).rev() {
        if ctx.is_cancelled() {
            return Err(ScanError::cancelled());
        }
        let frame = source.frame(frame_idx)?;
        stats.frames_visited += 1;

        if use_index && frame.is_indexed() {
            if let Some(posting) = frame.posting(key) {
                for &row in posting.iter().rev() {
                    stats.rows_scanned += 1;
                    if accept(filter.as_deref_mut(), frame, row as usize)? {
                        rows.insert(row_id(frame_idx, row as usize));
                        return Ok(());
                    }
                }
            }
        } else {
            for row in (0..frame.row_count()).rev() {
                stats.rows_scanned += 1;
                if frame.key_at(row)? != key {
                    continue;
                }
                if accept(filter.as_deref_mut(), frame, row)? {
                    rows.insert(row_id(frame_idx, row));
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}
