//! Frame storage errors

use thiserror::Error;

/// Result type for frame operations
pub type FrameResult<T> = Result<T, FrameError>;

/// Frame storage errors
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    #[error("Frame index out of bounds: {index} (frame count: {count})")]
    FrameOutOfBounds { index: usize, count: usize },

    #[error("Row position out of bounds: {row} (row count: {count})")]
    RowOutOfBounds { row: usize, count: usize },

    #[error("No open partition: begin a partition before appending rows")]
    NoOpenPartition,

    #[error("Partition out of order: {ts} does not follow {tail}")]
    OutOfOrderPartition { ts: String, tail: String },

    #[error("Frame read failed: {0}")]
    ReadFailed(String),
}
