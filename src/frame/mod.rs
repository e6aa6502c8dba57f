//! Time-partitioned frame storage
//!
//! A frame is an immutable, physically ordered run of rows for one time
//! partition. The scan engine consumes frames through the [`Frame`] and
//! [`FrameSource`] traits; [`FrameStore`] is the in-memory implementation.

mod errors;
mod frame;
mod partition;
mod store;

pub use errors::{FrameError, FrameResult};
pub use frame::{frame_of, row_id, row_of, Frame, FrameSource, RowId};
pub use partition::FramePartition;
pub use store::FrameStore;
