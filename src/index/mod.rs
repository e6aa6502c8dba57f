//! Bitmap row index
//!
//! Per-frame, per-key posting lists over the grouping column.

mod bitmap;

pub use bitmap::BitmapIndex;
