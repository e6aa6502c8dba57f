//! chronodb - a deterministic, time-partitioned columnar query engine core
//!
//! The crate centers on the LATEST BY query path: for a set of target keys
//! of a dictionary-encoded grouping column, find the single most recent row
//! per key while scanning as little of the table as possible.

pub mod config;
pub mod exec;
pub mod frame;
pub mod index;
pub mod latest;
pub mod observability;
pub mod symbol;
