//! Execution context
//!
//! Per-execution state carried through key resolution and frame scanning.

mod context;

pub use context::{CancellationToken, ExecutionContext};
