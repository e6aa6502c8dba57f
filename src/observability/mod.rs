//! Observability
//!
//! Structured logging and operational counters for the scan engine.

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::MetricsRegistry;
