//! Execution context
//!
//! Context carried through one query execution. Holds the execution id for
//! log correlation and the cooperative cancellation token polled between
//! frames and between sub-plan rows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

/// Cooperative cancellation signal shared between the engine and its caller.
///
/// The caller keeps a clone and trips it; the scan polls it at suspension
/// points. There is no preemption: a trip takes effect at the next poll.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the execution holding this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Context carried through one query execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Execution ID for log correlation
    pub execution_id: Uuid,

    /// Cancellation signal polled at suspension points
    cancellation: CancellationToken,

    /// Start time for duration tracking
    started_at: Instant,
}

impl ExecutionContext {
    /// Create a context with a fresh id and its own token.
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Create a context polling an externally owned token.
    pub fn with_token(cancellation: CancellationToken) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            cancellation,
            started_at: Instant::now(),
        }
    }

    /// Whether cancellation has been requested for this execution.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
