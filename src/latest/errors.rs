//! Scan error types
//!
//! Error codes:
//! - CHRONO_UPSTREAM_FAILED (retryable)
//! - CHRONO_FILTER_EVAL_FAILED (retryable)
//! - CHRONO_SCAN_CANCELLED (not retryable)
//!
//! A key missing from the dictionary is never an error: it contributes
//! zero rows and surfaces nowhere in this taxonomy.

use std::fmt;

use crate::frame::FrameError;

/// Scan error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorCode {
    /// Sub-plan execution or frame I/O failed
    UpstreamFailed,
    /// Filter predicate evaluation failed
    FilterEvalFailed,
    /// Execution aborted by the cooperative cancellation signal
    Cancelled,
}

impl ScanErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ScanErrorCode::UpstreamFailed => "CHRONO_UPSTREAM_FAILED",
            ScanErrorCode::FilterEvalFailed => "CHRONO_FILTER_EVAL_FAILED",
            ScanErrorCode::Cancelled => "CHRONO_SCAN_CANCELLED",
        }
    }

    /// Whether a caller may reasonably retry the execution.
    ///
    /// Cancellation is excluded: the caller asked for the abort.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ScanErrorCode::Cancelled)
    }
}

impl fmt::Display for ScanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Scan error with full context
#[derive(Debug)]
pub struct ScanError {
    code: ScanErrorCode,
    message: String,
}

impl ScanError {
    /// Create an upstream failure (sub-plan or frame I/O)
    pub fn upstream(reason: impl Into<String>) -> Self {
        Self {
            code: ScanErrorCode::UpstreamFailed,
            message: reason.into(),
        }
    }

    /// Create a filter evaluation failure
    pub fn filter_eval(reason: impl Into<String>) -> Self {
        Self {
            code: ScanErrorCode::FilterEvalFailed,
            message: reason.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled() -> Self {
        Self {
            code: ScanErrorCode::Cancelled,
            message: "execution cancelled".to_string(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ScanErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a cooperative cancellation
    pub fn is_cancellation(&self) -> bool {
        self.code == ScanErrorCode::Cancelled
    }

    /// Returns whether a caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ScanError {}

impl From<FrameError> for ScanError {
    fn from(err: FrameError) -> Self {
        ScanError::upstream(err.to_string())
    }
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ScanErrorCode::UpstreamFailed.code(), "CHRONO_UPSTREAM_FAILED");
        assert_eq!(ScanErrorCode::FilterEvalFailed.code(), "CHRONO_FILTER_EVAL_FAILED");
        assert_eq!(ScanErrorCode::Cancelled.code(), "CHRONO_SCAN_CANCELLED");
    }

    #[test]
    fn test_cancellation_is_distinguished() {
        let err = ScanError::cancelled();
        assert!(err.is_cancellation());
        assert!(!err.is_retryable());

        let err = ScanError::upstream("sub-plan failed");
        assert!(!err.is_cancellation());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_frame_error_converts_to_upstream() {
        let err: ScanError = FrameError::NoOpenPartition.into();
        assert_eq!(err.code(), ScanErrorCode::UpstreamFailed);
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::filter_eval("bad predicate");
        let display = format!("{}", err);
        assert!(display.contains("CHRONO_FILTER_EVAL_FAILED"));
        assert!(display.contains("bad predicate"));
    }
}
