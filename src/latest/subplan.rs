//! Sub-plan collaborator
//!
//! A sub-plan is any row-producing plan projecting exactly one column whose
//! values are compared against the grouping column during key resolution.
//! The contract is open / iterate / close; callers must close on every exit
//! path, including errors.

use crate::exec::ExecutionContext;

use super::errors::ScanResult;

/// Single-column row source used to derive target keys.
pub trait SubPlan {
    /// Opens the sub-plan's cursor for one execution.
    fn open(&mut self, ctx: &ExecutionContext) -> ScanResult<()>;

    /// Advances to the next row, returning false once exhausted.
    fn next(&mut self) -> ScanResult<bool>;

    /// Projected column of the current row, read as raw text.
    fn text_value(&self) -> Option<&str>;

    /// Projected column of the current row, read as a decoded symbol.
    fn symbol_value(&self) -> Option<&str>;

    /// Releases resources acquired by `open`. Idempotent.
    fn close(&mut self);
}

/// Sub-plan over a fixed list of values.
///
/// The projected column is plain text, so both accessors return the same
/// string; None entries model SQL NULLs.
#[derive(Debug, Default)]
pub struct VecSubPlan {
    values: Vec<Option<String>>,
    pos: usize,
    open: bool,
}

impl VecSubPlan {
    /// Creates a sub-plan producing the given values in order.
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
            pos: 0,
            open: false,
        }
    }

    /// Creates a sub-plan that may produce NULL rows.
    pub fn with_nulls(values: Vec<Option<String>>) -> Self {
        Self {
            values,
            pos: 0,
            open: false,
        }
    }

    fn current(&self) -> Option<&str> {
        debug_assert!(self.open, "read before open");
        self.values
            .get(self.pos.checked_sub(1)?)?
            .as_deref()
    }
}

impl SubPlan for VecSubPlan {
    fn open(&mut self, _ctx: &ExecutionContext) -> ScanResult<()> {
        self.pos = 0;
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> ScanResult<bool> {
        if self.pos < self.values.len() {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn text_value(&self) -> Option<&str> {
        self.current()
    }

    fn symbol_value(&self) -> Option<&str> {
        self.current()
    }

    fn close(&mut self) {
        self.open = false;
    }
}
