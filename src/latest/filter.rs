//! Row filter collaborator
//!
//! A filter is bound to the scan's row source once per execution, after key
//! resolution completes, and evaluated per candidate row. The concrete
//! [`PredicateRowFilter`] applies strict predicates over payload columns:
//! no type coercion, missing field means no match, AND semantics.

use serde_json::Value;

use crate::exec::ExecutionContext;
use crate::frame::{Frame, FrameSource};

use super::errors::ScanResult;

/// Boolean predicate evaluated per candidate row during a scan.
pub trait RowFilter {
    /// Binds the filter to the scan's row source for one execution.
    fn bind(&mut self, source: &dyn FrameSource, ctx: &ExecutionContext) -> ScanResult<()>;

    /// Evaluates the filter against one row.
    fn matches(&mut self, frame: &dyn Frame, row: usize) -> ScanResult<bool>;

    /// Releases resources acquired by `bind`. Idempotent.
    fn unbind(&mut self);
}

/// Filter operators
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

/// A single column predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Payload column to test
    pub column: String,
    /// Comparison to apply
    pub op: FilterOp,
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq(value),
        }
    }

    /// Create an inequality predicate
    pub fn neq(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Neq(value),
        }
    }

    /// Create a greater-than predicate
    pub fn gt(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Gt(value),
        }
    }

    /// Create a greater-than-or-equal predicate
    pub fn gte(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Gte(value),
        }
    }

    /// Create a less-than predicate
    pub fn lt(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Lt(value),
        }
    }

    /// Create a less-than-or-equal predicate
    pub fn lte(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Lte(value),
        }
    }
}

/// Evaluates a conjunction of strict column predicates.
#[derive(Debug, Clone)]
pub struct PredicateRowFilter {
    predicates: Vec<Predicate>,
    bound: bool,
}

impl PredicateRowFilter {
    /// Creates a filter from predicates joined with AND semantics.
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            bound: false,
        }
    }

    fn matches_predicate(value: Option<&Value>, op: &FilterOp) -> bool {
        let actual = match value {
            Some(v) if !v.is_null() => v,
            // Missing field or null never matches, not even Neq.
            _ => return false,
        };

        match op {
            FilterOp::Eq(expected) => actual == expected,
            FilterOp::Neq(expected) => actual != expected,
            FilterOp::Gt(bound) => Self::compare(actual, bound, |o| o > 0),
            FilterOp::Gte(bound) => Self::compare(actual, bound, |o| o >= 0),
            FilterOp::Lt(bound) => Self::compare(actual, bound, |o| o < 0),
            FilterOp::Lte(bound) => Self::compare(actual, bound, |o| o <= 0),
        }
    }

    /// Ordered comparison without coercion: numbers against numbers,
    /// strings against strings, everything else is no match.
    fn compare(actual: &Value, bound: &Value, accept: impl Fn(i8) -> bool) -> bool {
        match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => {
                match (a.as_f64(), b.as_f64()) {
                    (Some(af), Some(bf)) if af < bf => accept(-1),
                    (Some(af), Some(bf)) if af > bf => accept(1),
                    (Some(_), Some(_)) => accept(0),
                    _ => false,
                }
            }
            (Value::String(a), Value::String(b)) => match a.cmp(b) {
                std::cmp::Ordering::Less => accept(-1),
                std::cmp::Ordering::Equal => accept(0),
                std::cmp::Ordering::Greater => accept(1),
            },
            _ => false,
        }
    }
}

impl RowFilter for PredicateRowFilter {
    fn bind(&mut self, _source: &dyn FrameSource, _ctx: &ExecutionContext) -> ScanResult<()> {
        self.bound = true;
        Ok(())
    }

    fn matches(&mut self, frame: &dyn Frame, row: usize) -> ScanResult<bool> {
        debug_assert!(self.bound, "filter evaluated before bind");
        Ok(self
            .predicates
            .iter()
            .all(|p| Self::matches_predicate(frame.value_at(&p.column, row), &p.op)))
    }

    fn unbind(&mut self) {
        self.bound = false;
    }
}
