//! Key resolution
//!
//! Turns a query's key specification into concrete dictionary keys at
//! execution time. Resolution always runs to completion before any frame
//! is scanned, and it happens per execution — never at plan time — because
//! the dictionary may grow between the two.

use std::collections::hash_set;
use std::collections::HashSet;

use crate::exec::ExecutionContext;
use crate::symbol::{SymbolKey, SymbolLookup};

use super::adapter::ValueExtractor;
use super::errors::{ScanError, ScanResult};
use super::subplan::SubPlan;

/// Set of keys still being searched for in the current execution.
///
/// Membership is unique; the set is cleared and repopulated at the start of
/// every execution and strictly shrinks while a scan runs.
#[derive(Debug, Default)]
pub struct TargetKeySet {
    keys: HashSet<SymbolKey>,
}

impl TargetKeySet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with a capacity hint
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: HashSet::with_capacity(capacity),
        }
    }

    /// Removes all keys
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Inserts a key; duplicates collapse. Returns true if newly added.
    pub fn insert(&mut self, key: SymbolKey) -> bool {
        self.keys.insert(key)
    }

    /// Removes a satisfied key
    pub fn remove(&mut self, key: SymbolKey) -> bool {
        self.keys.remove(&key)
    }

    /// Whether a key is still outstanding
    pub fn contains(&self, key: SymbolKey) -> bool {
        self.keys.contains(&key)
    }

    /// Number of outstanding keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether every target has been satisfied
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the outstanding keys in arbitrary order
    pub fn iter(&self) -> hash_set::Iter<'_, SymbolKey> {
        self.keys.iter()
    }
}

/// Resolves a deferred literal against the current dictionary snapshot.
///
/// Not-found is not an error: the execution simply has nothing to scan for.
pub(crate) fn resolve_literal(symbols: &dyn SymbolLookup, literal: &str) -> Option<SymbolKey> {
    symbols.lookup(literal)
}

/// Drains a sub-plan into the target key set.
///
/// Clears the set, opens the sub-plan, extracts one comparable value per
/// row via the chosen extractor, and inserts every value the dictionary
/// knows. Values absent from the dictionary are skipped silently and
/// duplicates collapse. The sub-plan is closed on every exit path, and the
/// cancellation signal is polled between rows.
pub(crate) fn resolve_sub_plan(
    plan: &mut dyn SubPlan,
    extractor: ValueExtractor,
    symbols: &dyn SymbolLookup,
    ctx: &ExecutionContext,
    targets: &mut TargetKeySet,
) -> ScanResult<()> {
    targets.clear();
    plan.open(ctx)?;
    let drained = drain(plan, extractor, symbols, ctx, targets);
    plan.close();
    drained
}

fn drain(
    plan: &mut dyn SubPlan,
    extractor: ValueExtractor,
    symbols: &dyn SymbolLookup,
    ctx: &ExecutionContext,
    targets: &mut TargetKeySet,
) -> ScanResult<()> {
    while plan.next()? {
        if ctx.is_cancelled() {
            return Err(ScanError::cancelled());
        }
        if let Some(key) = extractor.extract(plan).and_then(|value| symbols.lookup(value)) {
            targets.insert(key);
        }
    }
    Ok(())
}
