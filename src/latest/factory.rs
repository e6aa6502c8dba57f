//! Latest-by cursor factory
//!
//! Built once at plan time, executed many times. The factory owns its
//! collaborators (frame source, optional sub-plan, optional filter) and the
//! scratch state shared with every cursor it produces. A cursor borrows the
//! factory for its execution's duration, so the borrow checker enforces the
//! one-live-cursor precondition that keeps scratch reuse safe.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::exec::ExecutionContext;
use crate::frame::{FrameSource, RowId};
use crate::observability::{Logger, MetricsRegistry};
use crate::symbol::SymbolKey;

use super::adapter::ValueExtractor;
use super::cursor::LatestRowCursor;
use super::errors::{ScanError, ScanResult};
use super::filter::RowFilter;
use super::resolve::{self, TargetKeySet};
use super::scan::{self, ScanStats};
use super::subplan::SubPlan;

/// How the target keys of an execution are specified.
enum KeySource {
    /// One value known at plan time, resolved per execution
    Literal(String),
    /// A sub-plan whose projected column yields the values
    SubQuery {
        plan: Box<dyn SubPlan>,
        extractor: ValueExtractor,
    },
}

/// Scratch state shared between the factory and the cursors it produces.
///
/// Allocated once, cleared and repopulated at the start of every execution.
#[derive(Default)]
struct ScanState {
    targets: TargetKeySet,
    rows: BTreeSet<RowId>,
    row_seq: Vec<RowId>,
    stats: ScanStats,
}

/// Factory for latest-by cursors over one frame source.
///
/// Reusable across sequential executions; not safe for concurrent use.
pub struct LatestByFactory<S: FrameSource> {
    source: S,
    keys: KeySource,
    filter: Option<Box<dyn RowFilter>>,
    use_index: bool,
    state: ScanState,
    metrics: Arc<MetricsRegistry>,
    closed: bool,
}

impl<S: FrameSource> LatestByFactory<S> {
    /// Creates a factory for a single deferred literal.
    ///
    /// The literal is looked up at execution time, so a value ingested
    /// after planning still resolves.
    pub fn with_literal(
        config: &EngineConfig,
        source: S,
        literal: impl Into<String>,
        filter: Option<Box<dyn RowFilter>>,
    ) -> Self {
        Self::build(config, source, KeySource::Literal(literal.into()), filter)
    }

    /// Creates a factory deriving its target keys from a sub-plan.
    pub fn with_sub_query(
        config: &EngineConfig,
        source: S,
        plan: Box<dyn SubPlan>,
        extractor: ValueExtractor,
        filter: Option<Box<dyn RowFilter>>,
    ) -> Self {
        Self::build(config, source, KeySource::SubQuery { plan, extractor }, filter)
    }

    fn build(
        config: &EngineConfig,
        source: S,
        keys: KeySource,
        filter: Option<Box<dyn RowFilter>>,
    ) -> Self {
        Self {
            source,
            keys,
            filter,
            use_index: config.indexed_scan_enabled,
            state: ScanState {
                targets: TargetKeySet::with_capacity(config.target_key_capacity),
                ..ScanState::default()
            },
            metrics: Arc::new(MetricsRegistry::new()),
            closed: false,
        }
    }

    /// Shares an engine-wide metrics registry with this factory.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The frame source this factory scans.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the frame source, e.g. for ingestion between
    /// executions. Unavailable while a cursor is live.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Work counters of the most recent execution.
    pub fn last_scan_stats(&self) -> ScanStats {
        self.state.stats
    }

    /// Runs one execution: resolve keys, bind the filter, scan, and
    /// materialize the result rows in ascending order.
    ///
    /// The returned cursor borrows this factory; the next execution can
    /// only begin after it is dropped.
    pub fn execute(&mut self, ctx: &ExecutionContext) -> ScanResult<LatestRowCursor<'_>> {
        if self.closed {
            return Err(ScanError::upstream("factory is closed"));
        }

        self.state.targets.clear();
        self.state.rows.clear();
        self.state.row_seq.clear();
        self.state.stats = ScanStats::default();

        // Key resolution runs to completion before any frame is scanned.
        let resolved: ScanResult<Option<SymbolKey>> = match &mut self.keys {
            KeySource::Literal(literal) => {
                Ok(resolve::resolve_literal(self.source.symbols(), literal))
            }
            KeySource::SubQuery { plan, extractor } => resolve::resolve_sub_plan(
                plan.as_mut(),
                *extractor,
                self.source.symbols(),
                ctx,
                &mut self.state.targets,
            )
            .map(|_| None),
        };
        let single_key = match resolved {
            Ok(key) => key,
            Err(err) => {
                self.record_abort(ctx, &err);
                return Err(err);
            }
        };

        // The filter binds to the row source only after resolution.
        if let Some(filter) = self.filter.as_deref_mut() {
            if let Err(err) = filter.bind(&self.source, ctx) {
                self.record_abort(ctx, &err);
                return Err(err);
            }
        }

        let scanned: ScanResult<()> = match (&self.keys, single_key) {
            (KeySource::Literal(_), Some(key)) => scan::scan_single_key(
                &self.source,
                key,
                self.filter.as_deref_mut(),
                self.use_index,
                ctx,
                &mut self.state.rows,
                &mut self.state.stats,
            ),
            // Literal unknown to the dictionary: zero rows, not an error.
            (KeySource::Literal(_), None) => Ok(()),
            (KeySource::SubQuery { .. }, _) => {
                if self.state.targets.is_empty() {
                    Ok(())
                } else {
                    scan::scan_key_set(
                        &self.source,
                        &mut self.state.targets,
                        self.filter.as_deref_mut(),
                        self.use_index,
                        ctx,
                        &mut self.state.rows,
                        &mut self.state.stats,
                    )
                }
            }
        };

        // Per-execution filter resources are released on every exit path.
        if let Some(filter) = self.filter.as_deref_mut() {
            filter.unbind();
        }

        if let Err(err) = scanned {
            self.record_abort(ctx, &err);
            return Err(err);
        }

        // BTreeSet iteration is ascending, so the replay order downstream
        // consumers see is chronological.
        self.state.row_seq.extend(self.state.rows.iter().copied());

        self.metrics
            .record_execution(&self.state.stats, self.state.row_seq.len());
        let execution_id = ctx.execution_id.to_string();
        let rows = self.state.row_seq.len().to_string();
        let frames = self.state.stats.frames_visited.to_string();
        let scanned_rows = self.state.stats.rows_scanned.to_string();
        let elapsed = ctx.elapsed_ms().to_string();
        Logger::info(
            "LATEST_BY_EXECUTED",
            &[
                ("execution_id", execution_id.as_str()),
                ("rows", rows.as_str()),
                ("frames_visited", frames.as_str()),
                ("rows_scanned", scanned_rows.as_str()),
                ("elapsed_ms", elapsed.as_str()),
            ],
        );

        Ok(LatestRowCursor::new(&self.state.row_seq, &self.source))
    }

    /// Releases owned collaborators: frame source, then sub-plan, then
    /// filter. Idempotent; no cursor may be live.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.source.close();
        if let KeySource::SubQuery { plan, .. } = &mut self.keys {
            plan.close();
        }
        if let Some(filter) = self.filter.as_deref_mut() {
            filter.unbind();
        }
        self.closed = true;
    }

    fn record_abort(&self, ctx: &ExecutionContext, err: &ScanError) {
        let execution_id = ctx.execution_id.to_string();
        if err.is_cancellation() {
            self.metrics.record_cancellation();
            Logger::warn(
                "LATEST_BY_CANCELLED",
                &[("execution_id", execution_id.as_str())],
            );
        } else {
            self.metrics.record_failure();
            let code = err.code().code();
            let message = err.message().to_string();
            Logger::error(
                "LATEST_BY_FAILED",
                &[
                    ("code", code),
                    ("execution_id", execution_id.as_str()),
                    ("message", message.as_str()),
                ],
            );
        }
    }
}

impl<S: FrameSource> Drop for LatestByFactory<S> {
    fn drop(&mut self) {
        self.close();
    }
}
