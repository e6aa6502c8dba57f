//! Indexed/Unindexed Equivalence Tests
//!
//! The bitmap index is an access-path optimization only: for any table,
//! key set, and filter, the indexed and unindexed scans must produce
//! identical result row sets. Verified on fixed tables and on randomized
//! tables.

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use chronodb::config::EngineConfig;
use chronodb::exec::ExecutionContext;
use chronodb::frame::{FrameStore, RowId};
use chronodb::latest::{
    LatestByFactory, Predicate, PredicateRowFilter, RowFilter, ValueExtractor, VecSubPlan,
};

// =============================================================================
// Helper Functions
// =============================================================================

const SYMBOLS: &[&str] = &["A", "B", "C", "D", "E"];

/// Builds a randomized multi-partition table. The same seed produces the
/// same table for the indexed and unindexed runs.
fn random_store(indexed: bool, seed: u64, partitions: usize, rows_per_partition: usize) -> FrameStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = FrameStore::new(indexed);
    let mut ts = 0i64;
    for day in 0..partitions {
        store
            .begin_partition(Utc.with_ymd_and_hms(2024, 1, day as u32 + 1, 0, 0, 0).unwrap())
            .unwrap();
        for _ in 0..rows_per_partition {
            let sym = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
            ts += 1;
            store.append(sym, &[("ts", json!(ts))]).unwrap();
        }
    }
    store
}

fn run(store: FrameStore, keys: &[&str], filter: Option<Box<dyn RowFilter>>) -> Vec<RowId> {
    let mut factory = LatestByFactory::with_sub_query(
        &EngineConfig::default(),
        store,
        Box::new(VecSubPlan::new(keys.iter().copied())),
        ValueExtractor::Text,
        filter,
    );
    let ctx = ExecutionContext::new();
    factory.execute(&ctx).unwrap().collect()
}

fn low_ts_filter() -> Box<dyn RowFilter> {
    // Rejects the newest rows, forcing both paths through their
    // fall-back-to-older-rows behavior.
    Box::new(PredicateRowFilter::new(vec![Predicate::lte(
        "ts",
        json!(60),
    )]))
}

// =============================================================================
// Fixed Tables
// =============================================================================

/// Indexed and unindexed scans agree on the reference table.
#[test]
fn test_equivalence_reference_table() {
    let build = |indexed: bool| {
        let mut store = FrameStore::new(indexed);
        store
            .begin_partition(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        for (sym, ts) in [("A", 1), ("B", 2), ("A", 3), ("B", 4)] {
            store.append(sym, &[("ts", json!(ts))]).unwrap();
        }
        store
    };

    let unindexed = run(build(false), &["A", "B"], None);
    let indexed = run(build(true), &["A", "B"], None);
    assert_eq!(unindexed, indexed);
    assert_eq!(unindexed.len(), 2);
}

/// Disabling indexed scans in configuration is equivalent to an
/// unindexed table.
#[test]
fn test_config_disables_index_use() {
    let mut store = FrameStore::new(true);
    store
        .begin_partition(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    for (sym, ts) in [("A", 1), ("B", 2), ("A", 3)] {
        store.append(sym, &[("ts", json!(ts))]).unwrap();
    }

    let mut factory = LatestByFactory::with_sub_query(
        &EngineConfig::unindexed(),
        store,
        Box::new(VecSubPlan::new(["A", "B"])),
        ValueExtractor::Text,
        None,
    );
    let ctx = ExecutionContext::new();

    let rows: Vec<_> = factory.execute(&ctx).unwrap().collect();
    assert_eq!(rows, vec![1, 2]);
}

// =============================================================================
// Randomized Tables
// =============================================================================

/// Unfiltered equivalence across random tables.
#[test]
fn test_equivalence_randomized() {
    for seed in 0..10 {
        let unindexed = run(random_store(false, seed, 4, 25), SYMBOLS, None);
        let indexed = run(random_store(true, seed, 4, 25), SYMBOLS, None);
        assert_eq!(unindexed, indexed, "seed {}", seed);
    }
}

/// Filtered equivalence across random tables.
#[test]
fn test_equivalence_randomized_filtered() {
    for seed in 0..10 {
        let unindexed = run(
            random_store(false, seed, 4, 25),
            SYMBOLS,
            Some(low_ts_filter()),
        );
        let indexed = run(
            random_store(true, seed, 4, 25),
            SYMBOLS,
            Some(low_ts_filter()),
        );
        assert_eq!(unindexed, indexed, "seed {}", seed);
    }
}

/// Re-executing one factory against an unchanged table is idempotent.
#[test]
fn test_idempotent_re_execution() {
    let mut factory = LatestByFactory::with_sub_query(
        &EngineConfig::default(),
        random_store(true, 42, 3, 20),
        Box::new(VecSubPlan::new(SYMBOLS.iter().copied())),
        ValueExtractor::Text,
        None,
    );
    let ctx = ExecutionContext::new();

    let first: Vec<_> = factory.execute(&ctx).unwrap().collect();
    let second: Vec<_> = factory.execute(&ctx).unwrap().collect();
    let third: Vec<_> = factory.execute(&ctx).unwrap().collect();

    assert_eq!(first, second);
    assert_eq!(second, third);
}
