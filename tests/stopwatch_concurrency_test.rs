//! Race and scenario tests for the per-user stopwatch store.
//!
//! # Test Coverage
//!
//! - Concurrent starts for one owner: exactly one winner, one entry
//! - Concurrent stops for one owner: exactly one final time, no entry left
//! - Lap is read-only and monotonically non-decreasing
//! - Sequential start/stop lifecycle and not-running cases
//! - Owners do not interfere with each other

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tickline::backend::memory::MemoryBackend;
use tickline::stopwatch::{LapOutcome, StartOutcome, StopwatchStore};

fn memory_store() -> StopwatchStore {
    StopwatchStore::new(Arc::new(MemoryBackend::new()))
}

// ============================================================================
// Concurrent create/consume races
// ============================================================================

#[tokio::test]
async fn concurrent_starts_have_exactly_one_winner() {
    let store = memory_store();

    let outcomes = join_all((0..16).map(|_| {
        let store = store.clone();
        async move {
            store
                .start("u1")
                .await
                .expect("start should reach the backend")
        }
    }))
    .await;

    let winners = outcomes
        .iter()
        .filter(|o| **o == StartOutcome::Started)
        .count();
    assert_eq!(winners, 1, "exactly one concurrent start may create the entry");
    assert_eq!(outcomes.len() - winners, 15);

    // The one surviving entry is observable afterwards.
    assert!(matches!(
        store.lap("u1").await.unwrap(),
        LapOutcome::Running(_)
    ));
}

#[tokio::test]
async fn concurrent_stops_have_exactly_one_winner() {
    let store = memory_store();
    store.start("u1").await.unwrap();

    let outcomes = join_all((0..16).map(|_| {
        let store = store.clone();
        async move {
            store
                .stop("u1")
                .await
                .expect("stop should reach the backend")
        }
    }))
    .await;

    let finals = outcomes
        .iter()
        .filter(|o| matches!(o, LapOutcome::Running(_)))
        .count();
    assert_eq!(finals, 1, "exactly one concurrent stop may consume the entry");

    // No entry remains once the dust settles.
    assert!(matches!(
        store.lap("u1").await.unwrap(),
        LapOutcome::NotRunning
    ));
}

// ============================================================================
// Lap semantics
// ============================================================================

#[tokio::test]
async fn lap_is_monotonic_and_non_destructive() {
    let store = memory_store();
    store.start("u2").await.unwrap();

    let LapOutcome::Running(first) = store.lap("u2").await.unwrap() else {
        panic!("stopwatch should be running");
    };
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let LapOutcome::Running(second) = store.lap("u2").await.unwrap() else {
        panic!("stopwatch should be running");
    };

    assert!(second >= first, "elapsed time must not go backwards");
    // Lap never consumes the entry.
    assert!(matches!(
        store.lap("u2").await.unwrap(),
        LapOutcome::Running(_)
    ));
}

#[tokio::test]
async fn lap_without_start_reports_not_running() {
    let store = memory_store();
    assert!(matches!(
        store.lap("u2").await.unwrap(),
        LapOutcome::NotRunning
    ));
}

// ============================================================================
// Sequential scenarios
// ============================================================================

#[tokio::test]
async fn start_stop_lifecycle() {
    let store = memory_store();

    assert_eq!(store.start("u1").await.unwrap(), StartOutcome::Started);
    assert_eq!(
        store.start("u1").await.unwrap(),
        StartOutcome::AlreadyRunning
    );

    assert!(matches!(
        store.stop("u1").await.unwrap(),
        LapOutcome::Running(_)
    ));
    // Second stop finds nothing; a benign outcome, not an error.
    assert!(matches!(
        store.stop("u1").await.unwrap(),
        LapOutcome::NotRunning
    ));
}

#[tokio::test]
async fn owners_are_independent() {
    let store = memory_store();

    assert_eq!(store.start("u1").await.unwrap(), StartOutcome::Started);
    assert_eq!(store.start("u2").await.unwrap(), StartOutcome::Started);

    store.stop("u1").await.unwrap();

    // u2's timer is untouched by u1's stop.
    assert!(matches!(
        store.lap("u2").await.unwrap(),
        LapOutcome::Running(_)
    ));
}

#[tokio::test]
async fn restart_after_stop_is_a_fresh_timer() {
    let store = memory_store();

    store.start("u1").await.unwrap();
    store.stop("u1").await.unwrap();
    assert_eq!(store.start("u1").await.unwrap(), StartOutcome::Started);
}
