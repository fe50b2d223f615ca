//! Bounded retry primitive tests.
//!
//! Uses Tokio's paused clock so deadlines and tick counts are exact.
//!
//! # Invariants
//! - With deadline `d` and tick `t` the check runs at most `d / t + 1` times
//! - Check errors abort without further attempts

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use common::*;
use proptest::prelude::*;
use search_client::poll::{Attempt, PollError, PollPolicy, poll};

fn never_ready(calls: Arc<AtomicU32>) -> impl FnMut(u32) -> std::future::Ready<Result<Attempt<()>, String>> {
    move |n| {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(Attempt::Pending(format!("0 records on attempt {n}"))))
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_deadline_runs_check_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = PollPolicy::deadline(Duration::ZERO, Duration::from_secs(5));

    let err = poll(&policy, never_ready(calls.clone())).await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(err, PollError::Exhausted { attempts: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_thirty_tick_five() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = PollPolicy::deadline(Duration::from_secs(30), Duration::from_secs(5));

    let err = poll(&policy, never_ready(calls.clone())).await.unwrap_err();

    match err {
        PollError::Exhausted {
            attempts,
            elapsed,
            last_diagnostic,
        } => {
            assert_eq!(attempts, 7);
            assert_eq!(elapsed, Duration::from_secs(30));
            assert_eq!(last_diagnostic, "0 records on attempt 7");
        }
        PollError::Aborted(e) => panic!("unexpected abort: {e}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 7);
}

#[tokio::test(start_paused = true)]
async fn test_ready_after_retries_reports_elapsed() {
    let policy = PollPolicy::deadline(Duration::from_secs(30), Duration::from_secs(5));

    let outcome = poll(&policy, |n| async move {
        if n < 3 {
            Ok::<_, String>(Attempt::Pending("not indexed yet".to_string()))
        } else {
            Ok(Attempt::Ready(n * 10))
        }
    })
    .await
    .unwrap();

    assert_eq!(outcome.value, 30);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.elapsed, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_check_error_aborts_immediately() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = PollPolicy::deadline(Duration::from_secs(30), Duration::from_secs(5));
    let counter = calls.clone();

    let err = poll(&policy, move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<Attempt<()>, _>("connection refused".to_string())
        }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, PollError::Aborted(ref e) if e == "connection refused"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poll_sleeps_between_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = PollPolicy::deadline(Duration::from_secs(30), Duration::from_secs(5));
    let check = never_ready(calls.clone());

    let handle = tokio::spawn(async move { poll(&policy, check).await });

    tokio::task::yield_now().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    advance_and_yield(Duration::from_secs(4)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    advance_and_yield(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    handle.abort();
}

proptest! {
    #[test]
    fn prop_invocations_bounded_by_deadline_over_tick(
        deadline_secs in 0u64..120,
        tick_secs in 1u64..15,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        let calls = Arc::new(AtomicU32::new(0));
        let policy = PollPolicy::deadline(
            Duration::from_secs(deadline_secs),
            Duration::from_secs(tick_secs),
        );
        let result = rt.block_on(poll(&policy, never_ready(calls.clone())));

        prop_assert!(result.is_err());
        let invoked = u64::from(calls.load(Ordering::SeqCst));
        prop_assert_eq!(invoked, deadline_secs / tick_secs + 1);
    }
}
