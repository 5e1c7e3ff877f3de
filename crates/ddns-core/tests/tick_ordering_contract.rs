//! Contract Test: Tick Ordering
//!
//! This test verifies that polling ticks are strictly sequential.
//!
//! Constraints verified:
//! - Never more than one tick in flight
//! - The next tick starts a full interval after the previous one completes
//! - A slow tick delays later ticks instead of causing a burst of catch-up ticks
//! - The first tick fires one interval after start, not immediately
//!
//! If this test fails, someone has replaced the completion-relative
//! schedule with a wall-clock ticker that can double-fire.

mod common;

use common::*;
use ddns_core::{CancellationToken, ControllerEvent, DdnsController};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn slow_ticks_never_overlap() {
    // Each lookup takes 2.5 intervals.
    let resolver = ScriptedResolver::fixed("1.2.3.4")
        .with_delay(Duration::from_secs(INTERVAL_SECS * 5 / 2));
    let (controller, mut events) = DdnsController::new(
        Box::new(resolver.clone()),
        Box::new(MockDnsProvider::with_record(existing_record("1.2.3.4"))),
        Box::new(CountingNotifier::new()),
        minimal_config(),
    )
    .expect("controller construction succeeds");

    let cancel = CancellationToken::new();
    let handle = controller.start(cancel.clone()).await.expect("initialization succeeds");

    run_for_ticks(20).await;
    cancel.cancel();
    handle.wait().await.expect("clean shutdown");

    assert_eq!(resolver.max_in_flight(), 1, "Ticks must never overlap");

    // Each tick costs interval + 2.5 intervals, so 200s holds ~5 ticks, not 20.
    let spans = resolver.spans();
    assert!(
        (5..=6).contains(&spans.len()),
        "Expected 5-6 completed ticks, got {}",
        spans.len()
    );

    for pair in spans.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        assert!(
            next_start >= prev_end + Duration::from_secs(INTERVAL_SECS),
            "Next tick started {:?} after previous finished",
            next_start - prev_end
        );
    }

    // Start/finish events strictly alternate.
    let markers: Vec<ControllerEvent> = drain_events(&mut events)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                ControllerEvent::TickStarted | ControllerEvent::TickFinished
            )
        })
        .collect();
    for (i, marker) in markers.iter().enumerate() {
        let expected = if i % 2 == 0 {
            ControllerEvent::TickStarted
        } else {
            ControllerEvent::TickFinished
        };
        assert_eq!(marker, &expected, "Tick markers out of order at {i}");
    }
}

#[tokio::test(start_paused = true)]
async fn first_tick_waits_one_interval() {
    let resolver = ScriptedResolver::fixed("1.2.3.4");
    let (controller, _events) = DdnsController::new(
        Box::new(resolver.clone()),
        Box::new(MockDnsProvider::with_record(existing_record("1.2.3.4"))),
        Box::new(CountingNotifier::new()),
        minimal_config(),
    )
    .expect("controller construction succeeds");

    let cancel = CancellationToken::new();
    let handle = controller.start(cancel.clone()).await.expect("initialization succeeds");

    tokio::time::sleep(Duration::from_secs(INTERVAL_SECS - 1)).await;
    assert_eq!(resolver.calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(resolver.calls(), 1);

    cancel.cancel();
    handle.wait().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn fast_ticks_follow_the_interval() {
    let resolver = ScriptedResolver::fixed("1.2.3.4");
    let (controller, _events) = DdnsController::new(
        Box::new(resolver.clone()),
        Box::new(MockDnsProvider::with_record(existing_record("1.2.3.4"))),
        Box::new(CountingNotifier::new()),
        minimal_config(),
    )
    .expect("controller construction succeeds");

    let cancel = CancellationToken::new();
    let handle = controller.start(cancel.clone()).await.expect("initialization succeeds");

    run_for_ticks(6).await;
    cancel.cancel();
    handle.wait().await.expect("clean shutdown");

    assert_eq!(resolver.calls(), 6);
}
