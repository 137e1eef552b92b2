//! Integration tests for the tick scheduler.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when the test
//! advances it (or when every task is idle and auto-advance kicks in).

use std::time::Duration;

use neologisms_tick::{TickConfig, TickScheduler};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_one_hz() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 1);
    assert_eq!(cfg.tick_duration(), Some(Duration::from_secs(1)));
}

#[test]
fn test_zero_rate_has_no_duration() {
    assert_eq!(TickConfig::with_rate(0).tick_duration(), None);
}

#[test]
fn test_validated_clamps_rate() {
    let cfg = TickConfig::with_rate(10_000).validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
}

// =========================================================================
// Start / stop
// =========================================================================

#[test]
fn test_new_scheduler_is_stopped() {
    let s = TickScheduler::with_rate(1);
    assert!(!s.is_running());
    assert!(!s.is_disabled());
    assert_eq!(s.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_scheduler_never_fires() {
    let mut s = TickScheduler::with_rate(1);
    let result = tokio::time::timeout(Duration::from_secs(30), s.wait_for_tick()).await;
    assert!(result.is_err(), "stopped scheduler should pend");
}

#[tokio::test(start_paused = true)]
async fn test_disabled_scheduler_ignores_start() {
    let mut s = TickScheduler::with_rate(0);
    s.start();
    assert!(s.is_disabled());
    assert!(!s.is_running());
    let result = tokio::time::timeout(Duration::from_secs(30), s.wait_for_tick()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_started_scheduler_fires_each_second() {
    let mut s = TickScheduler::with_rate(1);
    s.start();

    for expected in 1..=3 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
        assert_eq!(info.dt, Duration::from_secs(1));
        assert_eq!(info.ticks_skipped, 0);
        assert_eq!(info.elapsed_ticks(), 1);
    }
    assert_eq!(s.tick_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_then_start_resets_count() {
    let mut s = TickScheduler::with_rate(1);
    s.start();
    s.wait_for_tick().await;
    s.wait_for_tick().await;

    s.stop();
    s.stop();
    assert!(!s.is_running());

    s.start();
    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_wakeup_reports_skipped_ticks() {
    let mut s = TickScheduler::with_rate(1);
    s.start();

    // Nobody polls the scheduler for 3.5 s: one tick fires late and
    // accounts for the two it swallowed.
    tokio::time::advance(Duration::from_millis(3_500)).await;
    let info = s.wait_for_tick().await;
    assert_eq!(info.ticks_skipped, 2);
    assert_eq!(info.elapsed_ticks(), 3);

    // The cadence is preserved: the next tick lands at t = 4 s.
    let before = tokio::time::Instant::now();
    let info = s.wait_for_tick().await;
    assert_eq!(info.ticks_skipped, 0);
    assert_eq!(tokio::time::Instant::now() - before, Duration::from_millis(500));
}

// =========================================================================
// select! loop pattern (mirrors room actor usage)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = TickScheduler::with_rate(1);
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    tokio::spawn(async move {
        tx.send("start").await.ok();
        tokio::time::sleep(Duration::from_millis(3_200)).await;
        tx.send("stop").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                match cmd {
                    "start" => s.start(),
                    _ => break,
                }
            }
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                assert_eq!(info.tick, ticks_fired);
            }
        }
    }

    assert_eq!(ticks_fired, 3);
}
