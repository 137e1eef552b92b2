//! Tick scheduler for Neologisms room timers.
//!
//! Every room with a configured game length owns one [`TickScheduler`]
//! running at 1 Hz. The scheduler is created stopped: a room's clock
//! only starts with the first card drawn, and stops again when the game
//! finishes or the board is refreshed.
//!
//! # Integration
//!
//! The scheduler sits inside the room actor's `tokio::select!` loop, so a
//! tick is just another event in the room's single serialized stream:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* player actions */ }
//!         info = scheduler.wait_for_tick() => {
//!             rules::tick(&mut room, info.elapsed_ticks());
//!         }
//!     }
//! }
//! ```
//!
//! [`TickScheduler::wait_for_tick`] is cancel-safe: losing a `select!`
//! race leaves the scheduler untouched.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the tick scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = the scheduler never fires.
    pub tick_rate_hz: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 1 }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Create a config for a specific tick rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self { tick_rate_hz }
    }

    /// Caps `tick_rate_hz` at [`Self::MAX_TICK_RATE_HZ`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick, or `None` when the rate is 0.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz)))
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Monotonically increasing tick number since the last `start` (starts at 1).
    pub tick: u64,
    /// Fixed duration of one tick.
    pub dt: Duration,
    /// Whole ticks that elapsed unobserved because the owner was busy.
    pub ticks_skipped: u64,
}

impl TickInfo {
    /// Ticks this event stands for: itself plus any skipped ones.
    ///
    /// A countdown should subtract this, not 1, so a stalled room does
    /// not gain time.
    pub fn elapsed_ticks(&self) -> u64 {
        self.ticks_skipped.saturating_add(1)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate tick scheduler for a single room.
#[derive(Debug)]
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    /// Deadline of the next tick; `None` while stopped.
    next_tick: Option<Instant>,
}

impl TickScheduler {
    /// Create a stopped scheduler. Call [`start`](Self::start) to begin ticking.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();
        debug!(rate_hz = config.tick_rate_hz, "tick scheduler created");
        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick: None,
        }
    }

    /// Create a stopped scheduler for a specific tick rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Start ticking. The first tick fires one tick duration from now.
    ///
    /// Restarting a running scheduler resets the tick count and deadline.
    pub fn start(&mut self) {
        let Some(dur) = self.tick_duration else {
            return;
        };
        self.tick_count = 0;
        self.next_tick = Some(Instant::now() + dur);
        debug!(rate_hz = self.config.tick_rate_hz, "tick scheduler started");
    }

    /// Stop ticking. `wait_for_tick` pends until the next `start`.
    ///
    /// Safe to call multiple times.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(tick = self.tick_count, "tick scheduler stopped");
        }
    }

    /// Wait until the next tick is due.
    ///
    /// While stopped (or at rate 0) this future never resolves; inside a
    /// `select!` the other branches keep running.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, tick_dur) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dur)) => (next, dur),
            _ => return std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        // Whole ticks that passed between the deadline and waking up.
        let late_by = now.saturating_duration_since(next);
        let ticks_skipped = u64::try_from(late_by.as_nanos() / tick_dur.as_nanos().max(1))
            .unwrap_or(u64::MAX);
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, folding skipped ticks into this one"
            );
        }

        // Keep the original cadence: next deadline is the first one after now.
        let periods = u32::try_from(ticks_skipped.saturating_add(1)).unwrap_or(u32::MAX);
        self.next_tick = Some(next + tick_dur * periods);

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: tick_dur,
            ticks_skipped,
        }
    }

    /// Whether the scheduler is currently running.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Whether this scheduler can never fire (tick rate = 0).
    pub fn is_disabled(&self) -> bool {
        self.tick_duration.is_none()
    }

    /// Ticks fired since the last `start`.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured tick rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// The fixed tick duration, or `None` when disabled.
    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}
