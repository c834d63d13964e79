//! Tick sources for the timer engine.
//!
//! Everything that advances with time (the shared timer and the multi-timer
//! registry) is driven through [`TickSource`]. The daemon uses
//! [`IntervalClock`]; tests substitute a [`ManualClock`] and advance it by
//! hand, so no test depends on wall-clock sleeps.

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Period of one tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A source of periodic one-second pulses.
#[allow(async_fn_in_trait)]
pub trait TickSource {
    /// Waits for the next tick.
    ///
    /// Returns `false` once the source is exhausted and no further ticks
    /// will arrive.
    async fn next_tick(&mut self) -> bool;
}

// ============================================================================
// IntervalClock
// ============================================================================

/// Real clock backed by `tokio::time::interval`.
pub struct IntervalClock {
    ticker: Interval,
}

impl IntervalClock {
    /// Creates a one-second clock.
    ///
    /// The first tick fires one period after creation. Missed ticks are
    /// skipped rather than replayed in a burst.
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Creates a clock with a custom period.
    pub fn with_period(period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.reset();
        Self { ticker }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for IntervalClock {
    async fn next_tick(&mut self) -> bool {
        self.ticker.tick().await;
        true
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Manually advanced clock for deterministic tests.
///
/// Ticks are queued through the paired [`ManualClockHandle`]. Once every
/// handle is dropped and the queue is drained, `next_tick` returns `false`.
pub struct ManualClock {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Handle used to push ticks into a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct ManualClockHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualClock {
    /// Creates a clock and its handle.
    pub fn new() -> (Self, ManualClockHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualClockHandle { tx })
    }
}

impl ManualClockHandle {
    /// Queues `ticks` pulses.
    pub fn advance(&self, ticks: u32) {
        for _ in 0..ticks {
            if self.tx.send(()).is_err() {
                tracing::debug!("Manual clock dropped; ignoring advance");
                return;
            }
        }
    }
}

impl TickSource for ManualClock {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_delivers_queued_ticks() {
        let (mut clock, handle) = ManualClock::new();
        handle.advance(3);
        drop(handle);

        let mut count = 0;
        while clock.next_tick().await {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_manual_clock_exhausted_without_handle() {
        let (mut clock, handle) = ManualClock::new();
        drop(handle);
        assert!(!clock.next_tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_clock_ticks_once_per_period() {
        let mut clock = IntervalClock::new();
        let start = tokio::time::Instant::now();

        assert!(clock.next_tick().await);
        assert!(clock.next_tick().await);

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }
}
