//! Timer engine for the shared dashboard timer.
//!
//! This module provides the single shared stopwatch/countdown:
//! - State transitions (Idle → Running ⇄ Paused → Completed)
//! - One-second ticks driven by the dashboard clock
//! - Completion notification through the [`Notifier`]
//! - Snapshot publication over a `watch` channel

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::notification::{timer_finished_content, Notifier};
use crate::types::{clamp_seconds, TimerMode, TimerState};

// ============================================================================
// TimerEngine
// ============================================================================

/// Owns the canonical [`TimerState`] and the visibility hint.
///
/// Every mutation publishes a fresh snapshot to subscribers.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Whether presentation surfaces should show the timer
    visible: bool,
    /// Completion cue sink
    notifier: Arc<dyn Notifier>,
    /// Snapshot publisher
    state_tx: watch::Sender<TimerState>,
}

impl TimerEngine {
    /// Creates an inactive, hidden stopwatch at zero.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let state = TimerState::new();
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            state,
            visible: false,
            notifier,
            state_tx,
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> TimerState {
        self.state.clone()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_tx.subscribe()
    }

    /// Returns true if surfaces should show the timer.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets the visibility hint.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.publish();
    }

    /// Starts a new session, replacing whatever was running.
    ///
    /// Negative seconds are clamped to 0. A zero-length countdown starts
    /// already completed and never notifies.
    pub fn start(&mut self, initial_time: i64, mode: TimerMode, label: Option<String>) {
        let initial_time = clamp_seconds(initial_time);
        let is_running = !(mode == TimerMode::Timer && initial_time == 0);

        self.state = TimerState {
            is_active: true,
            is_running,
            time: initial_time,
            mode,
            initial_time,
            label,
        };
        self.visible = true;

        debug!(
            "Timer started: mode={}, time={}, running={}",
            mode.as_str(),
            initial_time,
            is_running
        );
        self.publish();
    }

    /// Pauses a running timer. No-op otherwise.
    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }
        self.state.is_running = false;
        debug!("Timer paused at {}", self.state.time);
        self.publish();
    }

    /// Resumes a paused timer.
    ///
    /// No-op when inactive, already running, or on a completed countdown.
    pub fn resume(&mut self) {
        if !self.state.is_active || self.state.is_running || self.state.is_completed() {
            return;
        }
        self.state.is_running = true;
        debug!("Timer resumed at {}", self.state.time);
        self.publish();
    }

    /// Stops and clears the timer, hiding it.
    pub fn stop(&mut self) {
        self.state.is_active = false;
        self.state.is_running = false;
        self.state.time = 0;
        self.visible = false;
        debug!("Timer stopped");
        self.publish();
    }

    /// Rewinds to the start value without changing `is_active`.
    pub fn reset(&mut self) {
        self.state.time = match self.state.mode {
            TimerMode::Timer => self.state.initial_time,
            TimerMode::Stopwatch => 0,
        };
        self.state.is_running = false;
        debug!("Timer reset to {}", self.state.time);
        self.publish();
    }

    /// Advances a running timer by one second.
    ///
    /// Returns true when a countdown reached zero on this tick.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_running {
            return false;
        }

        let completed = match self.state.mode {
            TimerMode::Stopwatch => {
                self.state.time = self.state.time.saturating_add(1);
                false
            }
            TimerMode::Timer => {
                self.state.time = self.state.time.saturating_sub(1);
                if self.state.time == 0 {
                    self.state.is_running = false;
                    true
                } else {
                    false
                }
            }
        };

        self.publish();

        if completed {
            debug!("Countdown completed");
            let content = timer_finished_content(self.state.label.as_deref());
            self.notifier.notify(&content.title, &content.body);
        }

        completed
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================
