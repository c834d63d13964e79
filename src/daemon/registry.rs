//! Multi-timer registry.
//!
//! An independent list of named countdowns ticked by the same clock as the
//! shared timer but never touching it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::notification::{multi_timer_complete_content, Notifier};
use crate::types::{clamp_seconds, SingleTimer};

/// Ordered collection of [`SingleTimer`] entries.
pub struct MultiTimerRegistry {
    timers: Vec<SingleTimer>,
    notifier: Arc<dyn Notifier>,
    timers_tx: watch::Sender<Vec<SingleTimer>>,
}

impl MultiTimerRegistry {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (timers_tx, _) = watch::channel(Vec::new());
        Self {
            timers: Vec::new(),
            notifier,
            timers_tx,
        }
    }

    /// Returns the entries in insertion order.
    pub fn list(&self) -> Vec<SingleTimer> {
        self.timers.clone()
    }

    /// Returns a receiver that observes every change to the list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<SingleTimer>> {
        self.timers_tx.subscribe()
    }

    /// Appends a stopped countdown and returns its id.
    ///
    /// A blank name becomes `"Timer N"`. A zero duration yields an entry
    /// that is already completed.
    pub fn add_timer(&mut self, name: &str, initial_time: i64) -> String {
        let initial_time = clamp_seconds(initial_time);
        let name = if name.trim().is_empty() {
            format!("Timer {}", self.timers.len() + 1)
        } else {
            name.to_string()
        };
        let id = Uuid::new_v4().to_string();

        debug!("Multi-timer added: {} ({}s)", name, initial_time);
        self.timers.push(SingleTimer {
            id: id.clone(),
            name,
            time: initial_time,
            initial_time,
            is_running: false,
            is_completed: initial_time == 0,
        });
        self.publish();
        id
    }

    /// Flips the running flag. Completed entries are left alone.
    ///
    /// Returns false if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if !timer.is_completed {
            timer.is_running = !timer.is_running;
            debug!("Multi-timer {} running={}", timer.name, timer.is_running);
            self.publish();
        }
        true
    }

    /// Rewinds an entry to its initial duration, stopped.
    ///
    /// Returns false if the id is unknown.
    pub fn reset(&mut self, id: &str) -> bool {
        let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        timer.time = timer.initial_time;
        timer.is_running = false;
        timer.is_completed = timer.time == 0;
        self.publish();
        true
    }

    /// Deletes an entry.
    ///
    /// Returns false if the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        let removed = self.timers.len() != before;
        if removed {
            self.publish();
        }
        removed
    }

    /// Advances every running entry by one second.
    ///
    /// Returns the number of entries that completed on this tick.
    pub fn tick(&mut self) -> usize {
        let mut completed = Vec::new();
        let mut changed = false;

        for timer in self.timers.iter_mut() {
            if !timer.is_running || timer.is_completed {
                continue;
            }
            changed = true;
            timer.time = timer.time.saturating_sub(1);
            if timer.time == 0 {
                timer.is_running = false;
                timer.is_completed = true;
                completed.push(timer.name.clone());
            }
        }

        if changed {
            self.publish();
        }

        for name in &completed {
            debug!("Multi-timer completed: {}", name);
            let content = multi_timer_complete_content(name);
            self.notifier.notify(&content.title, &content.body);
        }

        completed.len()
    }

    fn publish(&self) {
        self.timers_tx.send_replace(self.timers.clone());
    }
}
