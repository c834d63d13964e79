//! Pomodoro session cycling.
//!
//! A policy layer over the shared countdown: when a phase completes the
//! dashboard asks the [`PomodoroCycle`] for the next phase and restarts the
//! engine with it.

use serde::{Deserialize, Serialize};

use crate::notification::{
    break_complete_content, work_session_complete_content, NotificationContent,
};

// ============================================================================
// PomodoroPolicy
// ============================================================================

/// Phase lengths and long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroPolicy {
    /// Work phase length in seconds
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,
    /// Short break length in seconds
    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u32,
    /// Long break length in seconds
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: u32,
    /// Every Nth break is a long one
    #[serde(default = "default_long_break_every")]
    pub long_break_every: u32,
}

fn default_work_secs() -> u32 {
    25 * 60
}

fn default_short_break_secs() -> u32 {
    5 * 60
}

fn default_long_break_secs() -> u32 {
    15 * 60
}

fn default_long_break_every() -> u32 {
    4
}

impl Default for PomodoroPolicy {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            long_break_every: default_long_break_every(),
        }
    }
}

impl PomodoroPolicy {
    /// Validates the policy.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.work_secs == 0 {
            return Err("作業時間は1秒以上で指定してください".to_string());
        }
        if self.short_break_secs == 0 {
            return Err("短い休憩時間は1秒以上で指定してください".to_string());
        }
        if self.long_break_secs == 0 {
            return Err("長い休憩時間は1秒以上で指定してください".to_string());
        }
        if self.long_break_every == 0 {
            return Err("長い休憩の間隔は1以上で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// PomodoroCycle
// ============================================================================

/// Label used for every break phase.
pub const BREAK_LABEL: &str = "Pomodoro Break";

/// Session counter and current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroCycle {
    /// 1-based work session number
    pub session: u32,
    /// True during a break
    pub is_break: bool,
}

impl Default for PomodoroCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// What the engine should do after a pomodoro phase completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Length of the next phase in seconds
    pub duration: u32,
    /// Label for the next phase
    pub label: String,
    /// True when the next phase is a long break
    pub is_long_break: bool,
    /// Cue for the phase that just completed
    pub content: NotificationContent,
}

impl PomodoroCycle {
    /// Creates a cycle at session 1, work phase.
    pub fn new() -> Self {
        Self {
            session: 1,
            is_break: false,
        }
    }

    /// Returns the label of the current phase.
    pub fn label(&self) -> String {
        if self.is_break {
            BREAK_LABEL.to_string()
        } else {
            format!("Pomodoro Session {}", self.session)
        }
    }

    /// Length of the current phase under the given policy.
    pub fn phase_duration(&self, policy: &PomodoroPolicy) -> u32 {
        if !self.is_break {
            policy.work_secs
        } else if self.is_long_break(policy) {
            policy.long_break_secs
        } else {
            policy.short_break_secs
        }
    }

    /// Advances past the phase that just completed.
    pub fn complete_phase(&mut self, policy: &PomodoroPolicy) -> PhaseTransition {
        if self.is_break {
            self.is_break = false;
            return PhaseTransition {
                duration: policy.work_secs,
                label: self.label(),
                is_long_break: false,
                content: break_complete_content(),
            };
        }

        self.session = self.session.saturating_add(1);
        self.is_break = true;
        let is_long_break = self.is_long_break(policy);

        PhaseTransition {
            duration: self.phase_duration(policy),
            label: self.label(),
            is_long_break,
            content: work_session_complete_content(is_long_break),
        }
    }

    // Evaluated after the session counter has advanced past the work phase.
    fn is_long_break(&self, policy: &PomodoroPolicy) -> bool {
        let every = policy.long_break_every.max(1);
        self.session > 1 && (self.session - 1) % every == 0
    }
}

// ============================================================================
// SessionKind
// ============================================================================

/// Which kind of session the shared timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Stopwatch,
    Countdown,
    Pomodoro(PomodoroCycle),
}

impl SessionKind {
    /// Returns the string representation of the session kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Stopwatch => "stopwatch",
            SessionKind::Countdown => "countdown",
            SessionKind::Pomodoro(_) => "pomodoro",
        }
    }

    /// Returns the pomodoro counters when in a pomodoro session.
    pub fn pomodoro(&self) -> Option<&PomodoroCycle> {
        match self {
            SessionKind::Pomodoro(cycle) => Some(cycle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod policy_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let policy = PomodoroPolicy::default();
            assert_eq!(policy.work_secs, 1500);
            assert_eq!(policy.short_break_secs, 300);
            assert_eq!(policy.long_break_secs, 900);
            assert_eq!(policy.long_break_every, 4);
            assert!(policy.validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_zero() {
            let mut policy = PomodoroPolicy::default();
            policy.work_secs = 0;
            assert!(policy.validate().is_err());

            let mut policy = PomodoroPolicy::default();
            policy.long_break_every = 0;
            assert!(policy.validate().is_err());
        }

        #[test]
        fn test_partial_json_uses_defaults() {
            let policy: PomodoroPolicy = serde_json::from_str(r#"{"workSecs": 60}"#).unwrap();
            assert_eq!(policy.work_secs, 60);
            assert_eq!(policy.short_break_secs, 300);
        }
    }

    mod cycle_tests {
        use super::*;

        #[test]
        fn test_new_cycle() {
            let cycle = PomodoroCycle::new();
            assert_eq!(cycle.session, 1);
            assert!(!cycle.is_break);
            assert_eq!(cycle.label(), "Pomodoro Session 1");
            assert_eq!(cycle.phase_duration(&PomodoroPolicy::default()), 1500);
        }

        #[test]
        fn test_work_completion_starts_short_break() {
            let policy = PomodoroPolicy::default();
            let mut cycle = PomodoroCycle::new();

            let transition = cycle.complete_phase(&policy);

            assert_eq!(cycle.session, 2);
            assert!(cycle.is_break);
            assert_eq!(transition.duration, 300);
            assert_eq!(transition.label, "Pomodoro Break");
            assert!(!transition.is_long_break);
            assert_eq!(transition.content.title, "Work Session Complete!");
            assert_eq!(transition.content.body, "Time for a short break");
        }

        #[test]
        fn test_break_completion_starts_work() {
            let policy = PomodoroPolicy::default();
            let mut cycle = PomodoroCycle::new();
            cycle.complete_phase(&policy);

            let transition = cycle.complete_phase(&policy);

            assert!(!cycle.is_break);
            assert_eq!(cycle.session, 2);
            assert_eq!(transition.duration, 1500);
            assert_eq!(transition.label, "Pomodoro Session 2");
            assert_eq!(transition.content.title, "Break Complete!");
            assert_eq!(transition.content.body, "Time to get back to work");
        }

        #[test]
        fn test_long_break_on_fourth_work_completion() {
            let policy = PomodoroPolicy::default();
            let mut cycle = PomodoroCycle::new();
            let mut breaks = Vec::new();

            for _ in 0..4 {
                let work_done = cycle.complete_phase(&policy);
                breaks.push(work_done.is_long_break);
                cycle.complete_phase(&policy);
            }

            assert_eq!(breaks, vec![false, false, false, true]);
        }

        #[test]
        fn test_long_break_duration() {
            let policy = PomodoroPolicy::default();
            let mut cycle = PomodoroCycle {
                session: 4,
                is_break: false,
            };

            let transition = cycle.complete_phase(&policy);
            assert!(transition.is_long_break);
            assert_eq!(transition.duration, 900);
            assert_eq!(transition.content.body, "Time for a long break");
        }

        #[test]
        fn test_custom_cadence() {
            let policy = PomodoroPolicy {
                long_break_every: 2,
                ..PomodoroPolicy::default()
            };
            let mut cycle = PomodoroCycle::new();
            let mut breaks = Vec::new();

            for _ in 0..4 {
                breaks.push(cycle.complete_phase(&policy).is_long_break);
                cycle.complete_phase(&policy);
            }

            assert_eq!(breaks, vec![false, true, false, true]);
        }
    }

    mod session_kind_tests {
        use super::*;

        #[test]
        fn test_serialize_pomodoro() {
            let kind = SessionKind::Pomodoro(PomodoroCycle::new());
            let json = serde_json::to_string(&kind).unwrap();
            assert!(json.contains(r#""kind":"pomodoro""#));
            assert!(json.contains(r#""session":1"#));
            assert!(json.contains(r#""isBreak":false"#));

            let back: SessionKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }

        #[test]
        fn test_serialize_unit_variants() {
            let json = serde_json::to_string(&SessionKind::Countdown).unwrap();
            assert_eq!(json, r#"{"kind":"countdown"}"#);
        }

        #[test]
        fn test_pomodoro_accessor() {
            assert!(SessionKind::Stopwatch.pomodoro().is_none());
            let kind = SessionKind::Pomodoro(PomodoroCycle::new());
            assert_eq!(kind.pomodoro().map(|c| c.session), Some(1));
            assert_eq!(kind.as_str(), "pomodoro");
        }
    }
}
