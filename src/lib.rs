//! focusdeck library
//!
//! This library provides the global timer engine behind the focusdeck
//! dashboard. It includes:
//! - Timer engine for the shared stopwatch/countdown
//! - Pomodoro session cycling and an independent multi-timer registry
//! - Injectable tick sources (real interval clock and a manual test clock)
//! - Desktop notifications and synthesized completion tones
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod cli;
pub mod clock;
pub mod config;
pub mod daemon;
pub mod notification;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_time, parse_time_input, IpcRequest, IpcResponse, ResponseData, SingleTimer,
    SoundSettings, SoundType, StartMode, StartParams, TimerMode, TimerPreset, TimerState,
};

pub use clock::{IntervalClock, ManualClock, ManualClockHandle, TickSource};
pub use config::ServiceConfig;

pub use daemon::{
    Dashboard, MultiTimerRegistry, PomodoroCycle, PomodoroPolicy, SessionKind, SharedDashboard,
    TimerEngine,
};

// Re-export notification types
pub use notification::{
    DesktopNotificationSender, MockNotificationSender, MockNotifier, NotificationEmitter,
    NotificationError, NotificationPermission, NotificationSender, Notifier,
};

// Re-export sound types
pub use sound::{MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer, Tone};
