//! Core data types for the dashboard timer.
//!
//! This module defines the data structures used for:
//! - The shared timer snapshot published to every surface
//! - Multi-timer entries and timer presets
//! - Sound settings and time formatting helpers
//! - IPC request/response serialization

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::daemon::pomodoro::SessionKind;

/// Number of seconds a countdown must be at or under to count as "low time".
pub const LOW_TIME_THRESHOLD_SECS: u32 = 5;

// ============================================================================
// TimerMode
// ============================================================================

/// Counting direction of the shared timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Counts up from the start value without bound
    #[default]
    Stopwatch,
    /// Counts down to zero
    Timer,
}

impl TimerMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Stopwatch => "stopwatch",
            TimerMode::Timer => "timer",
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Snapshot of the single shared timer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// True from `start` until `stop`
    pub is_active: bool,
    /// True while ticking
    pub is_running: bool,
    /// Elapsed (stopwatch) or remaining (timer) seconds
    pub time: u32,
    /// Counting direction
    pub mode: TimerMode,
    /// Countdown start value, used for progress and reset
    pub initial_time: u32,
    /// Descriptive session name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TimerState {
    /// Creates an inactive stopwatch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns countdown progress as a percentage in `0.0..=100.0`.
    ///
    /// Always 0 for stopwatches and zero-length countdowns.
    pub fn progress(&self) -> f64 {
        if self.mode == TimerMode::Stopwatch || self.initial_time == 0 {
            return 0.0;
        }
        let elapsed = self.initial_time.saturating_sub(self.time);
        f64::from(elapsed) / f64::from(self.initial_time) * 100.0
    }

    /// Returns true when a countdown is about to finish.
    pub fn is_low_time(&self) -> bool {
        self.mode == TimerMode::Timer && self.time > 0 && self.time <= LOW_TIME_THRESHOLD_SECS
    }

    /// Returns true if an active countdown has reached zero.
    pub fn is_completed(&self) -> bool {
        self.is_active && self.mode == TimerMode::Timer && self.time == 0 && !self.is_running
    }

    /// Returns true if the timer is active but not ticking.
    pub fn is_paused(&self) -> bool {
        self.is_active && !self.is_running && !self.is_completed()
    }
}

/// Clamps caller-supplied seconds into the representable range.
///
/// Negative values become 0.
pub fn clamp_seconds(seconds: i64) -> u32 {
    u32::try_from(seconds.max(0)).unwrap_or(u32::MAX)
}

// ============================================================================
// SingleTimer
// ============================================================================

/// One entry of the multi-timer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleTimer {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Remaining seconds
    pub time: u32,
    /// Original duration
    pub initial_time: u32,
    /// True while ticking
    pub is_running: bool,
    /// True once `time` has reached 0
    pub is_completed: bool,
}

// ============================================================================
// Sound settings
// ============================================================================

/// Tone played alongside completion notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Beep,
    Chime,
    Bell,
    Notification,
    /// Silent
    None,
}

impl SoundType {
    /// Returns the string representation of the sound type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundType::Beep => "beep",
            SoundType::Chime => "chime",
            SoundType::Bell => "bell",
            SoundType::Notification => "notification",
            SoundType::None => "none",
        }
    }
}

impl FromStr for SoundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beep" => Ok(SoundType::Beep),
            "chime" => Ok(SoundType::Chime),
            "bell" => Ok(SoundType::Bell),
            "notification" => Ok(SoundType::Notification),
            "none" => Ok(SoundType::None),
            other => Err(format!(
                "不明なサウンド種別です: {} (beep, chime, bell, notification, none)",
                other
            )),
        }
    }
}

/// Sound type and volume used by the notification emitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSettings {
    #[serde(default)]
    pub sound_type: SoundType,
    /// Linear gain in `0.0..=1.0`
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    0.5
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            sound_type: SoundType::default(),
            volume: default_volume(),
        }
    }
}

impl SoundSettings {
    /// Validates the settings.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err("音量は0.0-1.0の範囲で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerPreset
// ============================================================================

/// A saved countdown duration with its sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerPreset {
    pub id: String,
    pub name: String,
    /// Duration in seconds
    pub time: u32,
    pub sound_type: SoundType,
}

impl TimerPreset {
    /// Creates a preset.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        time: u32,
        sound_type: SoundType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            time,
            sound_type,
        }
    }
}

/// Presets available on a fresh start.
pub fn default_presets() -> Vec<TimerPreset> {
    vec![
        TimerPreset::new("1", "Quick Break", 5 * 60, SoundType::Chime),
        TimerPreset::new("2", "Tea Timer", 3 * 60, SoundType::Bell),
        TimerPreset::new("3", "Meeting", 30 * 60, SoundType::Notification),
        TimerPreset::new("4", "Focus Session", 45 * 60, SoundType::Beep),
    ]
}

// ============================================================================
// Time formatting
// ============================================================================

/// Formats seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_time(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Parses `M` (minutes), `MM:SS` or `HH:MM:SS` into seconds.
///
/// Anything unparseable yields 0.
pub fn parse_time_input(input: &str) -> u32 {
    let parts: Option<Vec<u32>> = input
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect();

    let seconds = match parts.as_deref() {
        Some([minutes]) => u64::from(*minutes) * 60,
        Some([minutes, seconds]) => u64::from(*minutes) * 60 + u64::from(*seconds),
        Some([hours, minutes, seconds]) => {
            u64::from(*hours) * 3600 + u64::from(*minutes) * 60 + u64::from(*seconds)
        }
        _ => 0,
    };

    u32::try_from(seconds).unwrap_or(u32::MAX)
}

// ============================================================================
// IPC Types
// ============================================================================

/// Session selected by the start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    #[default]
    Stopwatch,
    Timer,
    Pomodoro,
}

impl FromStr for StartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stopwatch" => Ok(StartMode::Stopwatch),
            "timer" | "countdown" => Ok(StartMode::Timer),
            "pomodoro" => Ok(StartMode::Pomodoro),
            other => Err(format!(
                "不明なモードです: {} (stopwatch, timer, pomodoro)",
                other
            )),
        }
    }
}

/// Parameters for the start command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartParams {
    /// Session kind
    #[serde(default)]
    pub mode: StartMode,
    /// Starting value in seconds (ignored for pomodoro)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,
    /// Session label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Start a new session on the shared timer
    Start {
        #[serde(flatten)]
        params: StartParams,
    },
    Pause,
    Resume,
    Stop,
    Reset,
    /// Query the full dashboard snapshot
    Status,
    /// Record a lap at the current time
    Lap,
    /// Show or hide the shared timer on presentation surfaces
    SetVisible { visible: bool },
    /// Stream timer snapshots until the client disconnects
    Watch,
    MultiAdd {
        #[serde(default)]
        name: String,
        seconds: i64,
    },
    MultiList,
    MultiToggle { id: String },
    MultiReset { id: String },
    MultiRemove { id: String },
    PresetList,
    PresetAdd {
        name: String,
        seconds: i64,
        #[serde(rename = "soundType", skip_serializing_if = "Option::is_none")]
        sound_type: Option<SoundType>,
    },
    PresetRemove { id: String },
    PresetApply { id: String },
    SetSound {
        #[serde(rename = "soundType", skip_serializing_if = "Option::is_none")]
        sound_type: Option<SoundType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        volume: Option<f32>,
    },
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Shared timer snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerState>,
    /// Visibility hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Session kind (with pomodoro counters)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionKind>,
    /// Countdown progress percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Recorded laps, newest first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laps: Option<Vec<u32>>,
    /// Multi-timer entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timers: Option<Vec<SingleTimer>>,
    /// Saved presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presets: Option<Vec<TimerPreset>>,
    /// Current sound settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundSettings>,
    /// Id of a newly created entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ResponseData {
    /// Creates response data carrying only the timer snapshot.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            timer: Some(state.clone()),
            progress: Some(state.progress()),
            ..Self::default()
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for error responses.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        fn countdown(time: u32, initial_time: u32) -> TimerState {
            TimerState {
                is_active: true,
                is_running: true,
                time,
                mode: TimerMode::Timer,
                initial_time,
                label: None,
            }
        }

        #[test]
        fn test_new_state_is_idle_stopwatch() {
            let state = TimerState::new();
            assert!(!state.is_active);
            assert!(!state.is_running);
            assert_eq!(state.time, 0);
            assert_eq!(state.mode, TimerMode::Stopwatch);
            assert_eq!(state.initial_time, 0);
            assert_eq!(state.label, None);
        }

        #[test]
        fn test_progress_countdown() {
            assert_eq!(countdown(100, 100).progress(), 0.0);
            assert_eq!(countdown(50, 100).progress(), 50.0);
            assert_eq!(countdown(0, 100).progress(), 100.0);
        }

        #[test]
        fn test_progress_zero_for_stopwatch_and_empty_countdown() {
            let mut state = TimerState::new();
            state.time = 42;
            assert_eq!(state.progress(), 0.0);
            assert_eq!(countdown(0, 0).progress(), 0.0);
        }

        #[test]
        fn test_is_low_time() {
            assert!(countdown(5, 60).is_low_time());
            assert!(countdown(1, 60).is_low_time());
            assert!(!countdown(6, 60).is_low_time());
            assert!(!countdown(0, 60).is_low_time());

            let mut stopwatch = TimerState::new();
            stopwatch.time = 3;
            assert!(!stopwatch.is_low_time());
        }

        #[test]
        fn test_is_completed_and_paused() {
            let mut state = countdown(0, 60);
            state.is_running = false;
            assert!(state.is_completed());
            assert!(!state.is_paused());

            let mut state = countdown(30, 60);
            state.is_running = false;
            assert!(!state.is_completed());
            assert!(state.is_paused());
        }

        #[test]
        fn test_serialize_camel_case() {
            let mut state = countdown(10, 20);
            state.label = Some("Tea".to_string());
            let json = serde_json::to_string(&state).unwrap();
            assert!(json.contains("\"isActive\":true"));
            assert!(json.contains("\"initialTime\":20"));
            assert!(json.contains("\"mode\":\"timer\""));
            assert!(json.contains("\"label\":\"Tea\""));
        }
    }

    // ------------------------------------------------------------------------
    // Helper Tests
    // ------------------------------------------------------------------------

    mod helper_tests {
        use super::*;

        #[test]
        fn test_clamp_seconds() {
            assert_eq!(clamp_seconds(-5), 0);
            assert_eq!(clamp_seconds(0), 0);
            assert_eq!(clamp_seconds(90), 90);
            assert_eq!(clamp_seconds(i64::MAX), u32::MAX);
        }

        #[test]
        fn test_format_time() {
            assert_eq!(format_time(0), "00:00");
            assert_eq!(format_time(65), "01:05");
            assert_eq!(format_time(25 * 60), "25:00");
            assert_eq!(format_time(3600), "01:00:00");
            assert_eq!(format_time(3 * 3600 + 4 * 60 + 5), "03:04:05");
        }

        #[test]
        fn test_parse_time_input() {
            assert_eq!(parse_time_input("25"), 25 * 60);
            assert_eq!(parse_time_input("05:00"), 300);
            assert_eq!(parse_time_input("1:30"), 90);
            assert_eq!(parse_time_input("01:00:05"), 3605);
        }

        #[test]
        fn test_parse_time_input_invalid_is_zero() {
            assert_eq!(parse_time_input(""), 0);
            assert_eq!(parse_time_input("abc"), 0);
            assert_eq!(parse_time_input("1:2:3:4"), 0);
            assert_eq!(parse_time_input("-5"), 0);
        }

        #[test]
        fn test_default_presets() {
            let presets = default_presets();
            assert_eq!(presets.len(), 4);
            assert_eq!(presets[0].name, "Quick Break");
            assert_eq!(presets[0].time, 300);
            assert_eq!(presets[0].sound_type, SoundType::Chime);
            assert_eq!(presets[3].time, 45 * 60);
        }
    }

    // ------------------------------------------------------------------------
    // Sound Settings Tests
    // ------------------------------------------------------------------------

    mod sound_tests {
        use super::*;

        #[test]
        fn test_sound_type_from_str() {
            assert_eq!("beep".parse::<SoundType>().unwrap(), SoundType::Beep);
            assert_eq!("Chime".parse::<SoundType>().unwrap(), SoundType::Chime);
            assert_eq!("none".parse::<SoundType>().unwrap(), SoundType::None);
            assert!("kazoo".parse::<SoundType>().is_err());
        }

        #[test]
        fn test_sound_settings_default() {
            let settings = SoundSettings::default();
            assert_eq!(settings.sound_type, SoundType::Beep);
            assert_eq!(settings.volume, 0.5);
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn test_sound_settings_volume_range() {
            let settings = SoundSettings {
                volume: 1.5,
                ..SoundSettings::default()
            };
            assert!(settings.validate().is_err());

            let settings = SoundSettings {
                volume: -0.1,
                ..SoundSettings::default()
            };
            assert!(settings.validate().is_err());
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_start_mode_from_str() {
            assert_eq!("timer".parse::<StartMode>().unwrap(), StartMode::Timer);
            assert_eq!("countdown".parse::<StartMode>().unwrap(), StartMode::Timer);
            assert_eq!(
                "pomodoro".parse::<StartMode>().unwrap(),
                StartMode::Pomodoro
            );
            assert!("lap".parse::<StartMode>().is_err());
        }

        #[test]
        fn test_ipc_request_start_serialize() {
            let request = IpcRequest::Start {
                params: StartParams {
                    mode: StartMode::Timer,
                    seconds: Some(180),
                    label: Some("Tea".to_string()),
                },
            };

            let json = serde_json::to_string(&request).unwrap();
            assert!(json.contains("\"command\":\"start\""));
            assert!(json.contains("\"mode\":\"timer\""));
            assert!(json.contains("\"seconds\":180"));
            assert!(json.contains("\"label\":\"Tea\""));
        }

        #[test]
        fn test_ipc_request_start_deserialize_defaults() {
            let json = r#"{"command":"start"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();

            match request {
                IpcRequest::Start { params } => {
                    assert_eq!(params.mode, StartMode::Stopwatch);
                    assert!(params.seconds.is_none());
                    assert!(params.label.is_none());
                }
                _ => panic!("Expected Start request"),
            }
        }

        #[test]
        fn test_ipc_request_multi_commands() {
            let json = r#"{"command":"multi_add","name":"Eggs","seconds":420}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert!(matches!(
                request,
                IpcRequest::MultiAdd { ref name, seconds: 420 } if name == "Eggs"
            ));

            let request = IpcRequest::MultiToggle {
                id: "abc".to_string(),
            };
            let json = serde_json::to_string(&request).unwrap();
            assert_eq!(json, r#"{"command":"multi_toggle","id":"abc"}"#);
        }

        #[test]
        fn test_ipc_request_unit_commands() {
            let commands = vec![
                (r#"{"command":"pause"}"#, "pause"),
                (r#"{"command":"resume"}"#, "resume"),
                (r#"{"command":"stop"}"#, "stop"),
                (r#"{"command":"reset"}"#, "reset"),
                (r#"{"command":"status"}"#, "status"),
                (r#"{"command":"lap"}"#, "lap"),
                (r#"{"command":"watch"}"#, "watch"),
            ];

            for (json, expected) in commands {
                let request: IpcRequest = serde_json::from_str(json).unwrap();
                match (&request, expected) {
                    (IpcRequest::Pause, "pause") => {}
                    (IpcRequest::Resume, "resume") => {}
                    (IpcRequest::Stop, "stop") => {}
                    (IpcRequest::Reset, "reset") => {}
                    (IpcRequest::Status, "status") => {}
                    (IpcRequest::Lap, "lap") => {}
                    (IpcRequest::Watch, "watch") => {}
                    _ => panic!("Unexpected request type for {}", json),
                }
            }
        }

        #[test]
        fn test_ipc_request_set_sound_serialize() {
            let request = IpcRequest::SetSound {
                sound_type: Some(SoundType::Bell),
                volume: None,
            };
            let json = serde_json::to_string(&request).unwrap();
            assert_eq!(json, r#"{"command":"set_sound","soundType":"bell"}"#);
        }

        #[test]
        fn test_response_data_from_timer_state() {
            let state = TimerState {
                is_active: true,
                is_running: true,
                time: 30,
                mode: TimerMode::Timer,
                initial_time: 60,
                label: Some("Test".to_string()),
            };

            let data = ResponseData::from_timer_state(&state);

            assert_eq!(data.timer, Some(state));
            assert_eq!(data.progress, Some(50.0));
            assert!(data.timers.is_none());
        }

        #[test]
        fn test_ipc_response_success_and_error() {
            let response = IpcResponse::success("OK", None);
            assert_eq!(response.status, "success");
            assert!(!response.is_error());

            let response = IpcResponse::error("not found");
            assert_eq!(response.status, "error");
            assert_eq!(response.message, "not found");
            assert!(response.is_error());
            assert!(response.data.is_none());
        }

        #[test]
        fn test_ipc_response_skips_empty_fields() {
            let response = IpcResponse::success(
                "OK",
                Some(ResponseData {
                    visible: Some(true),
                    ..ResponseData::default()
                }),
            );

            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains("\"visible\":true"));
            assert!(!json.contains("timers"));
            assert!(!json.contains("presets"));
        }
    }
}
