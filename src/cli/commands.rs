//! Command definitions for the focusdeck CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{parse_time_input, SoundType, StartMode, StartParams};

/// Maximum label length accepted on the command line.
const MAX_LABEL_LENGTH: usize = 100;

// ============================================================================
// CLI Structure
// ============================================================================

/// focusdeck - dashboard timer with stopwatch, countdown, pomodoro and multi-timers
#[derive(Parser, Debug)]
#[command(
    name = "focusdeck",
    version,
    about = "ダッシュボード用タイマーCLI",
    long_about = "ストップウォッチ、カウントダウン、ポモドーロ、マルチタイマーを\n\
                  常駐デーモンで管理するタイマーツールです。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Socket path (defaults to ~/.focusdeck/focusdeck.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a stopwatch, countdown or pomodoro session
    Start(StartArgs),

    /// Pause the shared timer
    Pause,

    /// Resume the shared timer
    Resume,

    /// Stop and clear the shared timer
    Stop,

    /// Rewind the shared timer to its start value
    Reset,

    /// Show the dashboard status
    Status,

    /// Record a lap at the current time
    Lap,

    /// Show the timer on presentation surfaces
    Show,

    /// Hide the timer from presentation surfaces
    Hide,

    /// Follow the shared timer live
    Watch,

    /// Manage independent multi-timers
    Multi {
        #[command(subcommand)]
        action: MultiCommand,
    },

    /// Manage timer presets
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },

    /// Change the completion sound
    Sound(SoundArgs),

    /// Run as daemon (background service)
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Multi-timer subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum MultiCommand {
    /// Add a stopped countdown
    Add {
        /// Timer name (defaults to "Timer N")
        name: Option<String>,

        /// Duration (M, MM:SS or HH:MM:SS)
        #[arg(short, long, value_parser = parse_time_arg)]
        time: u32,
    },

    /// List all multi-timers
    List,

    /// Start or pause a multi-timer
    Toggle {
        /// Timer id
        id: String,
    },

    /// Rewind a multi-timer
    Reset {
        /// Timer id
        id: String,
    },

    /// Delete a multi-timer
    Remove {
        /// Timer id
        id: String,
    },
}

/// Preset subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PresetCommand {
    /// List saved presets
    List,

    /// Save a new preset
    Add {
        /// Preset name
        #[arg(value_parser = validate_label)]
        name: String,

        /// Duration (M, MM:SS or HH:MM:SS)
        #[arg(short, long, value_parser = parse_time_arg)]
        time: u32,

        /// Completion sound for this preset
        #[arg(short, long, value_parser = parse_sound_type)]
        sound: Option<SoundType>,
    },

    /// Delete a preset
    Remove {
        /// Preset id
        id: String,
    },

    /// Start a countdown from a preset
    Use {
        /// Preset id
        id: String,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Session kind (stopwatch, timer, pomodoro)
    #[arg(short, long, default_value = "stopwatch", value_parser = parse_start_mode)]
    pub mode: StartMode,

    /// Starting value (M, MM:SS or HH:MM:SS); required for timer mode
    #[arg(short, long, value_parser = parse_time_arg)]
    pub time: Option<u32>,

    /// Label for this session
    #[arg(short, long, value_parser = validate_label)]
    pub label: Option<String>,
}

impl StartArgs {
    /// Validates option combinations clap cannot express.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        match (self.mode, self.time) {
            (StartMode::Timer, None) => {
                Err("タイマーモードでは --time を指定してください".to_string())
            }
            (StartMode::Pomodoro, Some(_)) => {
                Err("ポモドーロモードでは --time は指定できません".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Converts the arguments into IPC start parameters.
    pub fn to_params(&self) -> StartParams {
        StartParams {
            mode: self.mode,
            seconds: self.time.map(i64::from),
            label: self.label.clone(),
        }
    }
}

/// Arguments for the sound command
#[derive(Args, Debug, Clone, Default)]
pub struct SoundArgs {
    /// Sound type (beep, chime, bell, notification, none)
    #[arg(short = 't', long = "type", value_parser = parse_sound_type)]
    pub sound_type: Option<SoundType>,

    /// Volume from 0.0 to 1.0
    #[arg(long, value_parser = parse_volume)]
    pub volume: Option<f32>,
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Config file (defaults to ~/.focusdeck/config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable completion sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notifications: bool,

    /// Completion sound type
    #[arg(long, value_parser = parse_sound_type)]
    pub sound: Option<SoundType>,

    /// Completion sound volume from 0.0 to 1.0
    #[arg(long, value_parser = parse_volume)]
    pub volume: Option<f32>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a label.
///
/// - Must not be empty
/// - Must not exceed 100 characters
fn validate_label(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("ラベルは空にできません".to_string());
    }
    if s.chars().count() > MAX_LABEL_LENGTH {
        return Err("ラベルは100文字以内にしてください".to_string());
    }
    Ok(s.to_string())
}

/// Parses `M`, `MM:SS` or `HH:MM:SS` into seconds.
pub fn parse_time_arg(s: &str) -> Result<u32, String> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let well_formed = (1..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if !well_formed {
        return Err(format!(
            "時間の形式が不正です: {} (M, MM:SS, HH:MM:SS)",
            s
        ));
    }
    Ok(parse_time_input(s))
}

fn parse_start_mode(s: &str) -> Result<StartMode, String> {
    s.parse()
}

fn parse_sound_type(s: &str) -> Result<SoundType, String> {
    s.parse()
}

fn parse_volume(s: &str) -> Result<f32, String> {
    let volume: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("音量の形式が不正です: {}", s))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err("音量は0.0-1.0の範囲で指定してください".to_string());
    }
    Ok(volume)
}

// ============================================================================
// Tests
// ============================================================================
