//! Display utilities for the focusdeck CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Dashboard status and multi-timer/preset lists
//! - The live `watch` line

use std::io::Write;

use crate::daemon::pomodoro::SessionKind;
use crate::types::{
    format_time, IpcResponse, ResponseData, SingleTimer, TimerMode, TimerPreset, TimerState,
};

/// Width of the progress bar in the watch line.
const PROGRESS_BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message followed by the timer summary.
    pub fn show_timer_result(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(timer) = response.data.as_ref().and_then(|d| d.timer.as_ref()) {
            for line in Self::timer_lines(timer) {
                println!("  {}", line);
            }
        }
    }

    /// Shows a plain success message.
    pub fn show_message(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
    }

    /// Shows the full dashboard status.
    pub fn show_status(response: &IpcResponse) {
        println!("focusdeck ステータス");
        println!("─────────────────────────────");

        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("デーモンから状態を取得できませんでした"),
        }
    }

    /// Shows the multi-timer list.
    pub fn show_timers(response: &IpcResponse) {
        Self::show_message(response);
        let timers = response
            .data
            .as_ref()
            .and_then(|d| d.timers.as_deref())
            .unwrap_or_default();
        for line in Self::timer_list_lines(timers) {
            println!("{}", line);
        }
    }

    /// Shows the preset list.
    pub fn show_presets(response: &IpcResponse) {
        Self::show_message(response);
        let presets = response
            .data
            .as_ref()
            .and_then(|d| d.presets.as_deref())
            .unwrap_or_default();
        for line in Self::preset_lines(presets) {
            println!("{}", line);
        }
    }

    /// Shows the current sound settings.
    pub fn show_sound(response: &IpcResponse) {
        Self::show_message(response);
        if let Some(sound) = response.data.as_ref().and_then(|d| d.sound) {
            println!(
                "  サウンド: {} (音量 {:.0}%)",
                sound.sound_type.as_str(),
                sound.volume * 100.0
            );
        }
    }

    /// Redraws the live watch line in place.
    pub fn show_watch_line(state: &TimerState) {
        print!("\r\x1b[2K{}", Self::watch_line(state));
        let _ = std::io::stdout().flush();
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    // ------------------------------------------------------------------------
    // Line builders
    // ------------------------------------------------------------------------

    fn state_label(timer: &TimerState) -> &'static str {
        if !timer.is_active {
            "停止中"
        } else if timer.is_running {
            "実行中"
        } else if timer.is_completed() {
            "完了"
        } else {
            "一時停止中"
        }
    }

    fn mode_label(mode: TimerMode) -> &'static str {
        match mode {
            TimerMode::Stopwatch => "ストップウォッチ",
            TimerMode::Timer => "タイマー",
        }
    }

    /// Summary lines for a timer snapshot.
    pub fn timer_lines(timer: &TimerState) -> Vec<String> {
        let mut lines = vec![
            format!("モード: {}", Self::mode_label(timer.mode)),
            format!("時間: {}", format_time(timer.time)),
        ];
        if let Some(label) = &timer.label {
            lines.push(format!("ラベル: {}", label));
        }
        lines
    }

    /// Lines for the full status view.
    pub fn status_lines(data: &ResponseData) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(timer) = &data.timer {
            lines.push(format!("状態: {}", Self::state_label(timer)));
            if timer.is_active {
                lines.extend(Self::timer_lines(timer));
                if timer.mode == TimerMode::Timer {
                    lines.push(format!(
                        "進捗: {:.0}%",
                        data.progress.unwrap_or_else(|| timer.progress())
                    ));
                }
            }
        }

        if let Some(SessionKind::Pomodoro(cycle)) = &data.session {
            let phase = if cycle.is_break { "休憩" } else { "作業" };
            lines.push(format!("ポモドーロ: #{} ({})", cycle.session, phase));
        }

        if let Some(visible) = data.visible {
            lines.push(format!("表示: {}", if visible { "オン" } else { "オフ" }));
        }

        if let Some(laps) = data.laps.as_ref().filter(|laps| !laps.is_empty()) {
            lines.push("ラップ:".to_string());
            let count = laps.len();
            for (i, lap) in laps.iter().enumerate() {
                lines.push(format!("  #{} {}", count - i, format_time(*lap)));
            }
        }

        if let Some(timers) = data.timers.as_ref().filter(|t| !t.is_empty()) {
            lines.push("マルチタイマー:".to_string());
            lines.extend(Self::timer_list_lines(timers));
        }

        lines
    }

    /// One line per multi-timer.
    pub fn timer_list_lines(timers: &[SingleTimer]) -> Vec<String> {
        if timers.is_empty() {
            return vec!["  (マルチタイマーはありません)".to_string()];
        }
        timers
            .iter()
            .map(|timer| {
                let state = if timer.is_completed {
                    "完了"
                } else if timer.is_running {
                    "実行中"
                } else {
                    "停止中"
                };
                format!(
                    "  {} {} {} [{}]",
                    timer.id,
                    timer.name,
                    format_time(timer.time),
                    state
                )
            })
            .collect()
    }

    /// One line per preset.
    pub fn preset_lines(presets: &[TimerPreset]) -> Vec<String> {
        if presets.is_empty() {
            return vec!["  (プリセットはありません)".to_string()];
        }
        presets
            .iter()
            .map(|preset| {
                format!(
                    "  {} {} {} ({})",
                    preset.id,
                    preset.name,
                    format_time(preset.time),
                    preset.sound_type.as_str()
                )
            })
            .collect()
    }

    /// The single-line live view used by `watch`.
    pub fn watch_line(state: &TimerState) -> String {
        if !state.is_active {
            return "-- 停止中 --".to_string();
        }

        let icon = if state.is_running { ">" } else { "||" };
        let mut line = format!("{} {}", icon, format_time(state.time));

        if state.mode == TimerMode::Timer {
            let filled = (state.progress() / 100.0 * PROGRESS_BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(PROGRESS_BAR_WIDTH);
            line.push_str(&format!(
                " [{}{}]",
                "#".repeat(filled),
                "-".repeat(PROGRESS_BAR_WIDTH - filled)
            ));
            if state.is_low_time() {
                line.push_str(" !");
            }
        }

        if let Some(label) = &state.label {
            line.push_str(&format!(" {}", label));
        }

        line
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::pomodoro::PomodoroCycle;
    use crate::types::{SoundSettings, SoundType};

    fn countdown(time: u32, initial_time: u32, is_running: bool) -> TimerState {
        TimerState {
            is_active: true,
            is_running,
            time,
            mode: TimerMode::Timer,
            initial_time,
            label: Some("Tea".to_string()),
        }
    }

    // ------------------------------------------------------------------------
    // Line builder Tests
    // ------------------------------------------------------------------------

    mod line_tests {
        use super::*;

        #[test]
        fn test_timer_lines() {
            let lines = Display::timer_lines(&countdown(90, 180, true));
            assert_eq!(lines, vec!["モード: タイマー", "時間: 01:30", "ラベル: Tea"]);
        }

        #[test]
        fn test_status_lines_idle() {
            let data = ResponseData::from_timer_state(&TimerState::new());
            let lines = Display::status_lines(&data);
            assert_eq!(lines, vec!["状態: 停止中"]);
        }

        #[test]
        fn test_status_lines_pomodoro_with_laps() {
            let data = ResponseData {
                session: Some(SessionKind::Pomodoro(PomodoroCycle {
                    session: 3,
                    is_break: true,
                })),
                laps: Some(vec![30, 10]),
                visible: Some(true),
                ..ResponseData::from_timer_state(&countdown(60, 300, true))
            };
            let lines = Display::status_lines(&data);

            assert!(lines.contains(&"状態: 実行中".to_string()));
            assert!(lines.contains(&"進捗: 80%".to_string()));
            assert!(lines.contains(&"ポモドーロ: #3 (休憩)".to_string()));
            assert!(lines.contains(&"表示: オン".to_string()));
            assert!(lines.contains(&"  #2 00:30".to_string()));
            assert!(lines.contains(&"  #1 00:10".to_string()));
        }

        #[test]
        fn test_status_lines_completed() {
            let data = ResponseData::from_timer_state(&countdown(0, 60, false));
            let lines = Display::status_lines(&data);
            assert_eq!(lines[0], "状態: 完了");
        }

        #[test]
        fn test_timer_list_lines() {
            let timers = vec![SingleTimer {
                id: "abc".to_string(),
                name: "Eggs".to_string(),
                time: 0,
                initial_time: 420,
                is_running: false,
                is_completed: true,
            }];
            assert_eq!(
                Display::timer_list_lines(&timers),
                vec!["  abc Eggs 00:00 [完了]"]
            );
            assert_eq!(Display::timer_list_lines(&[]).len(), 1);
        }

        #[test]
        fn test_preset_lines() {
            let presets = vec![TimerPreset::new("1", "Quick Break", 300, SoundType::Chime)];
            assert_eq!(
                Display::preset_lines(&presets),
                vec!["  1 Quick Break 05:00 (chime)"]
            );
        }
    }

    // ------------------------------------------------------------------------
    // Watch line Tests
    // ------------------------------------------------------------------------

    mod watch_line_tests {
        use super::*;

        #[test]
        fn test_watch_line_idle() {
            assert_eq!(Display::watch_line(&TimerState::new()), "-- 停止中 --");
        }

        #[test]
        fn test_watch_line_half_done() {
            let line = Display::watch_line(&countdown(50, 100, true));
            assert_eq!(line, "> 00:50 [##########----------] Tea");
        }

        #[test]
        fn test_watch_line_low_time() {
            let line = Display::watch_line(&countdown(3, 100, true));
            assert!(line.contains(" !"));
        }

        #[test]
        fn test_watch_line_paused_stopwatch() {
            let state = TimerState {
                is_active: true,
                is_running: false,
                time: 3725,
                mode: TimerMode::Stopwatch,
                initial_time: 0,
                label: None,
            };
            assert_eq!(Display::watch_line(&state), "|| 01:02:05");
        }
    }

    // ------------------------------------------------------------------------
    // Display Output Tests
    // ------------------------------------------------------------------------

    mod display_tests {
        use super::*;

        #[test]
        fn test_show_functions_do_not_panic() {
            let response = IpcResponse::success(
                "タイマーを開始しました",
                Some(ResponseData {
                    sound: Some(SoundSettings::default()),
                    timers: Some(Vec::new()),
                    presets: Some(Vec::new()),
                    ..ResponseData::from_timer_state(&countdown(10, 10, true))
                }),
            );
            Display::show_timer_result(&response);
            Display::show_status(&response);
            Display::show_timers(&response);
            Display::show_presets(&response);
            Display::show_sound(&response);
            Display::show_message(&response);
            Display::show_error("test");
        }

        #[test]
        fn test_show_status_without_data() {
            Display::show_status(&IpcResponse::success("", None));
        }
    }
}
