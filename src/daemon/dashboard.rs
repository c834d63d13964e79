//! Dashboard service: the single owner of the shared timer.
//!
//! `Dashboard` holds the timer engine, the multi-timer registry, the
//! session kind, laps, presets and sound settings. The daemon builds exactly
//! one and shares it behind a `tokio::sync::Mutex`; the clock task and the
//! IPC handlers are the only writers.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::TickSource;
use crate::notification::{NotificationEmitter, Notifier};
use crate::types::{
    clamp_seconds, default_presets, ResponseData, SingleTimer, SoundSettings, SoundType,
    StartMode, StartParams, TimerMode, TimerPreset, TimerState,
};

use super::pomodoro::{PomodoroCycle, PomodoroPolicy, SessionKind};
use super::registry::MultiTimerRegistry;
use super::timer::TimerEngine;

/// Maximum number of laps kept.
pub const MAX_LAPS: usize = 10;

/// Shared handle to the dashboard.
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

pub struct Dashboard {
    engine: TimerEngine,
    registry: MultiTimerRegistry,
    session: SessionKind,
    /// Lap times, newest first
    laps: Vec<u32>,
    presets: Vec<TimerPreset>,
    policy: PomodoroPolicy,
    emitter: Arc<NotificationEmitter>,
}

impl Dashboard {
    /// Creates a dashboard with an idle timer and the default presets.
    pub fn new(emitter: Arc<NotificationEmitter>, policy: PomodoroPolicy) -> Self {
        let notifier: Arc<dyn Notifier> = emitter.clone();
        Self {
            engine: TimerEngine::new(Arc::clone(&notifier)),
            registry: MultiTimerRegistry::new(notifier),
            session: SessionKind::default(),
            laps: Vec::new(),
            presets: default_presets(),
            policy,
            emitter,
        }
    }

    /// Wraps the dashboard for sharing between tasks.
    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------------
    // Shared timer
    // ------------------------------------------------------------------------

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn session(&self) -> SessionKind {
        self.session
    }

    pub fn policy(&self) -> &PomodoroPolicy {
        &self.policy
    }

    /// Returns a receiver observing every shared-timer change.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.engine.subscribe()
    }

    /// Starts a stopwatch, countdown or pomodoro session.
    ///
    /// Clears any recorded laps. Pomodoro always begins at session 1.
    pub fn start(&mut self, params: StartParams) -> TimerState {
        let seconds = params.seconds.unwrap_or(0);
        match params.mode {
            StartMode::Stopwatch => {
                self.engine.start(seconds, TimerMode::Stopwatch, params.label);
                self.session = SessionKind::Stopwatch;
            }
            StartMode::Timer => {
                self.engine.start(seconds, TimerMode::Timer, params.label);
                self.session = SessionKind::Countdown;
            }
            StartMode::Pomodoro => {
                let cycle = PomodoroCycle::new();
                self.engine.start(
                    i64::from(cycle.phase_duration(&self.policy)),
                    TimerMode::Timer,
                    Some(cycle.label()),
                );
                self.session = SessionKind::Pomodoro(cycle);
            }
        }
        self.laps.clear();
        info!("Session started: {}", self.session.as_str());
        self.engine.state()
    }

    pub fn pause(&mut self) -> TimerState {
        self.engine.pause();
        self.engine.state()
    }

    pub fn resume(&mut self) -> TimerState {
        self.engine.resume();
        self.engine.state()
    }

    /// Stops the timer and returns to an idle stopwatch session.
    pub fn stop(&mut self) -> TimerState {
        self.engine.stop();
        self.session = SessionKind::Stopwatch;
        self.engine.state()
    }

    /// Rewinds the timer and clears laps.
    pub fn reset(&mut self) -> TimerState {
        self.engine.reset();
        self.laps.clear();
        self.engine.state()
    }

    /// Records the current time as a lap.
    ///
    /// Returns None when the timer is inactive.
    pub fn lap(&mut self) -> Option<u32> {
        let state = self.engine.state();
        if !state.is_active {
            return None;
        }
        self.laps.insert(0, state.time);
        self.laps.truncate(MAX_LAPS);
        debug!("Lap recorded: {}", state.time);
        Some(state.time)
    }

    pub fn laps(&self) -> &[u32] {
        &self.laps
    }

    pub fn is_visible(&self) -> bool {
        self.engine.is_visible()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.engine.set_visible(visible);
    }

    // ------------------------------------------------------------------------
    // Multi-timers
    // ------------------------------------------------------------------------

    pub fn multi_add(&mut self, name: &str, seconds: i64) -> String {
        self.registry.add_timer(name, seconds)
    }

    pub fn multi_list(&self) -> Vec<SingleTimer> {
        self.registry.list()
    }

    pub fn multi_toggle(&mut self, id: &str) -> bool {
        self.registry.toggle(id)
    }

    pub fn multi_reset(&mut self, id: &str) -> bool {
        self.registry.reset(id)
    }

    pub fn multi_remove(&mut self, id: &str) -> bool {
        self.registry.remove(id)
    }

    pub fn subscribe_timers(&self) -> watch::Receiver<Vec<SingleTimer>> {
        self.registry.subscribe()
    }

    // ------------------------------------------------------------------------
    // Presets and sound
    // ------------------------------------------------------------------------

    pub fn presets(&self) -> &[TimerPreset] {
        &self.presets
    }

    /// Saves a new preset.
    ///
    /// Returns an error message if the name is blank or the duration is zero.
    pub fn preset_add(
        &mut self,
        name: &str,
        seconds: i64,
        sound_type: Option<SoundType>,
    ) -> Result<TimerPreset, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("プリセット名を指定してください".to_string());
        }
        let time = clamp_seconds(seconds);
        if time == 0 {
            return Err("プリセットの時間は1秒以上で指定してください".to_string());
        }

        let preset = TimerPreset::new(
            Uuid::new_v4().to_string(),
            name,
            time,
            sound_type.unwrap_or_else(|| self.sound_settings().sound_type),
        );
        self.presets.push(preset.clone());
        Ok(preset)
    }

    pub fn preset_remove(&mut self, id: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        self.presets.len() != before
    }

    /// Selects the preset's sound and starts a countdown named after it.
    ///
    /// Returns None if the id is unknown.
    pub fn preset_apply(&mut self, id: &str) -> Option<TimerState> {
        let preset = self.presets.iter().find(|p| p.id == id)?.clone();

        let mut sound = self.sound_settings();
        sound.sound_type = preset.sound_type;
        self.emitter.set_sound_settings(sound);

        Some(self.start(StartParams {
            mode: StartMode::Timer,
            seconds: Some(i64::from(preset.time)),
            label: Some(preset.name),
        }))
    }

    pub fn sound_settings(&self) -> SoundSettings {
        self.emitter.sound_settings()
    }

    /// Updates the sound type and/or volume.
    ///
    /// Returns an error message if the volume is out of range.
    pub fn set_sound(
        &mut self,
        sound_type: Option<SoundType>,
        volume: Option<f32>,
    ) -> Result<SoundSettings, String> {
        let mut settings = self.sound_settings();
        if let Some(sound_type) = sound_type {
            settings.sound_type = sound_type;
        }
        if let Some(volume) = volume {
            settings.volume = volume;
        }
        settings.validate()?;
        self.emitter.set_sound_settings(settings);
        Ok(settings)
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    /// Applies one elapsed second to the shared timer and every multi-timer.
    ///
    /// Returns true if the shared countdown completed on this tick.
    pub fn tick(&mut self) -> bool {
        let completed = self.engine.tick();

        if completed {
            if let SessionKind::Pomodoro(mut cycle) = self.session {
                let transition = cycle.complete_phase(&self.policy);
                debug!(
                    "Pomodoro phase complete: session={}, break={}",
                    cycle.session, cycle.is_break
                );
                self.emitter
                    .notify(&transition.content.title, &transition.content.body);
                self.engine.start(
                    i64::from(transition.duration),
                    TimerMode::Timer,
                    Some(transition.label),
                );
                self.session = SessionKind::Pomodoro(cycle);
            }
        }

        self.registry.tick();
        completed
    }

    /// Full snapshot for status queries.
    pub fn snapshot(&self) -> ResponseData {
        let state = self.engine.state();
        ResponseData {
            visible: Some(self.engine.is_visible()),
            session: Some(self.session),
            laps: Some(self.laps.clone()),
            timers: Some(self.registry.list()),
            sound: Some(self.sound_settings()),
            ..ResponseData::from_timer_state(&state)
        }
    }
}

/// Drives the dashboard from a tick source until the source is exhausted.
pub async fn run_clock<T: TickSource>(dashboard: SharedDashboard, mut clock: T) {
    while clock.next_tick().await {
        dashboard.lock().await.tick();
    }
    debug!("Clock stopped");
}
