//! Sound player implementation using rodio.
//!
//! The rodio output stream is not `Send`, so it lives on a dedicated worker
//! thread. `RodioSoundPlayer` only holds the sending half of a
//! crossbeam channel and can be shared freely across tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::tone::{Tone, Voice};

/// A sound player that synthesizes tones with rodio.
///
/// Playback is non-blocking: `play` queues the tone for the audio worker
/// and returns immediately.
pub struct RodioSoundPlayer {
    /// Queue feeding the audio worker.
    tx: Sender<Tone>,
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
    /// Cleared by the worker when it exits.
    alive: Arc<AtomicBool>,
}

impl RodioSoundPlayer {
    /// Creates a new sound player and starts its audio worker.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (tx, rx) = unbounded::<Tone>();
        let (ready_tx, ready_rx) = bounded::<Result<(), SoundError>>(1);
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);

        thread::Builder::new()
            .name("focusdeck-audio".to_string())
            .spawn(move || {
                audio_worker(rx, ready_tx);
                worker_alive.store(false, Ordering::Relaxed);
            })
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| SoundError::WorkerStopped)??;

        debug!("Audio output stream initialized");

        Ok(Self {
            tx,
            disabled: AtomicBool::new(disabled),
            alive,
        })
    }

    /// Queues a tone for playback.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::WorkerStopped` if the audio worker has exited.
    pub fn play(&self, tone: &Tone) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }

        self.tx
            .send(tone.clone())
            .map_err(|_| SoundError::WorkerStopped)
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
        debug!("Sound playback enabled");
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
        debug!("Sound playback disabled");
    }

    /// Returns true while the audio worker is alive.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Owns the output stream and plays queued tones until the sender is dropped.
fn audio_worker(rx: Receiver<Tone>, ready_tx: Sender<Result<(), SoundError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready_tx.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    for tone in rx.iter() {
        if let Err(e) = play_tone(&handle, &tone) {
            warn!("Failed to play {} tone: {}", tone.sound_type.as_str(), e);
        }
    }

    debug!("Audio worker exiting");
}

/// Plays every voice of a tone on its own detached sink.
fn play_tone(handle: &OutputStreamHandle, tone: &Tone) -> Result<(), SoundError> {
    for voice in &tone.voices {
        play_voice(handle, voice)?;
    }
    debug!("Tone playback started (detached)");
    Ok(())
}

fn play_voice(handle: &OutputStreamHandle, voice: &Voice) -> Result<(), SoundError> {
    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

    let source = SineWave::new(voice.frequency)
        .take_duration(voice.duration)
        .amplify(voice.volume)
        .delay(voice.delay);

    sink.append(source);
    sink.detach();
    Ok(())
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new(disabled) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SoundType;

    // These tests run against whatever audio device is present and return
    // early when none is (e.g., CI containers).

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());

        let tone = Tone::for_sound(SoundType::Beep, 0.1).unwrap();
        assert!(player.play(&tone).is_ok());
    }

    #[test]
    fn test_enable_disable() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        player.enable();
        assert!(!player.is_disabled());

        player.disable();
        assert!(player.is_disabled());
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _ = try_create_player(true);
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        let debug_str = format!("{:?}", player);
        assert!(debug_str.contains("RodioSoundPlayer"));
    }
}
