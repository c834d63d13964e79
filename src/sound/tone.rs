//! Synthesized notification tones.
//!
//! Each [`SoundType`] maps to a short sine tone. Chime and bell add a
//! second, higher voice that starts a moment after the first.

use std::time::Duration;

use crate::types::{SoundSettings, SoundType};

/// Frequency ratio of the harmony voice.
const HARMONY_RATIO: f32 = 1.25;

/// Gain of the harmony voice relative to the base tone.
const HARMONY_GAIN: f32 = 0.6;

/// Length of the harmony voice relative to the base tone.
const HARMONY_LENGTH: f32 = 0.8;

/// Delay before the harmony voice starts.
const HARMONY_DELAY: Duration = Duration::from_millis(200);

/// A single synthesized voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    /// Frequency in Hz
    pub frequency: f32,
    /// How long the voice sounds
    pub duration: Duration,
    /// Linear gain in `0.0..=1.0`
    pub volume: f32,
    /// Silence before the voice starts
    pub delay: Duration,
}

/// A tone made of one or two voices.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Sound type this tone was built from
    pub sound_type: SoundType,
    /// Voices mixed together
    pub voices: Vec<Voice>,
}

impl Tone {
    /// Builds the tone for a sound type at the given volume.
    ///
    /// Returns `None` for [`SoundType::None`].
    #[must_use]
    pub fn for_sound(sound_type: SoundType, volume: f32) -> Option<Self> {
        let volume = volume.clamp(0.0, 1.0);
        let (frequency, seconds, harmony) = match sound_type {
            SoundType::Beep => (800.0, 0.5, false),
            SoundType::Chime => (523.25, 1.0, true),
            SoundType::Bell => (659.25, 2.0, true),
            SoundType::Notification => (440.0, 0.3, false),
            SoundType::None => return None,
        };

        let base = Voice {
            frequency,
            duration: Duration::from_secs_f32(seconds),
            volume,
            delay: Duration::ZERO,
        };

        let mut voices = vec![base];
        if harmony {
            voices.push(Voice {
                frequency: frequency * HARMONY_RATIO,
                duration: Duration::from_secs_f32(seconds * HARMONY_LENGTH),
                volume: volume * HARMONY_GAIN,
                delay: HARMONY_DELAY,
            });
        }

        Some(Self { sound_type, voices })
    }

    /// Builds the tone selected by the given settings.
    #[must_use]
    pub fn from_settings(settings: &SoundSettings) -> Option<Self> {
        Self::for_sound(settings.sound_type, settings.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_silent() {
        assert!(Tone::for_sound(SoundType::None, 0.5).is_none());
    }

    #[test]
    fn test_beep_single_voice() {
        let tone = Tone::for_sound(SoundType::Beep, 0.5).unwrap();
        assert_eq!(tone.voices.len(), 1);
        assert_eq!(tone.voices[0].frequency, 800.0);
        assert_eq!(tone.voices[0].duration, Duration::from_millis(500));
        assert_eq!(tone.voices[0].volume, 0.5);
    }

    #[test]
    fn test_bell_has_delayed_harmony() {
        let tone = Tone::for_sound(SoundType::Bell, 0.5).unwrap();
        assert_eq!(tone.voices.len(), 2);

        let harmony = tone.voices[1];
        assert!((harmony.frequency - 659.25 * 1.25).abs() < 0.01);
        assert!((harmony.volume - 0.3).abs() < 0.0001);
        assert_eq!(harmony.delay, Duration::from_millis(200));
        assert!(harmony.duration < tone.voices[0].duration);
    }

    #[test]
    fn test_volume_is_clamped() {
        let tone = Tone::for_sound(SoundType::Notification, 3.0).unwrap();
        assert_eq!(tone.voices[0].volume, 1.0);
    }

    #[test]
    fn test_from_settings() {
        let settings = SoundSettings {
            sound_type: SoundType::Chime,
            volume: 0.2,
        };
        let tone = Tone::from_settings(&settings).unwrap();
        assert_eq!(tone.sound_type, SoundType::Chime);
        assert_eq!(tone.voices[0].volume, 0.2);
    }
}
