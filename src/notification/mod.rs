//! Completion cues: desktop notifications plus a synthesized tone.
//!
//! The timer core only sees the [`Notifier`] trait. The production
//! implementation, [`NotificationEmitter`], combines a
//! [`NotificationSender`] with a [`SoundPlayer`]. Both halves are
//! best-effort: failures are logged and never reach the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use focusdeck::notification::{
//!     DesktopNotificationSender, NotificationEmitter, NotificationSender, Notifier,
//! };
//! use focusdeck::sound::{try_create_player, SoundPlayer};
//! use focusdeck::types::SoundSettings;
//!
//! let sender: Option<Arc<dyn NotificationSender>> =
//!     DesktopNotificationSender::new_with_fallback(true)
//!         .map(|s| Arc::new(s) as Arc<dyn NotificationSender>);
//! let player: Option<Arc<dyn SoundPlayer>> =
//!     try_create_player(false).map(|p| p as Arc<dyn SoundPlayer>);
//! let emitter = NotificationEmitter::new(sender, player, SoundSettings::default());
//! emitter.notify("Timer Finished!", "Your timer has finished");
//! ```

mod content;
mod desktop;
pub mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::sound::{SoundPlayer, Tone};
use crate::types::SoundSettings;

pub use self::content::{
    break_complete_content, multi_timer_complete_content, sanitize_label,
    timer_finished_content, work_session_complete_content, NotificationContent,
};
pub use self::desktop::DesktopNotificationSender;
pub use self::error::NotificationError;

/// Receives completion events from the timer core.
///
/// Implementations must not block and must not fail observably.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Result of asking the platform for notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

/// Trait for desktop notification backends.
pub trait NotificationSender: Send + Sync {
    /// Asks for permission to show notifications. Must not block.
    fn request_permission(&self) -> NotificationPermission;

    /// Shows a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be dispatched.
    fn send(&self, title: &str, body: &str) -> Result<(), NotificationError>;
}

/// Production [`Notifier`]: desktop notification plus tone.
pub struct NotificationEmitter {
    sender: Option<Arc<dyn NotificationSender>>,
    player: Option<Arc<dyn SoundPlayer>>,
    permission: NotificationPermission,
    sound: Mutex<SoundSettings>,
}

impl NotificationEmitter {
    /// Creates an emitter, asking the sender for permission once.
    pub fn new(
        sender: Option<Arc<dyn NotificationSender>>,
        player: Option<Arc<dyn SoundPlayer>>,
        sound: SoundSettings,
    ) -> Self {
        let permission = sender
            .as_ref()
            .map(|s| s.request_permission())
            .unwrap_or(NotificationPermission::Denied);

        if permission != NotificationPermission::Granted {
            debug!("Desktop notifications unavailable: {:?}", permission);
        }

        Self {
            sender,
            player,
            permission,
            sound: Mutex::new(sound),
        }
    }

    /// Returns the permission obtained at construction.
    #[must_use]
    pub fn permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Returns the current sound settings.
    #[must_use]
    pub fn sound_settings(&self) -> SoundSettings {
        match self.sound.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replaces the sound settings used for subsequent cues.
    pub fn set_sound_settings(&self, settings: SoundSettings) {
        match self.sound.lock() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }

    fn play_tone(&self) {
        let Some(player) = &self.player else {
            return;
        };
        if !player.is_available() {
            debug!("Audio worker unavailable, skipping tone");
            return;
        }
        let Some(tone) = Tone::from_settings(&self.sound_settings()) else {
            return;
        };
        if let Err(e) = player.play(&tone) {
            warn!("サウンドの再生に失敗しました: {} ({})", e, e.suggestion());
        }
    }
}

impl Notifier for NotificationEmitter {
    fn notify(&self, title: &str, body: &str) {
        debug!("Notify: {} / {}", title, body);

        if self.permission == NotificationPermission::Granted {
            if let Some(sender) = &self.sender {
                if let Err(e) = sender.send(title, body) {
                    warn!("{} ({})", e, e.suggestion());
                }
            }
        }

        self.play_tone();
    }
}

impl std::fmt::Debug for NotificationEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationEmitter")
            .field("permission", &self.permission)
            .field("has_sender", &self.sender.is_some())
            .field("has_player", &self.player.is_some())
            .finish_non_exhaustive()
    }
}

/// Mock notification sender for testing.
#[derive(Debug, Default)]
pub struct MockNotificationSender {
    notifications: Mutex<Vec<(String, String)>>,
    should_fail: AtomicBool,
    denied: AtomicBool,
}

impl MockNotificationSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes `request_permission` report `Denied`.
    pub fn set_denied(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn clear_recorded(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl NotificationSender for MockNotificationSender {
    fn request_permission(&self) -> NotificationPermission {
        if self.denied.load(Ordering::SeqCst) {
            NotificationPermission::Denied
        } else {
            NotificationPermission::Granted
        }
    }

    fn send(&self, title: &str, body: &str) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Mock notifier that records every call.
#[derive(Debug, Default)]
pub struct MockNotifier {
    calls: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the titles of all recorded calls.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.calls().into_iter().map(|(title, _)| title).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}
