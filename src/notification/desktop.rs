//! Desktop notifications via notify-rust.

use std::thread;

use tracing::{debug, warn};

use super::error::NotificationError;
use super::{NotificationPermission, NotificationSender};

/// Application name shown by the notification server.
const APP_NAME: &str = "focusdeck";

/// Sends freedesktop (or platform) notifications.
///
/// `show()` talks to the notification server synchronously, so each
/// notification is delivered from a short-lived thread and the caller never
/// waits on it.
#[derive(Debug, Clone)]
pub struct DesktopNotificationSender {
    enabled: bool,
}

impl DesktopNotificationSender {
    /// Creates a sender. A disabled sender reports `Denied` when asked for
    /// permission.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Creates a sender, returning None when notifications are turned off.
    #[must_use]
    pub fn new_with_fallback(enabled: bool) -> Option<Self> {
        if enabled {
            Some(Self::new(true))
        } else {
            warn!("通知は設定により無効化されています");
            None
        }
    }
}

impl NotificationSender for DesktopNotificationSender {
    fn request_permission(&self) -> NotificationPermission {
        if self.enabled {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        }
    }

    fn send(&self, title: &str, body: &str) -> Result<(), NotificationError> {
        if !self.enabled {
            return Err(NotificationError::PermissionDenied);
        }

        let title = title.to_string();
        let body = body.to_string();
        thread::Builder::new()
            .name("focusdeck-notify".to_string())
            .spawn(move || {
                if let Err(e) = notify_rust::Notification::new()
                    .summary(&title)
                    .body(&body)
                    .appname(APP_NAME)
                    .show()
                {
                    warn!("通知の送信に失敗しました: {}", e);
                }
            })
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        debug!("Desktop notification dispatched");
        Ok(())
    }
}
