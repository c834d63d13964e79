//! Notification content construction.
//!
//! Every completion cue in the dashboard is built here so the wording stays
//! consistent between the shared timer, the pomodoro cycler and the
//! multi-timer list.

/// Maximum length for labels shown in notifications.
const MAX_LABEL_LENGTH: usize = 100;

/// Title and body of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    /// Creates content from a title and body.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Sanitizes a label for use in notifications.
///
/// Truncates to a fixed length and strips control characters. Returns None
/// if nothing printable remains.
pub fn sanitize_label(label: &str) -> Option<String> {
    let truncated: String = label.chars().take(MAX_LABEL_LENGTH).collect();
    let sanitized: String = truncated.chars().filter(|c| !c.is_control()).collect();

    if sanitized.trim().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Content for the shared timer reaching zero.
#[must_use]
pub fn timer_finished_content(label: Option<&str>) -> NotificationContent {
    let body = match label.and_then(sanitize_label) {
        Some(label) => format!("{} is complete", label),
        None => "Your timer has finished".to_string(),
    };
    NotificationContent::new("Timer Finished!", body)
}

/// Content for a multi-timer entry reaching zero.
#[must_use]
pub fn multi_timer_complete_content(name: &str) -> NotificationContent {
    let name = sanitize_label(name).unwrap_or_else(|| "Timer".to_string());
    NotificationContent::new(format!("{} Complete!", name), "Timer has finished")
}

/// Content for a finished pomodoro work session.
#[must_use]
pub fn work_session_complete_content(is_long_break: bool) -> NotificationContent {
    let length = if is_long_break { "long" } else { "short" };
    NotificationContent::new(
        "Work Session Complete!",
        format!("Time for a {} break", length),
    )
}

/// Content for a finished pomodoro break.
#[must_use]
pub fn break_complete_content() -> NotificationContent {
    NotificationContent::new("Break Complete!", "Time to get back to work")
}
